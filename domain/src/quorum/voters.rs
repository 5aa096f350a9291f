//! Diverse voter sampling.

use crate::core::model::ModelDescriptor;
use crate::tier::{ModelTier, TierRoster};

pub const DEFAULT_VOTER_LIMIT: usize = 8;

/// Pick up to `limit` models for a vote.
///
/// Ids from `newest` come first in list order, then one model per provider
/// not yet represented (catalog order). The sample always contains at least
/// one fast or economical model when the catalog has one, replacing the last
/// pick if the sample is full.
pub fn select_voters(
    catalog: &[ModelDescriptor],
    newest: &[String],
    roster: &TierRoster,
    limit: usize,
) -> Vec<ModelDescriptor> {
    if limit == 0 {
        return Vec::new();
    }
    let mut chosen: Vec<ModelDescriptor> = Vec::new();
    let is_chosen = |chosen: &[ModelDescriptor], id: &str| chosen.iter().any(|m| m.id == id);

    for id in newest {
        if chosen.len() >= limit {
            break;
        }
        if let Some(model) = catalog.iter().find(|m| &m.id == id)
            && !is_chosen(&chosen, &model.id)
        {
            chosen.push(model.clone());
        }
    }

    for model in catalog {
        if chosen.len() >= limit {
            break;
        }
        let provider_seen = chosen
            .iter()
            .any(|m| m.provider.eq_ignore_ascii_case(&model.provider));
        if !provider_seen {
            chosen.push(model.clone());
        }
    }

    let is_light = |model: &ModelDescriptor| {
        [ModelTier::Fast, ModelTier::Economical]
            .iter()
            .any(|tier| roster.models(*tier).iter().any(|m| m.id == model.id))
    };
    if !chosen.iter().any(|m| is_light(m)) {
        let light = [ModelTier::Fast, ModelTier::Economical]
            .iter()
            .flat_map(|tier| roster.models(*tier))
            .find(|m| !is_chosen(&chosen, &m.id))
            .cloned();
        if let Some(light) = light {
            if chosen.len() >= limit {
                chosen.pop();
            }
            chosen.push(light);
        }
    }

    chosen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<ModelDescriptor> {
        vec![
            ModelDescriptor::new("opus", "anthropic")
                .with_quality(10.0)
                .with_cost(1.5e-5)
                .with_flag("newest"),
            ModelDescriptor::new("sonnet", "anthropic")
                .with_quality(9.0)
                .with_cost(3e-6),
            ModelDescriptor::new("gpt-5", "openai")
                .with_quality(10.0)
                .with_cost(1e-5),
            ModelDescriptor::new("gpt-5-mini", "openai")
                .with_quality(8.0)
                .with_speed(9.5)
                .with_cost(4e-7),
            ModelDescriptor::new("gemini-pro", "google")
                .with_quality(9.0)
                .with_cost(2e-6),
        ]
    }

    fn ids(models: &[ModelDescriptor]) -> Vec<&str> {
        models.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_newest_first_then_one_per_provider() {
        let catalog = catalog();
        let roster = TierRoster::classify(&catalog, &[]);
        let newest = vec!["sonnet".to_string(), "missing".to_string()];
        let voters = select_voters(&catalog, &newest, &roster, 8);
        assert_eq!(ids(&voters), vec!["sonnet", "gpt-5", "gemini-pro", "gpt-5-mini"]);
    }

    #[test]
    fn test_light_model_replaces_last_when_full() {
        let catalog = catalog();
        let roster = TierRoster::classify(&catalog, &[]);
        let voters = select_voters(&catalog, &[], &roster, 2);
        assert_eq!(ids(&voters), vec!["opus", "gpt-5-mini"]);
    }

    #[test]
    fn test_limit_respected() {
        let catalog = catalog();
        let roster = TierRoster::classify(&catalog, &[]);
        let newest: Vec<String> = catalog.iter().map(|m| m.id.clone()).collect();
        let voters = select_voters(&catalog, &newest, &roster, 3);
        assert_eq!(voters.len(), 3);
        assert!(voters.iter().any(|m| m.id == "gpt-5-mini"));
        assert!(select_voters(&catalog, &newest, &roster, 0).is_empty());
    }
}
