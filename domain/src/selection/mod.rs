//! Dynamic agent composition.
//!
//! Templates are scored against a [`TopicAnalysis`]:
//! `0.4 × expertise + 0.3 × performance + 0.3 × diversity`. The top scorer
//! is always taken; the rest are admitted in score order while they add
//! diversity or bring strong expertise, up to a depth-dependent target.

pub mod templates;

pub use templates::{AgentTemplate, default_catalog};

use crate::agent::AgentType;
use crate::objective::Objective;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const EXPERTISE_WEIGHT: f64 = 0.4;
const PERFORMANCE_WEIGHT: f64 = 0.3;
const DIVERSITY_WEIGHT: f64 = 0.3;
const SUGGESTED_BONUS: f64 = 1.5;
const EXPERTISE_NORMALIZER: f64 = 5.0;
const DEFAULT_PERFORMANCE: f64 = 0.7;
const SAME_ROLE_DIVERSITY: f64 = 0.2;

const TECHNICAL_MARKERS: &[&str] = &[
    "code", "api", "architect", "implement", "system", "database", "infrastructure", "deploy",
    "backend", "frontend", "performance", "scal",
];
const ANALYTICAL_MARKERS: &[&str] = &[
    "analy", "data", "research", "metric", "evaluat", "compar", "market", "risk", "statistic",
    "assess", "trade-off",
];

/// Size bounds for a composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorLimits {
    pub min_agents: usize,
    pub max_agents: usize,
    pub base_agents: usize,
}

impl Default for SelectorLimits {
    fn default() -> Self {
        Self {
            min_agents: 2,
            max_agents: 8,
            base_agents: 4,
        }
    }
}

/// What the selector knows about the topic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicAnalysis {
    /// Lowercased topic text keywords are matched against
    pub text: String,
    pub suggested: Vec<AgentType>,
    pub high_technical_depth: bool,
    pub high_analytical_depth: bool,
}

impl TopicAnalysis {
    pub fn from_objective(objective: &Objective) -> Self {
        let mut text = objective.main_objective.to_lowercase();
        for capability in &objective.required_capabilities {
            text.push(' ');
            text.push_str(&capability.to_lowercase().replace('_', " "));
        }

        let marker_hits = |markers: &[&str]| markers.iter().filter(|m| text.contains(*m)).count();
        let technical = marker_hits(TECHNICAL_MARKERS);
        let analytical = marker_hits(ANALYTICAL_MARKERS);
        let complex = objective.complexity >= 7;

        Self {
            suggested: objective.suggested_types(),
            high_technical_depth: technical >= 3 || (complex && technical >= 1),
            high_analytical_depth: analytical >= 3 || (complex && analytical >= 1),
            text,
        }
    }

    pub fn with_suggested(mut self, suggested: Vec<AgentType>) -> Self {
        self.suggested = suggested;
        self
    }
}

/// Per-role historical outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub successes: u32,
    pub attempts: u32,
}

impl PerformanceRecord {
    pub fn success_rate(&self) -> Option<f64> {
        (self.attempts > 0).then(|| self.successes as f64 / self.attempts as f64)
    }
}

/// Score components of one template
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplateScore {
    pub expertise: f64,
    pub performance: f64,
    pub diversity: f64,
    pub total: f64,
}

impl TemplateScore {
    fn new(expertise: f64, performance: f64, diversity: f64) -> Self {
        Self {
            expertise,
            performance,
            diversity,
            total: EXPERTISE_WEIGHT * expertise
                + PERFORMANCE_WEIGHT * performance
                + DIVERSITY_WEIGHT * diversity,
        }
    }
}

/// A template chosen for the composition with the score it was admitted on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedTemplate {
    pub template: AgentTemplate,
    pub score: TemplateScore,
    /// Added only to reach the minimum size
    pub backfilled: bool,
}

/// Admission rule for non-top candidates
pub fn admits(score: &TemplateScore) -> bool {
    score.diversity > 0.3 || score.expertise > 0.8
}

#[derive(Debug, Clone)]
pub struct DynamicAgentSelector {
    catalog: Vec<AgentTemplate>,
    limits: SelectorLimits,
    performance: BTreeMap<AgentType, PerformanceRecord>,
}

impl DynamicAgentSelector {
    pub fn new(limits: SelectorLimits) -> Self {
        Self::with_catalog(default_catalog(), limits)
    }

    pub fn with_catalog(catalog: Vec<AgentTemplate>, limits: SelectorLimits) -> Self {
        Self {
            catalog,
            limits,
            performance: BTreeMap::new(),
        }
    }

    pub fn catalog(&self) -> &[AgentTemplate] {
        &self.catalog
    }

    pub fn limits(&self) -> SelectorLimits {
        self.limits
    }

    /// Expertise match in [0, 1].
    ///
    /// Primary keyword hits count twice, secondary once, plus a flat bonus
    /// when the role was suggested by the objective analysis.
    pub fn expertise_match(&self, template: &AgentTemplate, topic: &TopicAnalysis) -> f64 {
        let hits = |keywords: &[String]| {
            keywords
                .iter()
                .filter(|k| topic.text.contains(k.as_str()))
                .count() as f64
        };
        let mut raw = 2.0 * hits(&template.primary_expertise) + hits(&template.secondary_expertise);
        if topic.suggested.contains(&template.agent_type) {
            raw += SUGGESTED_BONUS;
        }
        (raw / EXPERTISE_NORMALIZER).min(1.0)
    }

    pub fn performance(&self, agent_type: &AgentType) -> f64 {
        self.performance
            .get(agent_type)
            .and_then(PerformanceRecord::success_rate)
            .unwrap_or(DEFAULT_PERFORMANCE)
    }

    /// Diversity of a template against those already chosen
    pub fn diversity(&self, template: &AgentTemplate, chosen: &[&AgentTemplate]) -> f64 {
        if chosen.is_empty() {
            return 1.0;
        }
        if chosen.iter().any(|c| c.agent_type == template.agent_type) {
            return SAME_ROLE_DIVERSITY;
        }
        let overlap = chosen
            .iter()
            .map(|c| capability_overlap(&template.capabilities, &c.capabilities))
            .sum::<f64>()
            / chosen.len() as f64;
        1.0 - overlap
    }

    pub fn score(
        &self,
        template: &AgentTemplate,
        topic: &TopicAnalysis,
        chosen: &[&AgentTemplate],
    ) -> TemplateScore {
        TemplateScore::new(
            self.expertise_match(template, topic),
            self.performance(&template.agent_type),
            self.diversity(template, chosen),
        )
    }

    /// Number of agents to aim for
    pub fn target_count(&self, topic: &TopicAnalysis) -> usize {
        let mut target = self.limits.base_agents;
        if topic.high_technical_depth {
            target += 1;
        }
        if topic.high_analytical_depth {
            target += 1;
        }
        target
            .clamp(self.limits.min_agents, self.limits.max_agents.max(self.limits.min_agents))
            .min(self.catalog.len())
    }

    /// Compose the working set for a topic.
    ///
    /// The result size is within `[min_agents, max_agents]` whenever the
    /// catalog has at least `min_agents` templates.
    pub fn select(&self, topic: &TopicAnalysis) -> Vec<SelectedTemplate> {
        let target = self.target_count(topic);
        let minimum = self.limits.min_agents.min(self.catalog.len());

        // Rank by the score each template would have as the first pick
        let mut ranked: Vec<(usize, TemplateScore)> = self
            .catalog
            .iter()
            .enumerate()
            .map(|(i, t)| (i, self.score(t, topic, &[])))
            .collect();
        ranked.sort_by(|a, b| b.1.total.total_cmp(&a.1.total));

        let mut selected: Vec<SelectedTemplate> = Vec::new();
        let mut taken: BTreeSet<usize> = BTreeSet::new();

        for (index, initial) in &ranked {
            if selected.len() >= target {
                break;
            }
            let template = &self.catalog[*index];
            let score = if selected.is_empty() {
                *initial
            } else {
                let chosen: Vec<&AgentTemplate> = selected.iter().map(|s| &s.template).collect();
                self.score(template, topic, &chosen)
            };
            if selected.is_empty() || admits(&score) {
                taken.insert(*index);
                selected.push(SelectedTemplate {
                    template: template.clone(),
                    score,
                    backfilled: false,
                });
            }
        }

        for (index, _) in &ranked {
            if selected.len() >= minimum {
                break;
            }
            if taken.insert(*index) {
                let template = &self.catalog[*index];
                let chosen: Vec<&AgentTemplate> = selected.iter().map(|s| &s.template).collect();
                let score = self.score(template, topic, &chosen);
                selected.push(SelectedTemplate {
                    template: template.clone(),
                    score,
                    backfilled: true,
                });
            }
        }

        selected
    }

    /// Feed back whether a role produced a useful contribution
    pub fn record_outcome(&mut self, agent_type: &AgentType, success: bool) {
        let record = self.performance.entry(agent_type.clone()).or_default();
        record.attempts += 1;
        if success {
            record.successes += 1;
        }
    }

    pub fn performance_records(&self) -> &BTreeMap<AgentType, PerformanceRecord> {
        &self.performance
    }
}

fn capability_overlap(a: &[String], b: &[String]) -> f64 {
    let left: BTreeSet<&String> = a.iter().collect();
    let right: BTreeSet<&String> = b.iter().collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}
