//! Console output formatter for discussion outcomes

use colored::Colorize;
use council_application::DiscussionOutput;
use council_domain::{Conclusion, ModelDescriptor, ModelTier, TierRoster};

/// Formats discussion outcomes for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete outcome
    pub fn format(output: &DiscussionOutput) -> String {
        let mut out = String::new();

        out.push_str(&Self::header("Agent Council Results"));
        out.push('\n');

        let objective = &output.objective;
        out.push_str(&format!(
            "{} {}\n",
            "Objective:".cyan().bold(),
            objective.main_objective
        ));
        out.push_str(&format!(
            "{} {}/10, {} scope\n",
            "Complexity:".cyan().bold(),
            objective.complexity,
            objective.estimated_scope
        ));
        if !objective.required_capabilities.is_empty() {
            out.push_str(&format!(
                "{} {}\n",
                "Capabilities:".cyan().bold(),
                objective.required_capabilities.join(", ")
            ));
        }

        out.push_str(&Self::section_header("Agents"));
        for agent in &output.agents {
            let model = agent.assigned_model.as_deref().unwrap_or("unassigned");
            let line = format!("{} ({}) on {}", agent.id, agent.specialization, model);
            match &agent.parent_agent_id {
                Some(parent) => out.push_str(&format!("    {} {}\n", line, format!("<- {parent}").dimmed())),
                None => out.push_str(&format!("  {}\n", line)),
            }
        }

        out.push_str(&Self::section_header("Discussion"));
        let mut round = 0;
        for exchange in &output.exchanges {
            if exchange.round != round {
                round = exchange.round;
                out.push_str(&format!("\n{}\n", format!("Round {round}").yellow().bold()));
            }
            let speaker = format!("── {} [{}] ──", exchange.agent_id, exchange.model);
            if exchange.is_fallback {
                out.push_str(&format!("{}\n{}\n", speaker.red().bold(), exchange.content.dimmed()));
            } else {
                out.push_str(&format!("{}\n{}\n", speaker.yellow(), exchange.content));
            }
        }

        out.push_str(&Self::section_header("Outcome"));
        let actions: Vec<String> = output.actions.iter().map(|a| a.to_string()).collect();
        out.push_str(&format!(
            "{} iterations, {} rounds completed: {}\n",
            output.iterations,
            output.rounds_completed,
            output.end.describe()
        ));
        out.push_str(&format!("Actions: {}\n", actions.join(" -> ")));
        if let Some(tally) = &output.last_tally {
            out.push_str(&format!(
                "Last vote: {} votes, continue {:.0}% (weighted {:.0}%), completion {:.0}%\n",
                tally.votes.len(),
                tally.simple_ratio * 100.0,
                tally.weighted_ratio * 100.0,
                tally.average_completion
            ));
        }
        let usage = &output.total_usage;
        out.push_str(&format!(
            "Oracle calls: {} ({} failed), {} tokens, ${:.4}\n",
            usage.calls,
            usage.failures,
            usage.prompt_tokens + usage.completion_tokens,
            usage.cost
        ));

        out.push_str(&Self::section_header("Conclusion"));
        out.push_str(&Self::conclusion_body(&output.conclusion));

        out.push_str(&Self::footer());
        out
    }

    /// Format as JSON
    pub fn format_json(output: &DiscussionOutput) -> String {
        serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the conclusion only (concise output)
    pub fn format_conclusion_only(output: &DiscussionOutput) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n\n", "=== Council Conclusion ===".cyan().bold()));
        out.push_str(&format!("{} {}\n\n", "Objective:".bold(), output.objective.main_objective));
        out.push_str(&Self::conclusion_body(&output.conclusion));
        out
    }

    fn conclusion_body(conclusion: &Conclusion) -> String {
        let mut out = String::new();
        if conclusion.is_fallback {
            out.push_str(&format!(
                "{}\n",
                "No model produced a conclusion; summary built from the discussion record."
                    .yellow()
            ));
        } else if !conclusion.sources.is_empty() {
            out.push_str(&format!(
                "{} {}\n",
                "Merged from:".dimmed(),
                conclusion.sources.join(", ")
            ));
        }

        let sections = [
            ("Accomplishments", &conclusion.accomplishments),
            ("Insights", &conclusion.insights),
            ("Recommendations", &conclusion.recommendations),
            ("Open Questions", &conclusion.open_questions),
        ];
        for (title, items) in sections {
            if items.is_empty() {
                continue;
            }
            out.push_str(&format!("\n{}\n", format!("{title}:").green().bold()));
            for item in items {
                out.push_str(&format!("  * {}\n", item));
            }
        }
        if conclusion.is_empty() {
            out.push_str("\nNothing conclusive was recorded.\n");
        }
        out
    }

    /// Catalog listing grouped by tier; a model may appear in several tiers
    pub fn format_models(catalog: &[ModelDescriptor], roster: &TierRoster) -> String {
        let mut out = String::new();
        out.push_str(&Self::header("Model Catalog"));
        out.push('\n');
        if catalog.is_empty() {
            out.push_str("No models configured. Add [[models]] entries to council.toml.\n");
            return out;
        }

        for tier in ModelTier::ALL {
            out.push_str(&Self::section_header(&format!("{} tier", tier.as_str())));
            let models = roster.models(tier);
            if models.is_empty() {
                out.push_str(&format!("  {}\n", "(none)".dimmed()));
            }
            for model in models {
                out.push_str(&format!(
                    "  {:<28} {:<10} quality {:>4.1}  speed {:>4.1}  ${:.2e}/token\n",
                    model.id, model.provider, model.quality_score, model.speed_score, model.cost_per_token
                ));
            }
        }

        let unclassified: Vec<&str> = catalog
            .iter()
            .filter(|m| roster.primary_tier(&m.id).is_none())
            .map(|m| m.id.as_str())
            .collect();
        if !unclassified.is_empty() {
            out.push_str(&format!(
                "\n{} {}\n",
                "Unclassified (used only when every tier is exhausted):".yellow(),
                unclassified.join(", ")
            ));
        }
        out.push_str(&Self::footer());
        out
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conclusion_body_lists_sections() {
        colored::control::set_override(false);
        let conclusion = Conclusion {
            objective: "Design a rate limiter".to_string(),
            accomplishments: vec!["Chose a token bucket".to_string()],
            insights: vec![],
            recommendations: vec!["Store counters in Redis".to_string()],
            open_questions: vec![],
            sources: vec!["alpha".to_string()],
            is_fallback: false,
        };
        let body = ConsoleFormatter::conclusion_body(&conclusion);
        assert!(body.contains("Merged from: alpha"));
        assert!(body.contains("Accomplishments:\n  * Chose a token bucket"));
        assert!(body.contains("Recommendations:"));
        assert!(!body.contains("Insights:"));
    }

    #[test]
    fn test_format_models_groups_by_tier() {
        colored::control::set_override(false);
        let catalog = vec![
            ModelDescriptor::new("opus", "anthropic").with_quality(9.5).with_cost(0.00002),
            ModelDescriptor::new("llama", "ollama").with_quality(6.0).with_speed(8.0),
        ];
        let roster = TierRoster::classify(&catalog, &["ollama".to_string()]);
        let text = ConsoleFormatter::format_models(&catalog, &roster);
        assert!(text.contains("premium tier"));
        assert!(text.contains("economical tier"));
        assert!(text.contains("llama"));
    }

    #[test]
    fn test_format_models_empty_catalog() {
        let text = ConsoleFormatter::format_models(&[], &TierRoster::default());
        assert!(text.contains("No models configured"));
    }
}
