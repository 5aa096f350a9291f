//! Progress reporting for council discussions

use colored::Colorize;
use council_application::{OracleResponse, OrchestrationProgress};
use council_domain::{
    ActionSuggestion, Agent, Conclusion, ContinuationTally, DiscussionStage, Objective,
    RoundOutcome, RoundPlan, StopReason,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

fn stage_display_name(stage: DiscussionStage) -> &'static str {
    match stage {
        DiscussionStage::AnalyzingObjective => "Analyzing objective",
        DiscussionStage::SelectingAgents => "Selecting agents",
        DiscussionStage::Planning => "Planning round",
        DiscussionStage::Acting => "Agents at work",
        DiscussionStage::Evaluating => "Voting on continuation",
        DiscussionStage::Concluding => "Drafting conclusion",
        DiscussionStage::Done => "Done",
    }
}

fn vote_summary(iteration: u32, tally: &ContinuationTally, stop: Option<StopReason>) -> String {
    let verdict = match stop {
        Some(reason) => format!("stop ({})", reason.as_str()).yellow().to_string(),
        None => "continue".green().to_string(),
    };
    format!(
        "Iteration {}: {} votes, weighted continue {:.0}%, completion {:.0}% -> {}",
        iteration,
        tally.votes.len(),
        tally.weighted_ratio * 100.0,
        tally.average_completion,
        verdict
    )
}

/// Reports progress with a spinner that prints milestones above it
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn with_spinner(&self, f: impl FnOnce(&ProgressBar)) {
        let Ok(mut guard) = self.spinner.lock() else {
            return;
        };
        let spinner = guard.get_or_insert_with(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(120));
            pb
        });
        f(spinner);
    }

    fn println(&self, line: String) {
        self.with_spinner(|pb| pb.println(line));
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestrationProgress for ProgressReporter {
    fn on_stage(&self, stage: DiscussionStage) {
        if stage == DiscussionStage::Done {
            if let Ok(mut guard) = self.spinner.lock()
                && let Some(pb) = guard.take()
            {
                pb.finish_and_clear();
            }
            return;
        }
        self.with_spinner(|pb| {
            pb.set_prefix(stage_display_name(stage));
            pb.set_message("");
        });
    }

    fn on_objective(&self, objective: &Objective) {
        self.println(format!(
            "{} {} (complexity {}/10)",
            "Objective:".cyan().bold(),
            objective.main_objective,
            objective.complexity
        ));
    }

    fn on_agents_joined(&self, agents: &[Agent]) {
        for agent in agents {
            let model = agent.assigned_model.as_deref().unwrap_or("unassigned");
            let marker = if agent.is_sub_agent { "  +" } else { "+" };
            self.println(format!("{} {} on {}", marker.green(), agent.id, model.dimmed()));
        }
    }

    fn on_round_start(&self, plan: &RoundPlan) {
        self.println(format!(
            "{} {} ({}): {}",
            "Round".yellow().bold(),
            plan.round_number,
            plan.phase,
            plan.focus
        ));
    }

    fn on_action(&self, action: &ActionSuggestion) {
        self.with_spinner(|pb| pb.set_message(format!("{} ({})", action.kind, action.model)));
    }

    fn on_agent_response(&self, agent: &Agent, response: &OracleResponse) {
        self.with_spinner(|pb| {
            pb.set_message(format!("{} answered via {}", agent.id, response.model))
        });
    }

    fn on_round_complete(&self, outcome: &RoundOutcome) {
        if outcome.advanced {
            self.println(format!(
                "  {} round {} closed: {}",
                "v".green(),
                outcome.round,
                outcome.reason
            ));
        }
    }

    fn on_vote(&self, iteration: u32, tally: &ContinuationTally, stop: Option<StopReason>) {
        self.println(format!("  {}", vote_summary(iteration, tally, stop)));
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl OrchestrationProgress for SimpleProgress {
    fn on_stage(&self, stage: DiscussionStage) {
        if stage != DiscussionStage::Done {
            println!("{} {}", "->".cyan(), stage_display_name(stage).bold());
        }
    }

    fn on_agents_joined(&self, agents: &[Agent]) {
        for agent in agents {
            println!(
                "  {} {} on {}",
                "+".green(),
                agent.id,
                agent.assigned_model.as_deref().unwrap_or("unassigned")
            );
        }
    }

    fn on_round_start(&self, plan: &RoundPlan) {
        println!("{} Round {} ({})", "->".cyan(), plan.round_number, plan.phase);
    }

    fn on_agent_response(&self, agent: &Agent, response: &OracleResponse) {
        println!("  {} {} ({})", "v".green(), agent.id, response.model);
    }

    fn on_vote(&self, iteration: u32, tally: &ContinuationTally, stop: Option<StopReason>) {
        println!("  {}", vote_summary(iteration, tally, stop));
    }

    fn on_conclusion(&self, _conclusion: &Conclusion) {
        println!();
    }
}
