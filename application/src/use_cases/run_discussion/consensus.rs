//! Round evaluation and the continuation vote.

use super::{Discussion, OrchestratorError};
use crate::ports::conversation_logger::ConversationEvent;
use crate::ports::llm_gateway::OracleRequest;
use crate::use_cases::shared::check_cancelled;
use council_domain::{
    ConsensusVote, ContinuationTally, Exchange, MemoryKind, PromptTemplate, RoundOutcome,
    StopPolicy, StopReason, StoreRequest, TransitionReason, now_millis, select_voters,
};
use serde_json::json;
use tracing::{debug, info};

/// Exchanges shown to voters
const VOTE_CONTEXT: usize = 4;

impl Discussion<'_> {
    /// Fold the round into conversation memory and ask the round policy
    /// whether to move on
    pub(super) async fn evaluate_round(
        &mut self,
        exchanges: Vec<Exchange>,
    ) -> Result<RoundOutcome, OrchestratorError> {
        let decisions_before = self.conversation.decisions().len();
        for exchange in &exchanges {
            let useful = !exchange.is_fallback && !exchange.content.trim().is_empty();
            self.selector.record_outcome(&exchange.agent_type, useful);
            self.conversation.record(exchange.clone(), self.analyzer.as_ref());
        }

        let new_decisions: Vec<String> = self.conversation.decisions()[decisions_before..].to_vec();
        if !new_decisions.is_empty() {
            let speakers: Vec<_> = exchanges
                .iter()
                .filter(|e| !e.is_fallback)
                .map(|e| e.agent_id.clone())
                .collect();
            let now = now_millis();
            for agent_id in speakers {
                for decision in &new_decisions {
                    self.memory
                        .remember(
                            &agent_id,
                            MemoryKind::LongTerm,
                            decision,
                            StoreRequest::from_source("council").with_category("decision"),
                            now,
                            self.token,
                        )
                        .await?;
                }
            }
        }

        let progress = self.conversation.snapshot();
        let outcome = self
            .rounds
            .complete_round(exchanges, progress, self.analyzer.as_ref());
        let evaluation = &outcome.evaluation;
        info!(
            "Round {} evaluated: {}{}",
            outcome.round,
            outcome.reason,
            if outcome.advanced { "" } else { " (not advanced)" }
        );
        debug!(
            "complete={} depth={} insights={} consensus={} redundancy={} progress={}",
            evaluation.objectives_complete,
            evaluation.sufficient_depth,
            evaluation.new_insights,
            evaluation.consensus_reached,
            evaluation.redundancy,
            evaluation.progress_made
        );
        self.events.push(ConversationEvent::system(json!({
            "event": "round_evaluated",
            "round": outcome.round,
            "reason": outcome.reason.as_str(),
            "advanced": outcome.advanced,
            "decisions": self.conversation.decisions().len(),
            "open_questions": self.conversation.open_questions().len(),
        })));
        self.progress.on_round_complete(&outcome);
        Ok(outcome)
    }

    /// Poll a diverse sample of models on whether to continue.
    ///
    /// Failed calls and answers that are not votes are left out of the
    /// tally. The round's own transition reason is passed to the voters as
    /// advice.
    pub(super) async fn continuation_vote(
        &mut self,
        iteration: u32,
        policy: &StopPolicy,
        round_reason: TransitionReason,
    ) -> Result<(ContinuationTally, Option<StopReason>), OrchestratorError> {
        check_cancelled(self.token)?;
        let voters = select_voters(
            &self.catalog,
            &self.config.orchestrator.newest_models,
            &self.registry.roster(),
            self.config.orchestrator.consensus_sample_size,
        );
        let assessment = if round_reason.suggests_stop() {
            format!("the round policy suggests wrapping up ({round_reason})")
        } else {
            "more exploration is warranted".to_string()
        };
        let prompt = PromptTemplate::consensus_vote(
            &self.objective,
            iteration,
            &assessment,
            self.conversation.decisions(),
            self.conversation.open_questions(),
            &self.conversation.recent_substantive(VOTE_CONTEXT),
        );
        let requests = voters
            .iter()
            .map(|model| OracleRequest::new(&model.id, prompt.clone()))
            .collect();
        let responses = self.oracle.ask_all(requests).await;
        check_cancelled(self.token)?;

        let votes: Vec<ConsensusVote> = voters
            .iter()
            .zip(&responses)
            .filter(|(_, response)| !response.is_fallback())
            .filter_map(|(model, response)| ConsensusVote::parse(&model.id, &response.content))
            .collect();
        let tally = ContinuationTally::from_votes(votes);
        let stop = policy.evaluate(&tally, iteration);

        info!(
            "Vote {}: {}/{} votes, continue {:.0}% (weighted {:.0}%), completion {:.0}%{}",
            iteration,
            tally.votes.len(),
            voters.len(),
            tally.simple_ratio * 100.0,
            tally.weighted_ratio * 100.0,
            tally.average_completion,
            stop.map(|r| format!(", stopping: {}", r.as_str()))
                .unwrap_or_default()
        );
        self.events.push(ConversationEvent::system(json!({
            "event": "continuation_vote",
            "iteration": iteration,
            "votes": tally.votes,
            "simple_ratio": tally.simple_ratio,
            "weighted_ratio": tally.weighted_ratio,
            "average_completion": tally.average_completion,
            "stop": stop.map(|r| r.as_str().to_string()),
        })));
        self.progress.on_vote(iteration, &tally, stop);
        Ok((tally, stop))
    }
}
