//! Final synthesis.

use super::{Discussion, OrchestratorError};
use crate::ports::conversation_logger::ConversationEvent;
use crate::ports::llm_gateway::OracleRequest;
use crate::use_cases::shared::check_cancelled;
use council_domain::{Conclusion, Narrative, PromptTemplate, merge_narratives};
use serde_json::json;
use tracing::info;

const CONCLUSION_CONTEXT: usize = 6;

impl Discussion<'_> {
    /// Ask every catalog model for a narrative and merge the answers; with
    /// no answers the conclusion is built from conversation memory
    pub(super) async fn conclude(&mut self) -> Result<Conclusion, OrchestratorError> {
        check_cancelled(self.token)?;
        let prompt = PromptTemplate::conclusion(
            &self.objective,
            &self.conversation.recent_substantive(CONCLUSION_CONTEXT),
            self.conversation.decisions(),
            self.conversation.open_questions(),
        );
        let requests = self
            .catalog
            .iter()
            .map(|model| OracleRequest::new(&model.id, prompt.clone()))
            .collect();
        let responses = self.oracle.ask_all(requests).await;
        check_cancelled(self.token)?;

        let narratives: Vec<Narrative> = self
            .catalog
            .iter()
            .zip(responses)
            .filter(|(_, response)| !response.is_fallback())
            .map(|(model, response)| Narrative::new(&model.id, response.content))
            .collect();
        let conclusion = merge_narratives(
            &self.objective.main_objective,
            &narratives,
            &self.conversation,
            self.analyzer.as_ref(),
        );
        info!(
            "Conclusion from {} narratives{}",
            narratives.len(),
            if conclusion.is_fallback { " (structured summary)" } else { "" }
        );
        self.events.push(ConversationEvent::system(json!({
            "event": "conclusion",
            "sources": conclusion.sources,
            "fallback": conclusion.is_fallback,
            "accomplishments": conclusion.accomplishments.len(),
            "recommendations": conclusion.recommendations.len(),
        })));
        self.progress.on_conclusion(&conclusion);
        Ok(conclusion)
    }
}
