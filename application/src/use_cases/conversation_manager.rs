//! Conversation Manager
//!
//! Runs discussions in the background. Each conversation gets its own tokio
//! task and cancellation token; callers poll [`ConversationManager::status`]
//! or await [`ConversationManager::wait`] for the outcome.

use crate::config::DiscussionMode;
use crate::ports::progress::{NoProgress, OrchestrationProgress};
use crate::use_cases::run_discussion::{
    ConversationOrchestrator, DiscussionInput, DiscussionOutput, OrchestratorError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub type ConversationId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "detail")]
pub enum ConversationStatus {
    Running,
    Completed,
    Failed(String),
    Cancelled,
}

impl ConversationStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, ConversationStatus::Running)
    }
}

struct Tracked {
    token: CancellationToken,
    status: watch::Receiver<ConversationStatus>,
    output: Arc<Mutex<Option<DiscussionOutput>>>,
}

/// Starts, stops and tracks background discussions
pub struct ConversationManager {
    orchestrator: Arc<ConversationOrchestrator>,
    progress: Arc<dyn OrchestrationProgress>,
    conversations: Mutex<HashMap<ConversationId, Tracked>>,
    sequence: AtomicUsize,
}

impl ConversationManager {
    pub fn new(orchestrator: ConversationOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            progress: Arc::new(NoProgress),
            conversations: Mutex::new(HashMap::new()),
            sequence: AtomicUsize::new(0),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn OrchestrationProgress>) -> Self {
        self.progress = progress;
        self
    }

    fn conversations(&self) -> MutexGuard<'_, HashMap<ConversationId, Tracked>> {
        self.conversations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Spawn a discussion and return its id
    pub fn start_conversation(
        &self,
        objective: impl Into<String>,
        mode: DiscussionMode,
        complexity: Option<u8>,
    ) -> ConversationId {
        let mut input = DiscussionInput::new(objective).with_mode(mode);
        if let Some(complexity) = complexity {
            input = input.with_complexity(complexity);
        }
        // Sequence suffix keeps ids unique within one manager
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let id = format!("{}-{}", input.conversation_id, seq);
        let input = input.with_conversation_id(id.clone());
        let token = CancellationToken::new();
        let (status_tx, status_rx) = watch::channel(ConversationStatus::Running);
        let output = Arc::new(Mutex::new(None));

        let orchestrator = Arc::clone(&self.orchestrator);
        let progress = Arc::clone(&self.progress);
        let task_token = token.clone();
        let task_output = Arc::clone(&output);
        let task_id = id.clone();
        tokio::spawn(async move {
            let result = orchestrator
                .execute_with_progress(input, progress.as_ref(), task_token)
                .await;
            let status = match result {
                Ok(finished) => {
                    info!("Conversation {} completed", task_id);
                    if let Ok(mut slot) = task_output.lock() {
                        *slot = Some(finished);
                    }
                    ConversationStatus::Completed
                }
                Err(OrchestratorError::Cancelled) => {
                    info!("Conversation {} cancelled", task_id);
                    ConversationStatus::Cancelled
                }
                Err(e) => {
                    warn!("Conversation {} failed: {}", task_id, e);
                    ConversationStatus::Failed(e.to_string())
                }
            };
            let _ = status_tx.send(status);
        });

        self.conversations().insert(
            id.clone(),
            Tracked {
                token,
                status: status_rx,
                output,
            },
        );
        id
    }

    /// Request cancellation; returns false for unknown or finished runs
    pub fn stop_conversation(&self, id: &str) -> bool {
        let conversations = self.conversations();
        let Some(tracked) = conversations.get(id) else {
            return false;
        };
        if tracked.status.borrow().is_finished() {
            return false;
        }
        tracked.token.cancel();
        true
    }

    pub fn status(&self, id: &str) -> Option<ConversationStatus> {
        self.conversations()
            .get(id)
            .map(|tracked| tracked.status.borrow().clone())
    }

    /// Ids of every tracked conversation
    pub fn conversation_ids(&self) -> Vec<ConversationId> {
        self.conversations().keys().cloned().collect()
    }

    /// Stop tracking a finished conversation; running ones are kept
    pub fn forget(&self, id: &str) -> bool {
        let mut conversations = self.conversations();
        let finished = conversations
            .get(id)
            .is_some_and(|tracked| tracked.status.borrow().is_finished());
        if finished {
            conversations.remove(id);
        }
        finished
    }

    /// Wait for a conversation to finish and take its output.
    ///
    /// Returns the final status; the output is present only for a completed
    /// run. The conversation is no longer tracked afterwards.
    pub async fn wait(&self, id: &str) -> Option<(ConversationStatus, Option<DiscussionOutput>)> {
        let (mut status, output) = {
            let conversations = self.conversations();
            let tracked = conversations.get(id)?;
            (tracked.status.clone(), Arc::clone(&tracked.output))
        };
        let finished = match status.wait_for(ConversationStatus::is_finished).await {
            Ok(state) => state.clone(),
            Err(_) => ConversationStatus::Failed("conversation task ended unexpectedly".to_string()),
        };
        let output = output.lock().ok().and_then(|mut slot| slot.take());
        self.conversations().remove(id);
        Some((finished, output))
    }
}
