//! Outbound event queue.
//!
//! The orchestrator appends [`ConversationEvent`]s to an [`EventQueue`] and
//! moves on; a drain task spawned with [`EventQueue::spawn_drain`] forwards
//! them to the [`ConversationLogger`]. Appending never blocks and never
//! fails, even after the drain has stopped.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct EventQueue {
    sender: mpsc::UnboundedSender<ConversationEvent>,
    conversation_id: String,
}

impl EventQueue {
    /// Create a queue and the receiver its drain reads from
    pub fn new(
        conversation_id: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<ConversationEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender,
                conversation_id: conversation_id.into(),
            },
            receiver,
        )
    }

    /// Create a queue whose events are forwarded to `logger` by a spawned task.
    ///
    /// The task ends once every clone of the queue is dropped.
    pub fn spawn_drain(
        conversation_id: impl Into<String>,
        logger: Arc<dyn ConversationLogger>,
    ) -> (Self, JoinHandle<usize>) {
        let (queue, mut receiver) = Self::new(conversation_id);
        let handle = tokio::spawn(async move {
            let mut drained = 0;
            while let Some(event) = receiver.recv().await {
                logger.log(event);
                drained += 1;
            }
            drained
        });
        (queue, handle)
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Append an event, stamping the conversation id into its metadata
    pub fn push(&self, event: ConversationEvent) {
        let metadata = match event.metadata {
            Value::Object(mut map) => {
                map.insert("conversation_id".to_string(), json!(self.conversation_id));
                Value::Object(map)
            }
            Value::Null => json!({ "conversation_id": self.conversation_id }),
            other => json!({ "conversation_id": self.conversation_id, "extra": other }),
        };
        let _ = self.sender.send(ConversationEvent { metadata, ..event });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::conversation_logger::EventKind;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<ConversationEvent>>,
    }

    impl ConversationLogger for RecordingLogger {
        fn log(&self, event: ConversationEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[tokio::test]
    async fn test_drain_forwards_in_order() {
        let logger = Arc::new(RecordingLogger::default());
        let (queue, handle) = EventQueue::spawn_drain("c-1", logger.clone());
        queue.push(ConversationEvent::system(json!({"step": 1})));
        queue.push(
            ConversationEvent::agent_response(json!({"step": 2}))
                .with_metadata(json!({"round": 3})),
        );
        drop(queue);
        assert_eq!(handle.await.unwrap(), 2);

        let events = logger.events.lock().unwrap();
        assert_eq!(events[0].kind, EventKind::System);
        assert_eq!(events[1].metadata["round"], 3);
        assert_eq!(events[1].metadata["conversation_id"], "c-1");
    }

    #[tokio::test]
    async fn test_push_after_receiver_dropped_is_silent() {
        let (queue, receiver) = EventQueue::new("c-2");
        drop(receiver);
        queue.push(ConversationEvent::tool_usage(json!({"tool": "search"})));
    }
}
