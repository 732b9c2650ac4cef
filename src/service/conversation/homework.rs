use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{ConversationStore, Flow, HomeworkStep};
use crate::{
    error::{BotError, BotResult},
    storage::{MemberKey, NewHomework, Store},
};

/// What the flow wants to say back after a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowReply {
    pub text: String,
    /// Single row of suggested answers, empty when there is nothing to suggest.
    pub buttons: Vec<String>,
    pub completed: bool,
}

impl FlowReply {
    fn prompt(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
            completed: false,
        }
    }
}

/// Collects subject, task and deadline over three messages and stores the result.
#[derive(Clone)]
pub struct HomeworkFlow {
    conversations: ConversationStore,
    store: Arc<dyn Store>,
    subjects: Vec<String>,
}

impl HomeworkFlow {
    pub fn new(conversations: ConversationStore, store: Arc<dyn Store>, subjects: Vec<String>) -> Self {
        Self {
            conversations,
            store,
            subjects,
        }
    }

    pub fn begin(&self, key: MemberKey, now: DateTime<Utc>) -> FlowReply {
        self.conversations.cleanup_expired(now);
        self.conversations
            .begin(key, Flow::Homework(HomeworkStep::AwaitingSubject), now);
        self.subject_prompt()
    }

    pub async fn continue_flow(&self, key: MemberKey, input: &str, now: DateTime<Utc>) -> BotResult<FlowReply> {
        let state = self
            .conversations
            .active(key, now)
            .ok_or_else(|| BotError::DialogueStateError(format!("no active flow for {:?}", key)))?;

        let Flow::Homework(step) = state.flow;
        let input = input.trim();

        if input.is_empty() {
            return Ok(self.reprompt(&step));
        }

        match step {
            HomeworkStep::AwaitingSubject => {
                let next = HomeworkStep::AwaitingTask {
                    subject: input.to_string(),
                };
                self.conversations.advance(key, Flow::Homework(next), now);
                Ok(FlowReply::prompt(t!("homework.ask_task", subject = input)))
            }
            HomeworkStep::AwaitingTask { subject } => {
                let next = HomeworkStep::AwaitingDeadline {
                    subject,
                    task: input.to_string(),
                };
                self.conversations.advance(key, Flow::Homework(next), now);
                Ok(FlowReply::prompt(t!("homework.ask_deadline")))
            }
            HomeworkStep::AwaitingDeadline { subject, task } => {
                self.conversations.finish(key);

                let (chat_id, author) = key;
                let entry = self
                    .store
                    .add_homework(NewHomework {
                        chat_id,
                        subject,
                        task,
                        deadline: input.to_string(),
                        author,
                    })
                    .await?;

                info!("Homework {} saved in chat {}", entry.id, chat_id);

                Ok(FlowReply {
                    text: t!("homework.saved", id = entry.id, subject = entry.subject).to_string(),
                    buttons: Vec::new(),
                    completed: true,
                })
            }
        }
    }

    /// Drops the member's flow. `None` when there was nothing to cancel.
    pub fn cancel(&self, key: MemberKey) -> Option<String> {
        self.conversations
            .finish(key)
            .map(|state| {
                debug!("Cancelled {} flow of {:?}", state.flow.name(), key);
                t!("homework.cancelled").to_string()
            })
    }

    fn subject_prompt(&self) -> FlowReply {
        FlowReply {
            text: t!("homework.ask_subject").to_string(),
            buttons: self.subjects.clone(),
            completed: false,
        }
    }

    fn reprompt(&self, step: &HomeworkStep) -> FlowReply {
        match step {
            HomeworkStep::AwaitingSubject => self.subject_prompt(),
            HomeworkStep::AwaitingTask { subject } => FlowReply::prompt(t!("homework.ask_task", subject = subject)),
            HomeworkStep::AwaitingDeadline { .. } => FlowReply::prompt(t!("homework.ask_deadline")),
        }
    }
}
