use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HomeworkStep {
    AwaitingSubject,
    AwaitingTask { subject: String },
    AwaitingDeadline { subject: String, task: String },
}

/// A multi-step flow together with the data entered so far.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flow {
    Homework(HomeworkStep),
}

impl Flow {
    pub fn name(&self) -> &'static str {
        match self {
            Flow::Homework(_) => "homework-capture",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub flow: Flow,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
