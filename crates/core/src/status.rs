//! Document status state machine and webhook action vocabulary.
//!
//! A document moves through a fixed sequence of stages, each with a
//! "pending" twin while the remote Nolej service works asynchronously:
//!
//! ```text
//! Creation -> CreationPending -> Analysis -> AnalysisPending
//!          -> Revision -> RevisionPending -> Activities
//!          -> ActivitiesPending -> Completed
//! ```
//!
//! `Failed` is terminal and reachable from any pending state. Status
//! codes are stored as SMALLINT in the `documents` table; the numeric
//! values are part of the polling protocol and must not change.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a content-generation document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Creation,
    CreationPending,
    Analysis,
    AnalysisPending,
    Revision,
    RevisionPending,
    Activities,
    ActivitiesPending,
    Completed,
    Failed,
}

impl DocumentStatus {
    /// Wire/database code for this status.
    pub fn code(self) -> i16 {
        match self {
            DocumentStatus::Creation => 0,
            DocumentStatus::CreationPending => 1,
            DocumentStatus::Analysis => 2,
            DocumentStatus::AnalysisPending => 3,
            DocumentStatus::Revision => 4,
            DocumentStatus::RevisionPending => 5,
            DocumentStatus::Activities => 6,
            DocumentStatus::ActivitiesPending => 7,
            DocumentStatus::Completed => 8,
            DocumentStatus::Failed => 9,
        }
    }

    /// Parse a database/wire code back into a status.
    pub fn from_code(code: i16) -> Option<Self> {
        Some(match code {
            0 => DocumentStatus::Creation,
            1 => DocumentStatus::CreationPending,
            2 => DocumentStatus::Analysis,
            3 => DocumentStatus::AnalysisPending,
            4 => DocumentStatus::Revision,
            5 => DocumentStatus::RevisionPending,
            6 => DocumentStatus::Activities,
            7 => DocumentStatus::ActivitiesPending,
            8 => DocumentStatus::Completed,
            9 => DocumentStatus::Failed,
            _ => return None,
        })
    }

    /// True while the document is waiting on the remote service.
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            DocumentStatus::CreationPending
                | DocumentStatus::AnalysisPending
                | DocumentStatus::RevisionPending
                | DocumentStatus::ActivitiesPending
        )
    }

    /// True once no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, DocumentStatus::Completed | DocumentStatus::Failed)
    }
}

/// Action tag carried by a Nolej webhook payload.
///
/// The three substantive actions correspond to the asynchronous stages;
/// `WorkInProgress` is a liveness ack and never changes state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookAction {
    Transcription,
    Analysis,
    Activities,
    WorkInProgress,
}

impl WebhookAction {
    /// Parse the `action` field of a webhook payload.
    pub fn parse(action: &str) -> Option<Self> {
        Some(match action {
            "transcription" => WebhookAction::Transcription,
            "analysis" => WebhookAction::Analysis,
            "activities" => WebhookAction::Activities,
            "work in progress" => WebhookAction::WorkInProgress,
            _ => return None,
        })
    }

    /// The exact pending state a document must be in for this action's
    /// webhook to be accepted. Out-of-order or replayed deliveries fail
    /// this precondition and are rejected without mutation.
    pub fn expected_status(self) -> Option<DocumentStatus> {
        match self {
            WebhookAction::Transcription => Some(DocumentStatus::CreationPending),
            WebhookAction::Analysis => Some(DocumentStatus::AnalysisPending),
            WebhookAction::Activities => Some(DocumentStatus::ActivitiesPending),
            WebhookAction::WorkInProgress => None,
        }
    }

    /// Stage name used as the Activity Record action prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            WebhookAction::Transcription => "transcription",
            WebhookAction::Analysis => "analysis",
            WebhookAction::Activities => "activities",
            WebhookAction::WorkInProgress => "work in progress",
        }
    }
}
