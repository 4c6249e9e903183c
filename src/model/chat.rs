use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Stable identifier of one conversation turn.
///
/// Retrying a turn keeps its id, so a view keyed on it updates the row in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TurnId(pub u64);

impl From<u64> for TurnId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "turn_{}", self.0)
    }
}

/// Lifecycle of the AI response within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseState {
    Sending,
    AwaitingResponse,
    Revealing,
    Displayed,
    Failed,
}

impl Display for ResponseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseState::Sending => "sending",
            ResponseState::AwaitingResponse => "awaiting response",
            ResponseState::Revealing => "revealing",
            ResponseState::Displayed => "displayed",
            ResponseState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Read-only snapshot of one user message and its response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: TurnId,
    pub user_text: String,
    pub response_text: Option<String>,
    pub response_state: ResponseState,
    pub error_detail: Option<String>,
    /// Byte length of the revealed prefix of `response_text`.
    pub revealed_prefix_len: usize,
}

impl ChatTurn {
    /// The part of the response a view should currently show.
    pub fn revealed_text(&self) -> &str {
        match &self.response_text {
            Some(text) => text.get(..self.revealed_prefix_len).unwrap_or(text),
            None => "",
        }
    }

    /// Drives the "thinking" indicator shown next to the pending response.
    pub fn is_thinking(&self) -> bool {
        matches!(
            self.response_state,
            ResponseState::Sending | ResponseState::AwaitingResponse
        )
    }

    pub fn can_retry(&self) -> bool {
        self.response_state == ResponseState::Failed
    }
}
