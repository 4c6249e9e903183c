use crate::error::{ChatError, LoadError};
use crate::model::{ChatTurn, ResponseState, TurnId};
use crate::reveal::{RevealController, RevealUpdate};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle of one conversation turn.
///
/// ```text
/// Sending ─▶ AwaitingResponse ─▶ Revealing ─▶ Displayed
///    │              │                │
///    └──────────────┴────────────────┴──▶ Failed ──retry()──▶ Sending
/// ```
///
/// Every dispatch of the outbound message is an *attempt*. Replies and reveal updates
/// carry the attempt they belong to and are ignored once a newer attempt exists, so
/// nothing from a discarded attempt can surface after `retry()`.
///
/// The machine owns at most one [`RevealController`]; it exists only while `Revealing`.
#[derive(Debug)]
pub struct ChatTurnStateMachine {
    id: TurnId,
    user_text: String,
    response_text: Option<String>,
    state: ResponseState,
    error_detail: Option<String>,
    revealed: usize,
    attempt: u32,
    controller: Option<RevealController>,
}

impl ChatTurnStateMachine {
    pub fn new(id: TurnId, user_text: impl Into<String>) -> Self {
        Self {
            id,
            user_text: user_text.into(),
            response_text: None,
            state: ResponseState::Sending,
            error_detail: None,
            revealed: 0,
            attempt: 1,
            controller: None,
        }
    }

    pub fn id(&self) -> TurnId {
        self.id
    }

    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    pub fn state(&self) -> ResponseState {
        self.state
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn has_controller(&self) -> bool {
        self.controller.is_some()
    }

    /// The outbound request for `attempt` is now with the transport.
    pub fn mark_awaiting(&mut self, attempt: u32) -> bool {
        if attempt != self.attempt || self.state != ResponseState::Sending {
            return false;
        }
        self.state = ResponseState::AwaitingResponse;
        true
    }

    /// Applies the transport's answer for `attempt`.
    ///
    /// A response starts a fresh reveal whose updates are handed to `on_update`; the
    /// owner routes them back through [`on_reveal`](Self::on_reveal).
    pub fn on_response<F>(
        &mut self,
        attempt: u32,
        result: Result<String, LoadError>,
        interval: Duration,
        on_update: F,
    ) -> bool
    where
        F: FnMut(RevealUpdate) + Send + 'static,
    {
        if attempt != self.attempt
            || !matches!(
                self.state,
                ResponseState::Sending | ResponseState::AwaitingResponse
            )
        {
            debug!(turn_id = %self.id, attempt, current = self.attempt, "Ignoring stale response");
            return false;
        }
        match result {
            Ok(text) => {
                info!(turn_id = %self.id, attempt, len = text.len(), "Revealing response");
                self.revealed = 0;
                self.state = ResponseState::Revealing;
                self.controller = Some(RevealController::start(&text, interval, on_update));
                self.response_text = Some(text);
            }
            Err(e) => self.fail(e),
        }
        true
    }

    /// Applies a reveal tick for `attempt`.
    pub fn on_reveal(&mut self, attempt: u32, update: RevealUpdate) -> bool {
        if attempt != self.attempt || self.state != ResponseState::Revealing {
            return false;
        }
        let full_len = self.response_text.as_ref().map_or(0, String::len);
        match update {
            RevealUpdate::Progress(len) => self.revealed = len.min(full_len),
            RevealUpdate::Complete => {
                self.revealed = full_len;
                self.state = ResponseState::Displayed;
                self.controller = None;
                info!(turn_id = %self.id, attempt, "Response displayed");
            }
        }
        true
    }

    /// Replaces whatever is pending or being revealed with an error.
    pub fn interrupt(&mut self, error: LoadError) -> Result<(), ChatError> {
        match self.state {
            ResponseState::Sending | ResponseState::AwaitingResponse | ResponseState::Revealing => {
                self.fail(error);
                Ok(())
            }
            _ => Err(self.invalid("interrupt")),
        }
    }

    /// Starts a new attempt with the same user text. Only valid from `Failed`.
    ///
    /// Returns the new attempt number.
    pub fn retry(&mut self) -> Result<u32, ChatError> {
        if self.state != ResponseState::Failed {
            return Err(self.invalid("retry"));
        }
        self.discard_controller();
        self.attempt += 1;
        self.response_text = None;
        self.error_detail = None;
        self.revealed = 0;
        self.state = ResponseState::Sending;
        info!(turn_id = %self.id, attempt = self.attempt, "Retrying");
        Ok(self.attempt)
    }

    pub fn snapshot(&self) -> ChatTurn {
        ChatTurn {
            id: self.id,
            user_text: self.user_text.clone(),
            response_text: self.response_text.clone(),
            response_state: self.state,
            error_detail: self.error_detail.clone(),
            revealed_prefix_len: self.revealed,
        }
    }

    fn fail(&mut self, error: LoadError) {
        warn!(turn_id = %self.id, attempt = self.attempt, error = %error, "Turn failed");
        self.discard_controller();
        self.response_text = None;
        self.revealed = 0;
        self.error_detail = Some(error.detail().to_string());
        self.state = ResponseState::Failed;
    }

    fn discard_controller(&mut self) {
        if let Some(mut controller) = self.controller.take() {
            controller.cancel();
        }
    }

    fn invalid(&self, operation: &'static str) -> ChatError {
        ChatError::InvalidTransition {
            turn_id: self.id.to_string(),
            operation,
            state: self.state.to_string(),
        }
    }
}
