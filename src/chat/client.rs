use super::message::{ChatRequest, Response};
use crate::error::{ActorError, ChatError, LoadError};
use crate::model::{ChatTurn, TurnId};
use crate::slot::{SubscriberId, Subscription};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// Handle views use to drive and observe the conversation.
#[derive(Clone)]
pub struct ChatClient {
    sender: mpsc::Sender<ChatRequest>,
}

impl ChatClient {
    pub fn new(sender: mpsc::Sender<ChatRequest>) -> Self {
        Self { sender }
    }

    async fn request<R>(&self, make: impl FnOnce(Response<R>) -> ChatRequest) -> Result<R, ActorError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(make(respond_to))
            .await
            .map_err(|_| ActorError::ActorClosed)?;
        response.await.map_err(|_| ActorError::ActorDropped)
    }

    /// Appends a turn for `text` and sends it. Returns the new turn's id.
    #[instrument(skip(self, text))]
    pub async fn send(&self, text: impl Into<String>) -> Result<TurnId, ChatError> {
        let text = text.into();
        debug!(len = text.len(), "Sending request");
        Ok(self
            .request(|respond_to| ChatRequest::Send { text, respond_to })
            .await?)
    }

    /// Resends a failed turn's original text, updating the same row.
    #[instrument(skip(self))]
    pub async fn retry(&self, id: TurnId) -> Result<(), ChatError> {
        debug!("Sending request");
        self.request(|respond_to| ChatRequest::Retry { id, respond_to })
            .await?
    }

    /// Replaces a pending or revealing response with `error`.
    #[instrument(skip(self))]
    pub async fn interrupt(&self, id: TurnId, error: LoadError) -> Result<(), ChatError> {
        debug!("Sending request");
        self.request(|respond_to| ChatRequest::Interrupt {
            id,
            error,
            respond_to,
        })
        .await?
    }

    /// Current turns in display order.
    pub async fn turns(&self) -> Result<Vec<ChatTurn>, ChatError> {
        Ok(self
            .request(|respond_to| ChatRequest::Turns { respond_to })
            .await?)
    }

    pub async fn turn(&self, id: TurnId) -> Result<ChatTurn, ChatError> {
        self.turns()
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| ChatError::TurnNotFound(id.to_string()))
    }

    /// Every existing turn is delivered first, then each changed turn.
    pub async fn subscribe(&self) -> Result<Subscription<ChatTurn>, ChatError> {
        Ok(self
            .request(|respond_to| ChatRequest::Subscribe { respond_to })
            .await?)
    }

    pub async fn unsubscribe(&self, id: SubscriberId) -> Result<bool, ChatError> {
        Ok(self
            .request(|respond_to| ChatRequest::Unsubscribe { id, respond_to })
            .await?)
    }
}
