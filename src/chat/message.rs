use crate::error::{ChatError, LoadError};
use crate::model::{ChatTurn, TurnId};
use crate::slot::{SubscriberId, Subscription};
use tokio::sync::oneshot;

pub type Response<T> = oneshot::Sender<T>;

/// Requests accepted by the [`ConversationActor`](super::ConversationActor).
#[derive(Debug)]
pub enum ChatRequest {
    Send {
        text: String,
        respond_to: Response<TurnId>,
    },
    Retry {
        id: TurnId,
        respond_to: Response<Result<(), ChatError>>,
    },
    Interrupt {
        id: TurnId,
        error: LoadError,
        respond_to: Response<Result<(), ChatError>>,
    },
    Turns {
        respond_to: Response<Vec<ChatTurn>>,
    },
    Subscribe {
        respond_to: Response<Subscription<ChatTurn>>,
    },
    Unsubscribe {
        id: SubscriberId,
        respond_to: Response<bool>,
    },
}
