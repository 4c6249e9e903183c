use super::message::{CoordinatorRequest, CoordinatorSnapshot, LoadOutcome, ResourceKind, Response};
use crate::error::ActorError;
use crate::model::{EventsFeed, ImageBlob, PictureResource};
use crate::slot::{SlotState, SubscriberId, Subscription};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// Handle views use to drive and observe the [`LoadCoordinator`](super::LoadCoordinator).
#[derive(Clone)]
pub struct CoordinatorClient {
    sender: mpsc::Sender<CoordinatorRequest>,
}

impl CoordinatorClient {
    pub fn new(sender: mpsc::Sender<CoordinatorRequest>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        make: impl FnOnce(Response<R>) -> CoordinatorRequest,
    ) -> Result<R, ActorError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(make(respond_to))
            .await
            .map_err(|_| ActorError::ActorClosed)?;
        response.await.map_err(|_| ActorError::ActorDropped)
    }

    /// Fetches the daily picture unless it is already loaded or loading.
    ///
    /// On success the derived image is preloaded when the picture is an image.
    #[instrument(skip(self))]
    pub async fn load_picture(&self) -> Result<LoadOutcome, ActorError> {
        debug!("Sending request");
        self.request(|respond_to| CoordinatorRequest::LoadPicture { respond_to })
            .await
    }

    #[instrument(skip(self))]
    pub async fn load_events(&self) -> Result<LoadOutcome, ActorError> {
        debug!("Sending request");
        self.request(|respond_to| CoordinatorRequest::LoadEvents { respond_to })
            .await
    }

    /// Resets every slot and reloads picture and events (pull-to-refresh).
    #[instrument(skip(self))]
    pub async fn refresh_all(&self) -> Result<(), ActorError> {
        debug!("Sending request");
        self.request(|respond_to| CoordinatorRequest::RefreshAll { respond_to })
            .await
    }

    pub async fn snapshot(&self) -> Result<CoordinatorSnapshot, ActorError> {
        self.request(|respond_to| CoordinatorRequest::Snapshot { respond_to })
            .await
    }

    pub async fn subscribe_picture(
        &self,
    ) -> Result<Subscription<SlotState<PictureResource>>, ActorError> {
        self.request(|respond_to| CoordinatorRequest::SubscribePicture { respond_to })
            .await
    }

    pub async fn subscribe_image(&self) -> Result<Subscription<SlotState<ImageBlob>>, ActorError> {
        self.request(|respond_to| CoordinatorRequest::SubscribeImage { respond_to })
            .await
    }

    pub async fn subscribe_events(&self) -> Result<Subscription<SlotState<EventsFeed>>, ActorError> {
        self.request(|respond_to| CoordinatorRequest::SubscribeEvents { respond_to })
            .await
    }

    /// Returns whether the subscription was still registered.
    pub async fn unsubscribe(&self, resource: ResourceKind, id: SubscriberId) -> Result<bool, ActorError> {
        self.request(|respond_to| CoordinatorRequest::Unsubscribe {
            resource,
            id,
            respond_to,
        })
        .await
    }
}
