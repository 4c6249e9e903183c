use super::client::CoordinatorClient;
use super::message::{CoordinatorRequest, CoordinatorSnapshot, LoadOutcome, ResourceKind};
use crate::error::LoadError;
use crate::model::{EventsFeed, ImageBlob, PictureResource};
use crate::preload::ImagePreloader;
use crate::slot::{BeginLoad, RequestToken, ResourceSlot, SlotState};
use crate::transport::{guarded, DataTransport};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Collaborators injected into [`LoadCoordinator::run`].
#[derive(Clone)]
pub struct CoordinatorContext {
    pub data: Arc<dyn DataTransport>,
    pub preloader: ImagePreloader,
}

/// Results travelling back from fetch tasks.
#[derive(Debug)]
enum Completion {
    Picture(RequestToken, Result<PictureResource, LoadError>),
    Image(RequestToken, Result<ImageBlob, LoadError>),
    Events(RequestToken, Result<EventsFeed, LoadError>),
}

/// The coordinator actor.
///
/// It is the only writer of its three slots. Requests and fetch completions are
/// processed one at a time in the order they arrive, so no slot needs a lock.
pub struct LoadCoordinator {
    receiver: mpsc::Receiver<CoordinatorRequest>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    picture: ResourceSlot<PictureResource>,
    image: ResourceSlot<ImageBlob>,
    events: ResourceSlot<EventsFeed>,
}

impl LoadCoordinator {
    /// Creates the actor and its client. `buffer_size` bounds the request channel.
    pub fn new(buffer_size: usize) -> (Self, CoordinatorClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let actor = Self {
            receiver,
            completions_tx,
            completions_rx,
            picture: ResourceSlot::new("picture"),
            image: ResourceSlot::new("image"),
            events: ResourceSlot::new("events"),
        };
        (actor, CoordinatorClient::new(sender))
    }

    /// Runs the event loop until every client has been dropped.
    ///
    /// Fetches still in flight at that point finish on their own; their results go nowhere.
    pub async fn run(mut self, context: CoordinatorContext) {
        info!("Coordinator started");
        loop {
            tokio::select! {
                request = self.receiver.recv() => match request {
                    Some(request) => self.handle_request(request, &context),
                    None => break,
                },
                Some(completion) = self.completions_rx.recv() => {
                    self.handle_completion(completion, &context);
                }
            }
        }
        info!("Coordinator shutdown");
    }

    fn handle_request(&mut self, request: CoordinatorRequest, context: &CoordinatorContext) {
        match request {
            CoordinatorRequest::LoadPicture { respond_to } => {
                let _ = respond_to.send(self.load_picture(context));
            }
            CoordinatorRequest::LoadEvents { respond_to } => {
                let _ = respond_to.send(self.load_events(context));
            }
            CoordinatorRequest::RefreshAll { respond_to } => {
                self.refresh_all(context);
                let _ = respond_to.send(());
            }
            CoordinatorRequest::Snapshot { respond_to } => {
                let _ = respond_to.send(self.snapshot());
            }
            CoordinatorRequest::SubscribePicture { respond_to } => {
                let _ = respond_to.send(self.picture.subscribe());
            }
            CoordinatorRequest::SubscribeImage { respond_to } => {
                let _ = respond_to.send(self.image.subscribe());
            }
            CoordinatorRequest::SubscribeEvents { respond_to } => {
                let _ = respond_to.send(self.events.subscribe());
            }
            CoordinatorRequest::Unsubscribe {
                resource,
                id,
                respond_to,
            } => {
                let removed = match resource {
                    ResourceKind::Picture => self.picture.unsubscribe(id),
                    ResourceKind::Image => self.image.unsubscribe(id),
                    ResourceKind::Events => self.events.unsubscribe(id),
                };
                debug!(%resource, ?id, removed, "Unsubscribe");
                let _ = respond_to.send(removed);
            }
        }
    }

    fn load_picture(&mut self, context: &CoordinatorContext) -> LoadOutcome {
        let token = match admit(&mut self.picture) {
            Ok(token) => token,
            Err(outcome) => return outcome,
        };
        let data = context.data.clone();
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = guarded("picture fetch", async move { data.fetch_picture().await }).await;
            let _ = completions.send(Completion::Picture(token, result));
        });
        LoadOutcome::Started
    }

    fn load_events(&mut self, context: &CoordinatorContext) -> LoadOutcome {
        let token = match admit(&mut self.events) {
            Ok(token) => token,
            Err(outcome) => return outcome,
        };
        let data = context.data.clone();
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = guarded("events fetch", async move { data.fetch_events().await }).await;
            let _ = completions.send(Completion::Events(token, result));
        });
        LoadOutcome::Started
    }

    fn refresh_all(&mut self, context: &CoordinatorContext) {
        info!("Refreshing all resources");
        self.picture.reset();
        self.image.reset();
        self.events.reset();
        self.load_picture(context);
        self.load_events(context);
    }

    fn handle_completion(&mut self, completion: Completion, context: &CoordinatorContext) {
        match completion {
            Completion::Picture(token, Ok(picture)) => {
                let image_url = picture.image_url().map(str::to_string);
                if !self.picture.complete(token, Ok(picture)) {
                    return;
                }
                // The image slot always follows the latest picture.
                self.image.reset();
                match image_url {
                    Some(url) => {
                        let completions = self.completions_tx.clone();
                        context.preloader.preload_into(&mut self.image, &url, move |token, result| {
                            let _ = completions.send(Completion::Image(token, result));
                        });
                    }
                    None => debug!("Picture has no image to preload"),
                }
            }
            Completion::Picture(token, Err(e)) => {
                self.picture.complete(token, Err(e));
            }
            Completion::Image(token, result) => {
                self.image.complete(token, result);
            }
            Completion::Events(token, result) => {
                self.events.complete(token, result);
            }
        }
    }

    fn snapshot(&self) -> CoordinatorSnapshot {
        CoordinatorSnapshot {
            picture: self.picture.snapshot(),
            image: self.image.snapshot(),
            events: self.events.snapshot(),
        }
    }
}

/// Decides whether a load request should issue a fetch.
///
/// Only `Idle` and `Failed` slots start one; a `Loading` slot is joined and a `Ready`
/// slot is left alone.
fn admit<T: Clone>(slot: &mut ResourceSlot<T>) -> Result<RequestToken, LoadOutcome> {
    if let SlotState::Ready(_) = slot.state() {
        debug!(resource = slot.name(), "Already loaded");
        return Err(LoadOutcome::AlreadyLoaded);
    }
    match slot.begin_load() {
        BeginLoad::Started(token) => Ok(token),
        BeginLoad::InFlight(_) => Err(LoadOutcome::InFlight),
    }
}
