use crate::model::{EventsFeed, ImageBlob, PictureResource};
use crate::slot::{SlotState, SubscriberId, Subscription};
use std::fmt::{self, Display};
use tokio::sync::oneshot;

/// Type alias for the one-shot reply channel used by the coordinator.
pub type Response<T> = oneshot::Sender<T>;

/// The slots a coordinator owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Picture,
    Image,
    Events,
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Picture => "picture",
            ResourceKind::Image => "image",
            ResourceKind::Events => "events",
        })
    }
}

/// What a load request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A fetch was issued.
    Started,
    /// A fetch for this resource was already running; no second one was issued.
    InFlight,
    /// The resource is already `Ready`; use `refresh_all` to fetch again.
    AlreadyLoaded,
}

/// All slot states at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorSnapshot {
    pub picture: SlotState<PictureResource>,
    pub image: SlotState<ImageBlob>,
    pub events: SlotState<EventsFeed>,
}

/// Requests accepted by the [`LoadCoordinator`](super::LoadCoordinator).
#[derive(Debug)]
pub enum CoordinatorRequest {
    LoadPicture {
        respond_to: Response<LoadOutcome>,
    },
    LoadEvents {
        respond_to: Response<LoadOutcome>,
    },
    RefreshAll {
        respond_to: Response<()>,
    },
    Snapshot {
        respond_to: Response<CoordinatorSnapshot>,
    },
    SubscribePicture {
        respond_to: Response<Subscription<SlotState<PictureResource>>>,
    },
    SubscribeImage {
        respond_to: Response<Subscription<SlotState<ImageBlob>>>,
    },
    SubscribeEvents {
        respond_to: Response<Subscription<SlotState<EventsFeed>>>,
    },
    Unsubscribe {
        resource: ResourceKind,
        id: SubscriberId,
        respond_to: Response<bool>,
    },
}
