use crate::chat::{ChatClient, ConversationActor};
use crate::config::CosmosConfig;
use crate::coordinator::{CoordinatorClient, CoordinatorContext, LoadCoordinator};
use crate::error::ConfigError;
use crate::preload::ImagePreloader;
use crate::transport::{ChatTransport, DataTransport, ImageTransport};
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

/// The collaborators a [`SpaceSystem`] is wired to.
#[derive(Clone)]
pub struct Transports {
    pub data: Arc<dyn DataTransport>,
    pub images: Arc<dyn ImageTransport>,
    pub chat: Arc<dyn ChatTransport>,
}

/// Runtime orchestrator: starts the coordinator and conversation actors and stops them.
///
/// # Example
///
/// ```ignore
/// let system = SpaceSystem::new(CosmosConfig::from_env(), transports)?;
///
/// system.coordinator.load_picture().await?;
/// let turn = system.chat.send("What is a nebula?").await?;
///
/// system.shutdown().await?;
/// ```
pub struct SpaceSystem {
    /// Client for the load coordinator actor
    pub coordinator: CoordinatorClient,

    /// Client for the conversation actor
    pub chat: ChatClient,

    /// Task handles for the running actors (used for graceful shutdown)
    handles: Vec<JoinHandle<()>>,
}

impl SpaceSystem {
    /// Validates `config`, creates both actors and spawns them with their collaborators.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: CosmosConfig, transports: Transports) -> Result<Self, ConfigError> {
        config.validate()?;

        let (coordinator_actor, coordinator) = LoadCoordinator::new(config.channel_capacity);
        let (conversation_actor, chat) =
            ConversationActor::new(config.channel_capacity, config.reveal_interval);

        let context = CoordinatorContext {
            data: transports.data,
            preloader: ImagePreloader::new(transports.images),
        };
        let coordinator_handle = tokio::spawn(coordinator_actor.run(context));
        let conversation_handle = tokio::spawn(conversation_actor.run(transports.chat));

        info!(?config, "System started");
        Ok(Self {
            coordinator,
            chat,
            handles: vec![coordinator_handle, conversation_handle],
        })
    }

    /// Drops the clients held here and waits for both actors to finish.
    ///
    /// Actors only stop once *every* clone of their client is gone, so callers must drop
    /// the clones they handed out before awaiting this.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        info!("Shutting down system...");
        drop(self.coordinator);
        drop(self.chat);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Actor task failed");
                return Err(e);
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
