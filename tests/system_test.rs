use cosmos_core::config::CosmosConfig;
use cosmos_core::error::{ConfigError, LoadError};
use cosmos_core::lifecycle::{SpaceSystem, Transports};
use cosmos_core::mock::{ScriptedChat, ScriptedData, ScriptedImages};
use cosmos_core::model::{MediaKind, PictureResource, ResponseState};
use std::sync::Arc;
use std::time::Duration;

fn transports(data: &ScriptedData, images: &ScriptedImages, chat: &ScriptedChat) -> Transports {
    Transports {
        data: Arc::new(data.clone()),
        images: Arc::new(images.clone()),
        chat: Arc::new(chat.clone()),
    }
}

#[tokio::test]
async fn rejects_invalid_config() {
    let config = CosmosConfig::default().with_reveal_interval(Duration::ZERO);
    let result = SpaceSystem::new(
        config,
        transports(&ScriptedData::new(), &ScriptedImages::new(), &ScriptedChat::new()),
    );
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[tokio::test(start_paused = true)]
async fn resources_and_chat_run_side_by_side() {
    let data = ScriptedData::new();
    let images = ScriptedImages::new();
    let chat = ScriptedChat::new();
    data.expect_picture()
        .return_ok(PictureResource::new("Comet", MediaKind::Video, None));
    chat.expect_send()
        .return_err(LoadError::Network("timeout".into()));
    chat.expect_send().return_ok("A dirty snowball".into());

    let system = SpaceSystem::new(
        CosmosConfig::default(),
        transports(&data, &images, &chat),
    )
    .unwrap();

    let mut picture = system.coordinator.subscribe_picture().await.unwrap();
    let mut turns = system.chat.subscribe().await.unwrap();
    system.coordinator.load_picture().await.unwrap();
    let id = system.chat.send("What is a comet?").await.unwrap();

    while let Some(state) = picture.next().await {
        if state.is_settled() {
            assert_eq!(state.value().unwrap().title, "Comet");
            break;
        }
    }

    while let Some(turn) = turns.next().await {
        match turn.response_state {
            ResponseState::Failed => {
                assert_eq!(turn.error_detail.as_deref(), Some("timeout"));
                system.chat.retry(id).await.unwrap();
            }
            ResponseState::Displayed => {
                assert_eq!(turn.revealed_text(), "A dirty snowball");
                break;
            }
            _ => {}
        }
    }

    system.shutdown().await.unwrap();
    data.verify();
    chat.verify();
}

#[tokio::test]
async fn shutdown_waits_for_outstanding_clients() {
    let system = SpaceSystem::new(
        CosmosConfig::default(),
        transports(&ScriptedData::new(), &ScriptedImages::new(), &ScriptedChat::new()),
    )
    .unwrap();
    let coordinator = system.coordinator.clone();
    let chat = system.chat.clone();

    // Dropping the outstanding clones lets the actors stop.
    let stop = tokio::spawn(system.shutdown());
    drop(coordinator);
    drop(chat);
    stop.await.unwrap().unwrap();
}
