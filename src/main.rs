//! Demo runner: wires scripted transports into a [`SpaceSystem`], loads every resource and
//! walks one chat turn through a failure and a retry.

use cosmos_core::config::CosmosConfig;
use cosmos_core::error::LoadError;
use cosmos_core::lifecycle::{setup_tracing, SpaceSystem, Transports};
use cosmos_core::mock::{ScriptedChat, ScriptedData, ScriptedImages};
use cosmos_core::model::{EventsFeed, MediaKind, PictureResource, ResponseState};
use cosmos_core::slot::SlotState;
use std::sync::Arc;
use tracing::{error, info, Instrument};

const PICTURE_URL: &str = "https://apod.example.org/image/pillars.png";
const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let data = ScriptedData::new();
    let images = ScriptedImages::new();
    let chat = ScriptedChat::new();

    data.expect_picture().return_ok(PictureResource::new(
        "Pillars of Creation",
        MediaKind::Image,
        Some(PICTURE_URL.to_string()),
    ));
    data.expect_events().return_ok(EventsFeed::from_json(
        r#"[{"title": "Perseids peak", "date": "2024-08-12"}]"#,
    )?);
    images.expect_fetch(PICTURE_URL).return_ok(PNG_HEADER.to_vec());
    chat.expect_send()
        .return_err(LoadError::Network("timeout".into()));
    chat.expect_send()
        .return_ok("The pillars are columns of cold gas and dust.".into());

    let system = SpaceSystem::new(
        CosmosConfig::from_env(),
        Transports {
            data: Arc::new(data.clone()),
            images: Arc::new(images.clone()),
            chat: Arc::new(chat.clone()),
        },
    )?;

    let span = tracing::info_span!("resources");
    async {
        let mut image = system.coordinator.subscribe_image().await?;
        system.coordinator.load_picture().await?;
        system.coordinator.load_events().await?;
        while let Some(state) = image.next().await {
            match state {
                SlotState::Ready(blob) => {
                    info!(?blob, "Image ready");
                    break;
                }
                SlotState::Failed(e) => {
                    error!(error = %e, "Image failed");
                    break;
                }
                _ => {}
            }
        }
        let snapshot = system.coordinator.snapshot().await?;
        info!(
            picture = ?snapshot.picture.value().map(|p| &p.title),
            events = ?snapshot.events.value().map(EventsFeed::len),
            "Resources loaded"
        );
        Ok::<_, Box<dyn std::error::Error>>(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("chat");
    async {
        let mut turns = system.chat.subscribe().await?;
        let id = system.chat.send("What are the Pillars of Creation?").await?;
        while let Some(turn) = turns.next().await {
            if turn.id != id {
                continue;
            }
            match turn.response_state {
                ResponseState::Failed => {
                    info!(detail = ?turn.error_detail, "Turn failed, retrying");
                    system.chat.retry(id).await?;
                }
                ResponseState::Revealing => info!(text = turn.revealed_text(), "Revealing"),
                ResponseState::Displayed => {
                    info!(text = turn.revealed_text(), "Displayed");
                    break;
                }
                _ => {}
            }
        }
        Ok::<_, Box<dyn std::error::Error>>(())
    }
    .instrument(span)
    .await?;

    system.shutdown().await?;
    data.verify();
    images.verify();
    chat.verify();

    info!("Demo completed successfully");
    Ok(())
}
