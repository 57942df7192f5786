//! Non-interactive commands: `ask`, `identify`, and `health`.

use std::error::Error;
use std::path::Path;

use crate::core::image::ImageUpload;
use crate::core::message::Payload;
use crate::core::{ChatSession, Exchange, ExchangeStatus, HttpBackend, PlantBackend};
use crate::utils::render::render_identification;

pub async fn run_ask<B: PlantBackend>(
    mut session: ChatSession<B>,
    prompt: Vec<String>,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: lumon ask <question>");
        std::process::exit(1);
    }

    let exchange = session.submit_text(&prompt).await?;
    print_reply(&session, exchange)
}

pub async fn run_identify<B: PlantBackend>(
    mut session: ChatSession<B>,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let image = ImageUpload::from_path(path)
        .await
        .map_err(|err| format!("Could not read {}: {err}", path.display()))?;
    let exchange = session.submit_image(&image).await;
    print_reply(&session, exchange)
}

pub async fn run_health(backend: &HttpBackend) -> Result<(), Box<dyn Error>> {
    match backend.health().await {
        Ok(health) => {
            match health.timestamp {
                Some(timestamp) => println!(
                    "✅ {} is {} (server time {timestamp})",
                    backend.base_url(),
                    health.status
                ),
                None => println!("✅ {} is {}", backend.base_url(), health.status),
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    }
}

/// Print the entry that closed `exchange`; exit non-zero when the exchange
/// did not produce an answer.
fn print_reply<B: PlantBackend>(
    session: &ChatSession<B>,
    exchange: Exchange,
) -> Result<(), Box<dyn Error>> {
    let reply = exchange
        .reply
        .and_then(|id| session.transcript().get(id))
        .ok_or("no reply was recorded")?;

    let text = match reply.payload() {
        Payload::Text(text) => text.clone(),
        Payload::Identification(identification) => render_identification(identification),
        other => return Err(format!("unexpected reply entry: {:?}", other.kind()).into()),
    };

    if exchange.status == ExchangeStatus::Answered {
        println!("{text}");
        Ok(())
    } else {
        eprintln!("{text}");
        std::process::exit(1);
    }
}
