//! Tunedeck terminal driver
//!
//! Reads commands from stdin, feeds them to the recommendation session
//! through its command driver and prints every state change.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tunedeck_discovery_client::{DiscoveryClient, Preferences};
use tunedeck_session::gesture::GestureConfig;
use tunedeck_session::{
    spawn_session_driver, LoadStatus, RecommendationSession, SessionBuilder, SessionCommand,
    SessionSnapshot, SharedCredential,
};

mod commands;
mod config;

use commands::{Command, HELP};
use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tunedeck_cli=debug,tunedeck_session=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        environment = %config.common.environment,
        api_url = %config.common.discovery.api_url,
        "Starting Tunedeck"
    );

    let credential = SharedCredential::new();
    match &config.token {
        Some(token) => credential.set(token.as_str()),
        None => tracing::warn!("DISCOVERY_TOKEN not set, fetches will time out waiting for sign-in"),
    }

    let preferences = Preferences::new();
    preferences.set_active_playlist(config.active_playlist.clone());

    let client = DiscoveryClient::new(&config.common.discovery)
        .context("Failed to create discovery client")?
        .with_preferences(preferences.clone());
    let session = SessionBuilder::with_client(client, Arc::new(credential))
        .config(config.common.session.clone())
        .build();

    let printer = tokio::spawn(print_updates(session.subscribe()));
    let (commands, driver_token, driver) =
        spawn_session_driver(session.clone(), config.common.session.command_buffer);

    println!("{}", HELP);
    send(&commands, SessionCommand::Fetch(config.initial_filters.clone())).await;

    let gestures = config.gesture();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => println!("{}", HELP),
            Command::Status => print_snapshot(&session.snapshot()),
            Command::Next(filters) => {
                let filters = filters.unwrap_or_else(|| config.initial_filters.clone());
                send(&commands, SessionCommand::Fetch(filters)).await;
            }
            Command::Undo => send(&commands, SessionCommand::Undo).await,
            Command::Decide(decision) => {
                if let Some(track) = session.current() {
                    send(&commands, SessionCommand::Decide { track, decision }).await;
                } else {
                    println!("No track to decide on");
                }
            }
            Command::Swipe(gesture) => swipe(&session, &commands, &gestures, gesture).await,
            Command::Playlist(id) => {
                preferences.set_active_playlist(id);
                match preferences.active_playlist_id() {
                    Some(id) => println!("Liked tracks go to playlist {}", id),
                    None => println!("Active playlist cleared"),
                }
            }
            Command::Mute(muted) => {
                preferences.set_muted(muted);
                println!("{}", if muted { "Muted" } else { "Unmuted" });
            }
        }
    }

    tracing::info!("Shutting down");
    driver_token.cancel();
    driver.await.context("Session driver panicked")?;
    printer.abort();

    Ok(())
}

async fn send(commands: &mpsc::Sender<SessionCommand>, command: SessionCommand) {
    if commands.send(command).await.is_err() {
        tracing::error!("Session driver is no longer running");
    }
}

async fn swipe(
    session: &RecommendationSession,
    commands: &mpsc::Sender<SessionCommand>,
    gestures: &GestureConfig,
    gesture: tunedeck_session::gesture::SwipeGesture,
) {
    let Some(track) = session.current() else {
        println!("No track to swipe");
        return;
    };
    match gestures.resolve(&gesture) {
        Some(decision) => {
            println!(
                "{} (rotation {:.1}°)",
                decision,
                gestures.rotation_for(gesture.translation_x)
            );
            send(commands, SessionCommand::Decide { track, decision }).await;
        }
        None => println!("Card springs back"),
    }
}

async fn print_updates(mut updates: watch::Receiver<SessionSnapshot>) {
    while updates.changed().await.is_ok() {
        let snapshot = updates.borrow_and_update().clone();
        print_snapshot(&snapshot);
    }
}

fn print_snapshot(snapshot: &SessionSnapshot) {
    match snapshot.status {
        LoadStatus::Idle => println!("[idle]"),
        LoadStatus::Loading => println!("[loading...]"),
        LoadStatus::Ready => {
            if let Some(track) = &snapshot.current {
                let album = track.album_name().unwrap_or("-");
                println!(
                    "[#{}] {} ({}){}",
                    snapshot.position,
                    track,
                    album,
                    if snapshot.can_undo { "  undo available" } else { "" }
                );
            }
        }
        LoadStatus::Error => println!(
            "[error] {}",
            snapshot.error.as_deref().unwrap_or("Unknown error")
        ),
    }
}
