//! Command channel in front of the session
//!
//! Gesture handlers and buttons may live on another thread. They post
//! [`SessionCommand`]s into a bounded channel; a driver task owns the
//! receiving end and applies them to the session. Fetches and decisions
//! are spawned so a newer command can supersede one still in flight.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tunedeck_discovery_client::{Decision, Filters, Track};

use crate::error::SessionError;
use crate::session::RecommendationSession;

/// Commands accepted by the session driver
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Fetch(Filters),
    Undo,
    Decide { track: Track, decision: Decision },
}

/// Spawn a driver task for `session`
///
/// Returns the command sender, a token that stops the driver and shuts the
/// session down when cancelled, and the task handle.
pub fn spawn_session_driver(
    session: RecommendationSession,
    buffer: usize,
) -> (
    mpsc::Sender<SessionCommand>,
    CancellationToken,
    JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::channel::<SessionCommand>(buffer.max(1));
    let cancellation_token = CancellationToken::new();

    let task_token = cancellation_token.clone();
    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = task_token.cancelled() => {
                    info!("Session driver cancelled");
                    break;
                }
                command = rx.recv() => {
                    match command {
                        Some(command) => apply(&session, command),
                        None => {
                            info!("Session command channel closed");
                            break;
                        }
                    }
                }
            }
        }
        session.shutdown();
    });

    (tx, cancellation_token, handle)
}

fn apply(session: &RecommendationSession, command: SessionCommand) {
    match command {
        SessionCommand::Fetch(filters) => {
            let session = session.clone();
            tokio::spawn(async move { report(session.fetch(filters).await) });
        }
        SessionCommand::Undo => {
            if !session.undo() {
                debug!("Nothing to undo");
            }
        }
        SessionCommand::Decide { track, decision } => {
            let session = session.clone();
            tokio::spawn(async move { report(session.decide(track, decision).await) });
        }
    }
}

/// Outcomes are already reflected in session state; only trace them here
fn report(result: Result<Track, SessionError>) {
    match result {
        Ok(track) => debug!(track_id = %track.id, "Driver fetch completed"),
        Err(SessionError::Cancelled) => debug!("Driver fetch superseded"),
        Err(e) => debug!(error = %e, "Driver fetch failed"),
    }
}
