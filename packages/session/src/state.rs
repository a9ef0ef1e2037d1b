//! Session state and its transitions
//!
//! Everything here is synchronous; the session applies these transitions
//! while holding its lock and never across an await.

use std::collections::VecDeque;

use tokio_util::sync::CancellationToken;
use tunedeck_discovery_client::{Filters, Track};

/// Load status of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// Read-only view of the session handed to observers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub current: Option<Track>,
    pub history_len: usize,
    pub can_undo: bool,
    pub position: u64,
    pub status: LoadStatus,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub(crate) current: Option<Track>,
    pub(crate) history: VecDeque<Track>,
    pub(crate) status: LoadStatus,
    pub(crate) error: Option<String>,
    pub(crate) position: u64,
    /// `current` came back from history and must not be pushed again
    pub(crate) restored: bool,
    /// Filters of the most recent fetch, reused by decisions
    pub(crate) filters: Filters,
    /// Bumped on every fetch; a result only applies if its generation is current
    pub(crate) generation: u64,
    pub(crate) in_flight: Option<CancellationToken>,
}

impl SessionState {
    /// Start a new request generation, cancelling whatever was in flight
    pub(crate) fn begin_fetch(&mut self, filters: Filters, cancel: CancellationToken) -> u64 {
        if let Some(previous) = self.in_flight.replace(cancel) {
            previous.cancel();
        }
        self.generation += 1;
        self.filters = filters;
        self.status = LoadStatus::Loading;
        self.error = None;
        self.generation
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    fn finish_fetch(&mut self) {
        self.in_flight = None;
    }

    pub(crate) fn apply_track(&mut self, track: Track, history_limit: Option<usize>) {
        self.finish_fetch();
        if let Some(previous) = self.current.take() {
            if !self.restored {
                self.history.push_back(previous);
            }
        }
        if let Some(limit) = history_limit {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
        self.current = Some(track);
        self.restored = false;
        self.position += 1;
        self.status = LoadStatus::Ready;
        self.error = None;
    }

    pub(crate) fn apply_error(&mut self, message: String) {
        self.finish_fetch();
        self.status = LoadStatus::Error;
        self.error = Some(message);
    }

    /// Promote the newest history entry to `current`, discarding the old `current`
    pub(crate) fn undo(&mut self) -> bool {
        match self.history.pop_back() {
            Some(previous) => {
                self.current = Some(previous);
                self.restored = true;
                true
            }
            None => false,
        }
    }

    pub(crate) fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current: self.current.clone(),
            history_len: self.history.len(),
            can_undo: self.can_undo(),
            position: self.position,
            status: self.status,
            error: self.error.clone(),
        }
    }
}
