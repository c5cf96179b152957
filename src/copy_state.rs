// Copyright (c) 2024 PostFinance AG
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;
use tokio::time::Instant;

use crate::clipboard::{Clipboard, ClipboardError};

/// How long a password stays marked as copied.
pub(crate) const COPIED_RESET_DELAY: Duration = Duration::from_millis(2000);

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum CopyEvent {
    Reverted(String),
}

struct Marker {
    generation: u64,
    timer: AbortHandle,
}

#[derive(Default)]
struct CopyState {
    markers: HashMap<String, Marker>,
    next_generation: u64,
}

/// Tracks which passwords were just copied, keyed by value.
///
/// Must be used from within a tokio runtime: every copy spawns its reset timer.
pub(crate) struct CopyTracker {
    state: Arc<Mutex<CopyState>>,
    events: UnboundedSender<CopyEvent>,
    reset_delay: Duration,
}

impl CopyTracker {
    pub(crate) fn new(reset_delay: Duration) -> (CopyTracker, UnboundedReceiver<CopyEvent>) {
        let (events, rx) = unbounded_channel();
        let tracker = CopyTracker {
            state: Arc::new(Mutex::new(CopyState::default())),
            events,
            reset_delay,
        };
        (tracker, rx)
    }

    /// Writes `password` to the clipboard and marks it as copied.
    ///
    /// A failed write leaves the marker untouched. Copying a marked password again
    /// cancels its pending reset and starts a fresh one.
    pub(crate) fn copy(
        &self,
        clipboard: &mut dyn Clipboard,
        password: &str,
    ) -> Result<(), ClipboardError> {
        clipboard.write_text(password)?;
        self.mark(password);
        Ok(())
    }

    pub(crate) fn is_copied(&self, password: &str) -> bool {
        lock(&self.state).markers.contains_key(password)
    }

    /// Clears every marker and cancels all pending resets.
    pub(crate) fn reset(&self) {
        let mut state = lock(&self.state);
        for (_, marker) in state.markers.drain() {
            marker.timer.abort();
        }
    }

    fn mark(&self, password: &str) {
        let mut state = lock(&self.state);
        state.next_generation += 1;
        let generation = state.next_generation;

        let timer = tokio::spawn(revert_at(
            Arc::downgrade(&self.state),
            self.events.clone(),
            password.to_owned(),
            generation,
            Instant::now() + self.reset_delay,
        ))
        .abort_handle();

        let previous = state
            .markers
            .insert(password.to_owned(), Marker { generation, timer });
        if let Some(previous) = previous {
            debug!("Restarting copy reset timer (generation {})", previous.generation);
            previous.timer.abort();
        }
    }
}

impl Drop for CopyTracker {
    fn drop(&mut self) {
        self.reset();
    }
}

async fn revert_at(
    state: Weak<Mutex<CopyState>>,
    events: UnboundedSender<CopyEvent>,
    password: String,
    generation: u64,
    deadline: Instant,
) {
    tokio::time::sleep_until(deadline).await;

    // Tracker already torn down
    let Some(state) = state.upgrade() else {
        return;
    };

    let reverted = {
        let mut state = lock(&state);
        match state.markers.get(&password) {
            Some(marker) if marker.generation == generation => {
                state.markers.remove(&password);
                true
            }
            _ => false,
        }
    };

    if reverted {
        debug!("Copy marker {generation} expired");
        let _ = events.send(CopyEvent::Reverted(password));
    }
}

fn lock(state: &Mutex<CopyState>) -> MutexGuard<'_, CopyState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
