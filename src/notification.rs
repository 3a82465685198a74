//! Transient, dismissible notifications.
//!
//! One notification is visible at a time. Each one clears itself after the
//! configured interval unless dismissed or replaced first.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

#[derive(Debug, Default)]
struct NotifierState {
    current: Option<Notification>,
    /// Bumped on every show/dismiss so stale timers leave newer notices alone.
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    state: Arc<Mutex<NotifierState>>,
    dismiss_after: Duration,
}

impl Notifier {
    /// Must be used from within a tokio runtime.
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(NotifierState::default())),
            dismiss_after,
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(NotificationKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(NotificationKind::Error, message.into());
    }

    pub fn current(&self) -> Option<Notification> {
        self.state.lock().current.clone()
    }

    pub fn dismiss(&self) {
        let mut state = self.state.lock();
        state.current = None;
        state.generation += 1;
    }

    fn show(&self, kind: NotificationKind, message: String) {
        let generation = {
            let mut state = self.state.lock();
            state.generation += 1;
            state.current = Some(Notification { kind, message });
            state.generation
        };

        let state = Arc::clone(&self.state);
        let dismiss_after = self.dismiss_after;
        tokio::spawn(async move {
            tokio::time::sleep(dismiss_after).await;
            let mut state = state.lock();
            if state.generation == generation {
                state.current = None;
            }
        });
    }
}
