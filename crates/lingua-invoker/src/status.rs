//! The status line: one current human-readable message, last write wins.
//!
//! Operations that may overlap (two rapid "Translate" clicks) take a
//! [`Ticket`] first. Writes through a ticket only land while it is the
//! newest ticket issued, so a slow earlier operation cannot overwrite the
//! status of a later one.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

pub const STATUS_READY: &str = "Ready";

/// Monotonic request id handed out by [`StatusLine::ticket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

pub struct StatusLine {
    tx: watch::Sender<String>,
    latest: AtomicU64,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::with_initial(STATUS_READY)
    }

    pub fn with_initial(initial: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(initial.into());
        Self {
            tx,
            latest: AtomicU64::new(0),
        }
    }

    /// Overwrite the status unconditionally.
    pub fn set(&self, message: impl Into<String>) {
        let message = message.into();
        debug!(status = %message, "status");
        self.tx.send_replace(message);
    }

    /// Issue a ticket; it supersedes every earlier one.
    pub fn ticket(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Overwrite the status if `ticket` is still the newest. Returns
    /// whether the write landed.
    pub fn set_for(&self, ticket: Ticket, message: impl Into<String>) -> bool {
        let message = message.into();
        let landed = self.tx.send_if_modified(|current| {
            if self.is_current(ticket) {
                *current = message.clone();
                true
            } else {
                false
            }
        });
        if landed {
            debug!(status = %message, ticket = ticket.0, "status");
        } else {
            debug!(status = %message, ticket = ticket.0, "dropping status from superseded request");
        }
        landed
    }

    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }

    /// Watch for status changes (e.g. to render them).
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let status = StatusLine::new();
        assert_eq!(status.current(), "Ready");
        status.set("Detecting language...");
        status.set("Translation complete");
        assert_eq!(status.current(), "Translation complete");
    }

    #[test]
    fn stale_ticket_cannot_overwrite() {
        let status = StatusLine::new();
        let first = status.ticket();
        let second = status.ticket();
        assert!(second > first);

        assert!(status.set_for(second, "Translation complete"));
        assert!(!status.set_for(first, "Translation failed"));
        assert_eq!(status.current(), "Translation complete");
        assert!(status.is_current(second));
        assert!(!status.is_current(first));
    }

    #[tokio::test]
    async fn subscribers_see_latest_value() {
        let status = StatusLine::new();
        let mut rx = status.subscribe();
        status.set("Listening...");
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "Listening...");
    }
}
