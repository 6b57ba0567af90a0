//! Notice bus using tokio broadcast channel
//!
//! Emission never blocks the workflow. Slow subscribers miss notices rather
//! than holding up a capture, so a subscriber is a view of progress only: the
//! `Result` returned by each workflow call is the authoritative outcome.

use tokio::sync::broadcast;

use crate::events::Notice;

/// Default channel capacity
pub const DEFAULT_CAPACITY: usize = 256;

/// Smallest capacity a bus is built with. One full capture session
/// (milestones, a failure and a run of progress ratios) fits below it.
pub const MIN_CAPACITY: usize = 16;

/// Broadcast bus for presentation notices
///
/// If nobody is subscribed, notices are dropped.
#[derive(Clone)]
pub struct NoticeBus {
    sender: broadcast::Sender<Notice>,
}

impl NoticeBus {
    /// Create a new bus with default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new bus with custom capacity, raised to [`MIN_CAPACITY`]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(MIN_CAPACITY));
        Self { sender }
    }

    /// Subscribe to notices emitted from now on
    pub fn subscribe(&self) -> NoticeSubscriber {
        NoticeSubscriber {
            receiver: self.sender.subscribe(),
            missed: 0,
        }
    }

    /// Emit a notice to all subscribers
    pub fn emit(&self, notice: Notice) {
        // No subscribers is not an error
        let _ = self.sender.send(notice);
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscriber to a notice bus
///
/// A subscriber that falls more than the bus capacity behind skips the oldest
/// notices; [`missed`](Self::missed) counts them.
pub struct NoticeSubscriber {
    receiver: broadcast::Receiver<Notice>,
    missed: u64,
}

impl NoticeSubscriber {
    /// Receive the next notice
    ///
    /// Returns None once the bus is dropped.
    pub async fn recv(&mut self) -> Option<Notice> {
        loop {
            match self.receiver.recv().await {
                Ok(notice) => return Some(notice),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Notice subscriber lagged by {} notices", n);
                    self.missed += n;
                    continue;
                }
            }
        }
    }

    /// Try to receive a notice without blocking
    pub fn try_recv(&mut self) -> Option<Notice> {
        loop {
            match self.receiver.try_recv() {
                Ok(notice) => return Some(notice),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!("Notice subscriber lagged by {} notices", n);
                    self.missed += n;
                    continue;
                }
                Err(_) => return None,
            }
        }
    }

    /// Notices skipped because this subscriber fell behind
    pub fn missed(&self) -> u64 {
        self.missed
    }

    /// Take every notice currently buffered
    pub fn drain(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Some(notice) = self.try_recv() {
            notices.push(notice);
        }
        notices
    }
}
