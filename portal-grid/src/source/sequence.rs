//! Request sequencing for overlapping fetches.
//!
//! Typing quickly or paging fast can leave several fetches in flight. They
//! may resolve out of order, and only the newest one reflects what the grid
//! currently shows. The grid has no notion of request identity, so the caller
//! tags each request with a [`Ticket`] and drops responses whose ticket is no
//! longer current.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Issues tickets and decides which responses are still current.
///
/// Cheap to clone; clones share the same counter so a ticket can travel
/// with a spawned fetch task.
#[derive(Debug, Clone, Default)]
pub struct FetchSequencer {
    latest: Arc<AtomicU64>,
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new request. Every earlier ticket becomes stale.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Invalidate every outstanding ticket without issuing a new request.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Pass `response` through if `ticket` is still current, drop it otherwise.
    pub fn accept<R>(&self, ticket: Ticket, response: R) -> Option<R> {
        if self.is_current(ticket) {
            Some(response)
        } else {
            log::warn!(
                "[fetch] discarding stale response #{} (latest #{})",
                ticket.0,
                self.latest.load(Ordering::SeqCst)
            );
            None
        }
    }
}
