//! Retransmission timer bookkeeping.
//!
//! The network offers each entity a single countdown timer.  The sender keeps
//! one [`RetransmitTimers`] list of sequence numbers that still need
//! protection, in the order they were sent, and points that single timer at
//! the front of the list: when it fires, the oldest unacknowledged packet is
//! retransmitted and the timer restarted.
//!
//! Entries are plain sequence numbers; the packets themselves stay in the
//! [`SendWindow`], which is the source of truth for what is still
//! outstanding.  [`RetransmitTimers::reconcile`] brings the list back in line
//! with the window after ACKs have arrived.

use std::collections::VecDeque;

use crate::packet::Packet;
use crate::window::SendWindow;

/// Ordered set of sequence numbers awaiting retransmission protection.
#[derive(Debug, Default)]
pub struct RetransmitTimers {
    entries: VecDeque<i32>,
}

impl RetransmitTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked sequence numbers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` when `seq` is currently tracked.
    pub fn contains(&self, seq: i32) -> bool {
        self.entries.contains(&seq)
    }

    /// Start tracking `seq` if its window entry is unacknowledged and it is
    /// not tracked already.
    ///
    /// Returns `true` when an entry was added.
    pub fn register(&mut self, seq: i32, window: &SendWindow) -> bool {
        if !window.is_unacked(seq) || self.contains(seq) {
            return false;
        }
        self.entries.push_back(seq);
        true
    }

    /// Drop entries for acknowledged or evicted packets and repeated sequence
    /// numbers, keeping the survivors in their original order.
    ///
    /// Returns the number of entries removed.
    pub fn reconcile(&mut self, window: &SendWindow) -> usize {
        let before = self.entries.len();
        let mut seen = Vec::with_capacity(before);
        self.entries.retain(|&seq| {
            if seen.contains(&seq) || !window.is_unacked(seq) {
                return false;
            }
            seen.push(seq);
            true
        });
        before - self.entries.len()
    }

    /// Packet to retransmit on timer expiry: the one at the front of the list.
    ///
    /// Call [`reconcile`](Self::reconcile) first so the front is the oldest
    /// packet still outstanding.  Returns `None` when nothing is tracked.
    pub fn expire(&self, window: &SendWindow) -> Option<Packet> {
        let seq = *self.entries.front()?;
        window.get(seq).map(|e| e.packet)
    }

    /// Sequence number the timer is currently anchored to.
    pub fn front(&self) -> Option<i32> {
        self.entries.front().copied()
    }
}
