//! Send-side sliding window.
//!
//! [`SendWindow`] buffers every packet that has been transmitted but not yet
//! retired, in send order, together with an acknowledgement flag.
//!
//! # Window contract
//!
//! - At most `capacity` entries are held at once; [`SendWindow::admit`]
//!   refuses anything beyond that.
//! - Any entry may be marked acknowledged individually.
//! - Only a contiguous acknowledged prefix is ever retired
//!   ([`SendWindow::compact`]), so an unacknowledged head blocks retirement of
//!   later, already-acknowledged entries.
//! - Entries occupy consecutive sequence numbers modulo the sequence space.
//!   With a sequence space of at least twice the capacity, a sequence number
//!   identifies at most one entry.
//!
//! This module only manages state; transmission and timers are the caller's
//! responsibility.

use std::collections::VecDeque;

use crate::packet::{Packet, Payload};

// ---------------------------------------------------------------------------
// WindowEntry
// ---------------------------------------------------------------------------

/// A transmitted packet occupying one slot of the send window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEntry {
    /// The packet exactly as first transmitted; retransmissions reuse it.
    pub packet: Packet,
    /// Set once a valid ACK for this sequence number has arrived.
    pub acked: bool,
}

// ---------------------------------------------------------------------------
// SendWindow
// ---------------------------------------------------------------------------

/// Bounded, ordered buffer of outstanding packets.
///
/// ```text
///   head (oldest)                         tail (newest)
///      │                                      │
///   ┌──▼──┬─────┬─────┬─────┐            ┌────▼┐
///   │ 0 ✗ │ 1 ✓ │ 2 ✗ │ 3 ✓ │   ...      │ n ✗ │
///   └─────┴─────┴─────┴─────┘            └─────┘
///    compact() retires nothing until 0 is ✓
/// ```
#[derive(Debug)]
pub struct SendWindow {
    capacity: usize,
    entries: VecDeque<WindowEntry>,
}

impl SendWindow {
    /// Create an empty window holding at most `capacity` packets.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "window capacity must be at least 1");
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of buffered entries, acknowledged or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` when at least one more packet can be admitted.
    pub fn has_room(&self) -> bool {
        self.entries.len() < self.capacity
    }

    /// Buffer `packet` as a new unacknowledged entry.
    ///
    /// Returns `false` and leaves the window untouched when it is full.
    pub fn admit(&mut self, packet: Packet) -> bool {
        if !self.has_room() {
            return false;
        }
        self.entries.push_back(WindowEntry {
            packet,
            acked: false,
        });
        debug_assert!(self.entries.len() <= self.capacity);
        true
    }

    /// Index of the entry carrying sequence number `seq`, if buffered.
    pub fn locate(&self, seq: i32) -> Option<usize> {
        self.entries.iter().position(|e| e.packet.seq == seq)
    }

    /// Entry carrying sequence number `seq`, if buffered.
    pub fn get(&self, seq: i32) -> Option<&WindowEntry> {
        self.locate(seq).map(|i| &self.entries[i])
    }

    /// `true` when `seq` is buffered and still waiting for its ACK.
    pub fn is_unacked(&self, seq: i32) -> bool {
        self.get(seq).is_some_and(|e| !e.acked)
    }

    /// Mark the entry for `seq` acknowledged.
    ///
    /// Returns the entry's payload when this call changed its state; `None`
    /// for an unknown sequence number or an entry that was already acked.
    pub fn mark_acked(&mut self, seq: i32) -> Option<Payload> {
        let index = self.locate(seq)?;
        let entry = &mut self.entries[index];
        if entry.acked {
            return None;
        }
        entry.acked = true;
        Some(entry.packet.payload)
    }

    /// Retire the contiguous acknowledged prefix of the window.
    ///
    /// Returns the number of entries removed.
    pub fn compact(&mut self) -> usize {
        let mut retired = 0;
        while self.entries.front().is_some_and(|e| e.acked) {
            self.entries.pop_front();
            retired += 1;
        }
        retired
    }

    /// Sequence number of the oldest buffered entry.
    pub fn head_seq(&self) -> Option<i32> {
        self.entries.front().map(|e| e.packet.seq)
    }

    /// Iterate over buffered entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &WindowEntry> {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
