//! Receiving entity (B).
//!
//! [`Receiver`] validates inbound data packets, hands their payloads to the
//! application in sequence order, and answers every packet with an ACK.
//!
//! - Intact data inside the receive window `[rcv_base, rcv_base + N)` is
//!   buffered (once) and acknowledged with [`ACK_VALID`].  The contiguous
//!   prefix starting at `rcv_base` is then delivered and the window slides.
//! - Intact data in `[rcv_base - N, rcv_base)` was delivered before; its ACK
//!   must have been lost, so it is acknowledged again but never re-delivered.
//! - Anything else (checksum failure, an ACK, a sequence number outside both
//!   ranges) triggers a resend of the last ACK, tagged [`ACK_RESEND`].
//!
//! With a sequence space of at least `2N` the two ranges never overlap.

use std::collections::VecDeque;

use crate::checksum::is_corrupted;
use crate::config::{ConfigError, ProtocolConfig};
use crate::host::{Host, Side};
use crate::packet::{Packet, Payload, ACK_RESEND, ACK_VALID, NOT_IN_USE};

/// Counters kept by the receiver for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    /// Data packets accepted for the first time.
    pub packets_received: u64,
    /// Intact data packets that had already been accepted.
    pub duplicates: u64,
    /// Packets answered with a resent ACK (damaged or unrecognised).
    pub rejected: u64,
}

/// Where an intact data packet falls relative to the receive window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Offset into the receive window.
    InWindow(usize),
    /// Already delivered.
    Behind,
    Outside,
}

/// Receive-side protocol state.
#[derive(Debug)]
pub struct Receiver {
    /// Lowest sequence number not yet delivered.
    rcv_base: i32,
    window_size: usize,
    seq_space: i32,
    /// Buffered payloads for `[rcv_base, rcv_base + window_size)`.
    slots: VecDeque<Option<Payload>>,
    /// Sequence number carried by the most recent [`ACK_VALID`] reply.
    last_ack_sent: Option<i32>,
    stats: ReceiverStats,
}

impl Receiver {
    /// Fails if `config` does not pass [`ProtocolConfig::validate`].
    pub fn new(config: &ProtocolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            rcv_base: 0,
            window_size: config.window_size,
            seq_space: config.seq_space,
            slots: std::iter::repeat(None).take(config.window_size).collect(),
            last_ack_sent: None,
            stats: ReceiverStats::default(),
        })
    }

    /// Next sequence number expected in order.
    pub fn rcv_base(&self) -> i32 {
        self.rcv_base
    }

    pub fn last_ack_sent(&self) -> Option<i32> {
        self.last_ack_sent
    }

    pub fn stats(&self) -> &ReceiverStats {
        &self.stats
    }

    /// Number of payloads buffered ahead of a gap.
    pub fn buffered(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Handle a packet from the network.
    pub fn on_input<H: Host>(&mut self, packet: Packet, host: &mut H) {
        if is_corrupted(&packet) || !packet.is_data() {
            log::debug!("[B] ← damaged or unexpected packet, resending last ACK");
            self.resend_last_ack(host);
            return;
        }

        match self.place(packet.seq) {
            Placement::InWindow(offset) => {
                let slot = &mut self.slots[offset];
                if slot.is_none() {
                    *slot = Some(packet.payload);
                    self.stats.packets_received += 1;
                    log::debug!("[B] ← DATA seq={} accepted", packet.seq);
                } else {
                    self.stats.duplicates += 1;
                    log::debug!("[B] ← DATA seq={} already buffered", packet.seq);
                }
                self.send_ack(packet.seq, host);
                self.deliver_in_order(host);
            }
            Placement::Behind => {
                self.stats.duplicates += 1;
                log::debug!("[B] ← DATA seq={} already delivered, re-ACK", packet.seq);
                self.send_ack(packet.seq, host);
            }
            Placement::Outside => {
                log::debug!(
                    "[B] ← DATA seq={} outside window (base {})",
                    packet.seq,
                    self.rcv_base
                );
                self.resend_last_ack(host);
            }
        }
    }

    fn place(&self, seq: i32) -> Placement {
        if !(0..self.seq_space).contains(&seq) {
            return Placement::Outside;
        }
        let ahead = (seq - self.rcv_base).rem_euclid(self.seq_space) as usize;
        if ahead < self.window_size {
            return Placement::InWindow(ahead);
        }
        let behind = (self.rcv_base - seq).rem_euclid(self.seq_space) as usize;
        if (1..=self.window_size).contains(&behind) {
            Placement::Behind
        } else {
            Placement::Outside
        }
    }

    fn deliver_in_order<H: Host>(&mut self, host: &mut H) {
        while let Some(Some(payload)) = self.slots.front().copied() {
            self.slots.pop_front();
            self.slots.push_back(None);
            host.deliver(Side::B, &payload);
            log::trace!("[B] delivered seq={}", self.rcv_base);
            self.rcv_base = (self.rcv_base + 1) % self.seq_space;
        }
    }

    fn send_ack<H: Host>(&mut self, seq: i32, host: &mut H) {
        host.transmit(Side::B, Packet::ack(ACK_VALID, seq));
        self.last_ack_sent = Some(seq);
        log::debug!("[B] → ACK {seq}");
    }

    fn resend_last_ack<H: Host>(&mut self, host: &mut H) {
        self.stats.rejected += 1;
        let ack = self.last_ack_sent.unwrap_or(NOT_IN_USE);
        host.transmit(Side::B, Packet::ack(ACK_RESEND, ack));
        log::debug!("[B] → resent ACK {ack}");
    }
}
