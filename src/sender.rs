//! Sending entity (A).
//!
//! [`Sender`] owns the send window, the retransmission list and the sequence
//! cursor.  It reacts to three events, each handled to completion:
//!
//! - [`Sender::on_output`] — the application hands down a message.
//! - [`Sender::on_input`] — the network delivers an ACK.
//! - [`Sender::on_timer_interrupt`] — the retransmission timer fired.
//!
//! # Contract
//!
//! - At most `window_size` packets are outstanding.  A message arriving at a
//!   full window is dropped and counted; there is no queue.
//! - One timer protects the whole window.  It is armed by the first packet
//!   entering an empty window, restarted on every new ACK while packets
//!   remain, and disarmed when the window drains.
//! - On expiry only the oldest unacknowledged packet is resent.
//! - Corrupted ACKs and ACKs not tagged [`ACK_VALID`] are ignored.

use crate::checksum::is_corrupted;
use crate::config::{ConfigError, ProtocolConfig};
use crate::host::{Host, Side};
use crate::packet::{Message, Packet, ACK_VALID};
use crate::state::SenderState;
use crate::timer::RetransmitTimers;
use crate::window::SendWindow;

// ---------------------------------------------------------------------------
// SenderStats
// ---------------------------------------------------------------------------

/// Counters kept by the sender for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderStats {
    /// First transmissions of data packets.
    pub packets_sent: u64,
    /// Messages dropped because the window was full.
    pub window_full: u64,
    /// Uncorrupted, accepted ACKs (new or duplicate).
    pub acks_received: u64,
    /// ACKs that acknowledged an outstanding packet.
    pub new_acks: u64,
    /// ACKs for packets already acknowledged or retired.
    pub duplicate_acks: u64,
    /// ACKs that failed the checksum.
    pub corrupted_acks: u64,
    /// Intact ACKs dropped by the kind-tag filter.
    pub filtered_acks: u64,
    /// Retransmissions triggered by the timer.
    pub packets_resent: u64,
}

// ---------------------------------------------------------------------------
// Sender
// ---------------------------------------------------------------------------

/// Send-side protocol state.
#[derive(Debug)]
pub struct Sender {
    /// Sequence number for the next admitted message.
    next_seq: i32,
    seq_space: i32,
    rtt: f64,
    window: SendWindow,
    timers: RetransmitTimers,
    /// Whether this entity's timer is currently armed.
    timer_running: bool,
    stats: SenderStats,
}

impl Sender {
    /// Create a sender in the [`SenderState::Idle`] state with `next_seq = 0`.
    ///
    /// Fails if `config` does not pass [`ProtocolConfig::validate`].
    pub fn new(config: &ProtocolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            next_seq: 0,
            seq_space: config.seq_space,
            rtt: config.rtt,
            window: SendWindow::new(config.window_size),
            timers: RetransmitTimers::new(),
            timer_running: false,
            stats: SenderStats::default(),
        })
    }

    pub fn state(&self) -> SenderState {
        SenderState::from_occupancy(self.window.len(), self.window.capacity())
    }

    pub fn next_seq(&self) -> i32 {
        self.next_seq
    }

    pub fn window(&self) -> &SendWindow {
        &self.window
    }

    pub fn timers(&self) -> &RetransmitTimers {
        &self.timers
    }

    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    pub fn stats(&self) -> &SenderStats {
        &self.stats
    }

    /// Handle a message from the application layer.
    ///
    /// Returns `true` if the message was packetised and sent, `false` if the
    /// window was full and the message was dropped.
    pub fn on_output<H: Host>(&mut self, message: Message, host: &mut H) -> bool {
        let seq = self.next_seq;
        let packet = Packet::data(seq, message.data);
        if !self.window.admit(packet) {
            self.stats.window_full += 1;
            log::debug!(
                "[A] window full ({}/{}), dropping message",
                self.window.len(),
                self.window.capacity()
            );
            return false;
        }
        self.timers.register(seq, &self.window);

        log::debug!("[A] → DATA seq={} in_flight={}", seq, self.window.len());
        host.transmit(Side::A, packet);
        self.stats.packets_sent += 1;

        if !self.timer_running {
            self.arm(host);
        }

        self.next_seq = (self.next_seq + 1) % self.seq_space;
        true
    }

    /// Handle a packet from the network; for this entity it is always an ACK.
    pub fn on_input<H: Host>(&mut self, packet: Packet, host: &mut H) {
        if is_corrupted(&packet) {
            self.stats.corrupted_acks += 1;
            log::debug!("[A] ← corrupted ACK, ignoring");
            return;
        }
        if packet.seq != ACK_VALID {
            self.stats.filtered_acks += 1;
            log::debug!("[A] ← resent ACK {} filtered", packet.ack);
            return;
        }
        self.stats.acks_received += 1;

        let Some(payload) = self.window.mark_acked(packet.ack) else {
            self.stats.duplicate_acks += 1;
            log::debug!("[A] ← ACK {} is a duplicate, nothing to do", packet.ack);
            return;
        };

        self.stats.new_acks += 1;
        host.deliver(Side::A, &payload);

        let retired = self.window.compact();
        self.timers.reconcile(&self.window);
        log::debug!(
            "[A] ← ACK {} (retired {} seg, in_flight={})",
            packet.ack,
            retired,
            self.window.len()
        );

        self.disarm(host);
        if !self.window.is_empty() {
            self.arm(host);
        }
    }

    /// Handle expiry of this entity's timer.
    pub fn on_timer_interrupt<H: Host>(&mut self, host: &mut H) {
        self.timer_running = false;
        self.timers.reconcile(&self.window);

        let Some(packet) = self.timers.expire(&self.window) else {
            log::warn!("[A] timeout with nothing outstanding");
            return;
        };

        log::debug!("[A] timeout — resending seq={}", packet.seq);
        host.transmit(Side::A, packet);
        self.stats.packets_resent += 1;
        self.arm(host);
    }

    fn arm<H: Host>(&mut self, host: &mut H) {
        host.start_timer(Side::A, self.rtt);
        self.timer_running = true;
    }

    fn disarm<H: Host>(&mut self, host: &mut H) {
        if self.timer_running {
            host.stop_timer(Side::A);
            self.timer_running = false;
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
