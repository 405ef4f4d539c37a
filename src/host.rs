//! Boundary between the protocol engines and the world around them.
//!
//! The engines never touch a network or an application directly.  Every
//! effect they have goes through a [`Host`]: handing a packet to the channel,
//! arming or disarming the entity's single countdown timer, and passing a
//! payload up to the application layer.  The simulator implements it for real
//! runs; unit tests implement it with a recorder.

use crate::packet::{Packet, Payload};

/// Which protocol entity an interaction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The sending entity.
    A,
    /// The receiving entity.
    B,
}

impl Side {
    /// The entity on the other end of the channel.
    pub fn peer(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Services consumed by a protocol engine.
pub trait Host {
    /// Hand `packet` to the channel for delivery to the peer of `side`.
    fn transmit(&mut self, side: Side, packet: Packet);

    /// Arm the countdown timer of `side` to fire after `increment` time units.
    fn start_timer(&mut self, side: Side, increment: f64);

    /// Disarm the countdown timer of `side`.
    fn stop_timer(&mut self, side: Side);

    /// Pass `payload` up to the application layer at `side`.
    fn deliver(&mut self, side: Side, payload: &Payload);
}
