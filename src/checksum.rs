//! Corruption detection.
//!
//! The checksum is a plain additive sum of the sequence number, the
//! acknowledgement number and every payload byte.  It is the only corruption
//! oracle in the protocol: a packet is corrupted exactly when its stored
//! checksum disagrees with a fresh recomputation.
//!
//! Because the sum is order-insensitive and purely additive, two byte errors
//! of equal magnitude and opposite sign cancel out and go unnoticed.  The
//! simulator only ever damages one field per packet, so this does not arise
//! in practice.

use crate::packet::Packet;

/// Compute the checksum of `packet`, ignoring its stored `checksum` field.
///
/// Arithmetic wraps, so damaged header fields of any magnitude are safe.
pub fn compute_checksum(packet: &Packet) -> i32 {
    packet
        .payload
        .iter()
        .fold(packet.seq.wrapping_add(packet.ack), |sum, &b| {
            sum.wrapping_add(i32::from(b))
        })
}

/// `true` when the stored checksum does not match the packet contents.
pub fn is_corrupted(packet: &Packet) -> bool {
    packet.checksum != compute_checksum(packet)
}
