//! Packet and message types exchanged between the two protocol entities.
//!
//! Every unit handed to the network is a [`Packet`]: a sequence number, an
//! acknowledgement number, a checksum, and a fixed-size payload block.  The
//! application layer hands the sender [`Message`]s carrying the same block.
//!
//! No I/O happens here.  Checksum arithmetic lives in [`crate::checksum`].
//!
//! # Field usage
//!
//! | Kind | `seq`                            | `ack`                   |
//! |------|----------------------------------|-------------------------|
//! | DATA | sequence number in `[0, SEQSPACE)` | [`NOT_IN_USE`]        |
//! | ACK  | [`ACK_VALID`] or [`ACK_RESEND`]  | acknowledged sequence # |

use crate::checksum::compute_checksum;

/// Size of the payload block carried by every packet and message.
pub const PAYLOAD_LEN: usize = 20;

/// Fills header fields that carry no meaning for a given packet kind.
pub const NOT_IN_USE: i32 = -1;

/// ACK kind tag: answers an intact data packet.
pub const ACK_VALID: i32 = 0;

/// ACK kind tag: repeats the last ACK after a damaged or unrecognised packet.
pub const ACK_RESEND: i32 = 1;

/// Payload byte used to fill ACK packets, which carry no data.
const ACK_FILL: u8 = b'0';

/// Fixed-size payload block.
pub type Payload = [u8; PAYLOAD_LEN];

/// A unit of data handed down by the application layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub data: Payload,
}

impl Message {
    pub fn new(data: Payload) -> Self {
        Self { data }
    }

    /// A message whose payload is `PAYLOAD_LEN` copies of `byte`.
    pub fn filled(byte: u8) -> Self {
        Self {
            data: [byte; PAYLOAD_LEN],
        }
    }
}

/// A datagram as carried by the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    /// Sequence number of a data packet, or the ACK kind tag of an ACK.
    pub seq: i32,
    /// Acknowledged sequence number, or [`NOT_IN_USE`] on data packets.
    pub ack: i32,
    /// Additive checksum over `seq`, `ack` and `payload`.
    pub checksum: i32,
    pub payload: Payload,
}

impl Packet {
    /// Build a sealed data packet carrying `payload` under sequence number `seq`.
    pub fn data(seq: i32, payload: Payload) -> Self {
        Self {
            seq,
            ack: NOT_IN_USE,
            checksum: 0,
            payload,
        }
        .sealed()
    }

    /// Build a sealed ACK for sequence number `ack`, tagged with `kind`.
    pub fn ack(kind: i32, ack: i32) -> Self {
        Self {
            seq: kind,
            ack,
            checksum: 0,
            payload: [ACK_FILL; PAYLOAD_LEN],
        }
        .sealed()
    }

    /// Return a copy with `checksum` recomputed from the current fields.
    pub fn sealed(mut self) -> Self {
        self.checksum = compute_checksum(&self);
        self
    }

    /// `true` when the packet carries application data rather than an ACK.
    pub fn is_data(&self) -> bool {
        self.ack == NOT_IN_USE
    }
}

impl std::fmt::Display for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let payload = String::from_utf8_lossy(&self.payload);
        write!(
            f,
            "seq={} ack={} checksum={} payload={payload}",
            self.seq, self.ack, self.checksum
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_packet_has_no_ack_number() {
        let pkt = Packet::data(3, [b'c'; PAYLOAD_LEN]);
        assert_eq!(pkt.seq, 3);
        assert_eq!(pkt.ack, NOT_IN_USE);
        assert!(pkt.is_data());
    }

    #[test]
    fn ack_packet_is_not_data() {
        let pkt = Packet::ack(ACK_VALID, 4);
        assert_eq!(pkt.seq, ACK_VALID);
        assert_eq!(pkt.ack, 4);
        assert_eq!(pkt.payload, [b'0'; PAYLOAD_LEN]);
        assert!(!pkt.is_data());
    }

    #[test]
    fn constructors_seal_the_checksum() {
        let data = Packet::data(7, [b'x'; PAYLOAD_LEN]);
        assert_eq!(data.checksum, compute_checksum(&data));

        let ack = Packet::ack(ACK_RESEND, 7);
        assert_eq!(ack.checksum, compute_checksum(&ack));
    }

    #[test]
    fn filled_message_repeats_byte() {
        let msg = Message::filled(b'q');
        assert!(msg.data.iter().all(|&b| b == b'q'));
    }
}
