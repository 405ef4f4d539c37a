//! Sender finite-state machine types.
//!
//! The sender's state is derived from its window occupancy rather than stored,
//! so it can never drift out of sync with the window itself.
//!
//! ```text
//!            send                  send (count == N)
//!   IDLE ───────────▶ WINDOW_OPEN ───────────────────▶ WINDOW_FULL
//!     ▲                 │     ▲                              │
//!     └─────────────────┘     └──────────────────────────────┘
//!   head ACK empties window      head ACK retires entries
//! ```

/// Observable state of the sending entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SenderState {
    /// No outstanding packets; retransmission timer disarmed.
    #[default]
    Idle,
    /// Some packets outstanding, room for more; timer armed.
    WindowOpen,
    /// Window at capacity; new messages are rejected.
    WindowFull,
}

impl SenderState {
    /// Classify a window holding `count` of at most `capacity` entries.
    pub fn from_occupancy(count: usize, capacity: usize) -> Self {
        match count {
            0 => Self::Idle,
            n if n >= capacity => Self::WindowFull,
            _ => Self::WindowOpen,
        }
    }
}

impl std::fmt::Display for SenderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupancy_maps_to_state() {
        assert_eq!(SenderState::from_occupancy(0, 6), SenderState::Idle);
        assert_eq!(SenderState::from_occupancy(1, 6), SenderState::WindowOpen);
        assert_eq!(SenderState::from_occupancy(5, 6), SenderState::WindowOpen);
        assert_eq!(SenderState::from_occupancy(6, 6), SenderState::WindowFull);
    }

    #[test]
    fn default_is_idle() {
        assert_eq!(SenderState::default(), SenderState::Idle);
    }
}
