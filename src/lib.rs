//! `sr-arq` — a Selective-Repeat-style ARQ protocol over a simulated,
//! lossy, corrupting, FIFO channel.
//!
//! # Architecture
//!
//! ```text
//!  application                                   application
//!      │ Message                                      ▲ Payload
//!  ┌───▼──────────┐      DATA packets        ┌────────┴─────┐
//!  │  Sender (A)  │─────────────────────────▶│ Receiver (B) │
//!  │  SendWindow  │                          │ recv window  │
//!  │  Timers      │◀─────────────────────────│ last ACK     │
//!  └───┬──────────┘          ACKs            └────────┬─────┘
//!      │ transmit / start_timer / stop_timer / deliver│
//!  ┌───▼──────────────────────────────────────────────▼───┐
//!  │                      Host                            │
//!  │   (Simulator: event queue, delay, loss, corruption)  │
//!  └──────────────────────────────────────────────────────┘
//! ```
//!
//! Each module has a single responsibility:
//! - [`packet`]    — packet and message types, header sentinels
//! - [`checksum`]  — additive checksum and the corruption check
//! - [`window`]    — bounded send window with cumulative compaction
//! - [`timer`]     — retransmission list anchored to the oldest packet
//! - [`state`]     — sender state derived from window occupancy
//! - [`sender`]    — sending entity (A) event handlers
//! - [`receiver`]  — receiving entity (B) event handlers
//! - [`host`]      — the services an entity consumes from its surroundings
//! - [`config`]    — protocol and simulator parameters, validation errors
//! - [`simulator`] — discrete-event network emulator driving both entities

pub mod checksum;
pub mod config;
pub mod host;
pub mod packet;
pub mod receiver;
pub mod sender;
pub mod simulator;
pub mod state;
pub mod timer;
pub mod window;
