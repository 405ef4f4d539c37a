//! Discrete-event network simulator for exercising the protocol end to end.
//!
//! [`Simulator`] owns one [`Sender`] (A) and one [`Receiver`] (B) and plays
//! the roles around them: the application producing messages at A, the
//! one-way channels in both directions, and the per-entity countdown timers.
//!
//! | Fault      | Description                                               |
//! |------------|-----------------------------------------------------------|
//! | Loss       | Drop a packet with probability `loss_prob`.               |
//! | Corruption | Damage one field with probability `corrupt_prob`.         |
//! | Delay      | Uniform in `[min_delay, max_delay]`; channels stay FIFO.  |
//! | Scripted   | Force the n-th transmission of a side lost or corrupted.  |
//!
//! Every random decision comes from a [`StdRng`] seeded by
//! [`SimulatorConfig::seed`], so runs are reproducible.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{ConfigError, ProtocolConfig, SimulatorConfig};
use crate::host::{Host, Side};
use crate::packet::{Message, Packet, Payload};
use crate::receiver::{Receiver, ReceiverStats};
use crate::sender::{Sender, SenderStats};

/// Value written over a header field when the simulator damages it.
const DAMAGED_FIELD: i32 = 999_999;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A fault forced onto one specific transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Lose,
    Corrupt,
}

/// What the channel did with a transmitted packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    Delivered,
    Corrupted,
    Lost,
}

/// One packet handed to the channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transmission {
    /// Simulated time of the hand-off.
    pub time: f64,
    /// Entity that transmitted the packet.
    pub side: Side,
    /// The packet as handed over, before any damage.
    pub packet: Packet,
    pub fate: Fate,
}

/// Summary of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Clock value when the run stopped.
    pub sim_time: f64,
    /// `true` when the run ended because no events were left.
    pub drained: bool,
    /// Messages offered to the sender by the application.
    pub messages_offered: u64,
    /// Messages the sender accepted into its window.
    pub messages_admitted: u64,
    /// Payloads delivered to the application at B.
    pub messages_delivered: u64,
    pub packets_lost: u64,
    pub packets_corrupted: u64,
    pub sender: SenderStats,
    pub receiver: ReceiverStats,
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Simulation stopped at time {:.3}", self.sim_time)?;
        if !self.drained {
            writeln!(f, "  (time limit reached with events still pending)")?;
        }
        writeln!(f, "Messages offered by the application:  {}", self.messages_offered)?;
        writeln!(f, "Messages admitted to the window:      {}", self.messages_admitted)?;
        writeln!(f, "Messages blocked by a full window:    {}", self.sender.window_full)?;
        writeln!(f, "Messages delivered at B:              {}", self.messages_delivered)?;
        writeln!(f, "Packets lost by the channel:          {}", self.packets_lost)?;
        writeln!(f, "Packets corrupted by the channel:     {}", self.packets_corrupted)?;
        writeln!(f, "A: data packets sent:                 {}", self.sender.packets_sent)?;
        writeln!(f, "A: packets resent:                    {}", self.sender.packets_resent)?;
        writeln!(f, "A: ACKs received:                     {}", self.sender.acks_received)?;
        writeln!(f, "A: new ACKs:                          {}", self.sender.new_acks)?;
        writeln!(f, "A: duplicate ACKs:                    {}", self.sender.duplicate_acks)?;
        writeln!(f, "A: corrupted ACKs:                    {}", self.sender.corrupted_acks)?;
        writeln!(f, "A: filtered ACKs:                     {}", self.sender.filtered_acks)?;
        writeln!(f, "B: packets received:                  {}", self.receiver.packets_received)?;
        writeln!(f, "B: duplicate packets:                 {}", self.receiver.duplicates)?;
        write!(f, "B: rejected packets:                  {}", self.receiver.rejected)
    }
}

// ---------------------------------------------------------------------------
// Event queue
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum EventKind {
    /// A message supplied by the caller reaches A.
    AppMessage(Message),
    /// The built-in generator produces the next message for A.
    GenerateMessage,
    PacketArrival { to: Side, packet: Packet },
    TimerInterrupt { side: Side, token: u64 },
}

#[derive(Debug)]
struct Event {
    time: f64,
    /// Insertion order; breaks ties between events at the same time.
    order: u64,
    kind: EventKind,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    // Reversed so that `BinaryHeap` pops the earliest event first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.order.cmp(&self.order))
    }
}

fn slot(side: Side) -> usize {
    match side {
        Side::A => 0,
        Side::B => 1,
    }
}

// ---------------------------------------------------------------------------
// Link — the Host seen by both entities
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Link {
    clock: f64,
    queue: BinaryHeap<Event>,
    next_order: u64,
    rng: StdRng,
    loss_prob: f64,
    corrupt_prob: f64,
    min_delay: f64,
    max_delay: f64,
    /// Latest scheduled arrival time per destination.
    last_arrival: [f64; 2],
    /// Token of the armed timer per side.
    timers: [Option<u64>; 2],
    next_token: u64,
    /// Transmissions made so far per side.
    sent: [u64; 2],
    faults: HashMap<(Side, u64), Fault>,
    transmissions: Vec<Transmission>,
    delivered: Vec<Payload>,
    confirmed: Vec<Payload>,
    lost: u64,
    corrupted: u64,
}

impl Link {
    fn new(config: &SimulatorConfig) -> Self {
        Self {
            clock: 0.0,
            queue: BinaryHeap::new(),
            next_order: 0,
            rng: StdRng::seed_from_u64(config.seed),
            loss_prob: config.loss_prob,
            corrupt_prob: config.corrupt_prob,
            min_delay: config.min_delay,
            max_delay: config.max_delay,
            last_arrival: [0.0; 2],
            timers: [None; 2],
            next_token: 0,
            sent: [0; 2],
            faults: HashMap::new(),
            transmissions: Vec::new(),
            delivered: Vec::new(),
            confirmed: Vec::new(),
            lost: 0,
            corrupted: 0,
        }
    }

    fn schedule(&mut self, time: f64, kind: EventKind) {
        let order = self.next_order;
        self.next_order += 1;
        self.queue.push(Event { time, order, kind });
    }

    fn delay(&mut self) -> f64 {
        if self.max_delay > self.min_delay {
            self.rng.gen_range(self.min_delay..=self.max_delay)
        } else {
            self.min_delay
        }
    }

    fn damage(&mut self, packet: &mut Packet) {
        let x: f64 = self.rng.gen();
        if x < 0.75 {
            packet.payload[0] = b'Z';
        } else if x < 0.875 {
            packet.seq = DAMAGED_FIELD;
        } else {
            packet.ack = DAMAGED_FIELD;
        }
    }
}

impl Host for Link {
    fn transmit(&mut self, side: Side, packet: Packet) {
        let index = self.sent[slot(side)];
        self.sent[slot(side)] += 1;
        let forced = self.faults.remove(&(side, index));

        let lose = match forced {
            Some(fault) => fault == Fault::Lose,
            None => self.rng.gen_bool(self.loss_prob),
        };
        if lose {
            self.lost += 1;
            log::debug!("[sim] {side} packet lost: {packet}");
            self.transmissions.push(Transmission {
                time: self.clock,
                side,
                packet,
                fate: Fate::Lost,
            });
            return;
        }

        let corrupt = match forced {
            Some(fault) => fault == Fault::Corrupt,
            None => self.rng.gen_bool(self.corrupt_prob),
        };
        let mut on_wire = packet;
        if corrupt {
            self.corrupted += 1;
            self.damage(&mut on_wire);
            log::debug!("[sim] {side} packet corrupted: {on_wire}");
        }

        let to = side.peer();
        let at = self.clock.max(self.last_arrival[slot(to)]) + self.delay();
        self.last_arrival[slot(to)] = at;
        self.schedule(
            at,
            EventKind::PacketArrival {
                to,
                packet: on_wire,
            },
        );
        self.transmissions.push(Transmission {
            time: self.clock,
            side,
            packet,
            fate: if corrupt {
                Fate::Corrupted
            } else {
                Fate::Delivered
            },
        });
    }

    fn start_timer(&mut self, side: Side, increment: f64) {
        if self.timers[slot(side)].is_some() {
            log::warn!("[sim] {side} tried to start a timer that is already running");
            return;
        }
        let token = self.next_token;
        self.next_token += 1;
        self.timers[slot(side)] = Some(token);
        self.schedule(
            self.clock + increment,
            EventKind::TimerInterrupt { side, token },
        );
    }

    fn stop_timer(&mut self, side: Side) {
        if self.timers[slot(side)].take().is_none() {
            log::warn!("[sim] {side} tried to stop a timer that is not running");
        }
    }

    fn deliver(&mut self, side: Side, payload: &Payload) {
        match side {
            Side::A => self.confirmed.push(*payload),
            Side::B => self.delivered.push(*payload),
        }
    }
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

/// A complete sender/channel/receiver system driven by simulated time.
#[derive(Debug)]
pub struct Simulator {
    config: SimulatorConfig,
    sender: Sender,
    receiver: Receiver,
    link: Link,
    generated: usize,
    offered: u64,
    admitted: Vec<Payload>,
}

impl Simulator {
    /// Validate both configurations and build an idle system at time zero.
    ///
    /// When `config.messages` is non-zero the first generated message is
    /// scheduled right away.
    pub fn new(protocol: &ProtocolConfig, config: SimulatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let sender = Sender::new(protocol)?;
        let receiver = Receiver::new(protocol)?;

        let mut link = Link::new(&config);
        if config.messages > 0 {
            let first = link.rng.gen::<f64>() * 2.0 * config.mean_interval;
            link.schedule(first, EventKind::GenerateMessage);
        }

        Ok(Self {
            sender,
            receiver,
            link,
            config,
            generated: 0,
            offered: 0,
            admitted: Vec::new(),
        })
    }

    /// Have the application hand `message` to A at time `at`.
    pub fn schedule_message(&mut self, at: f64, message: Message) {
        self.link.schedule(at, EventKind::AppMessage(message));
    }

    /// Force the `nth` (0-based) transmission made by `side` to suffer `fault`.
    pub fn inject(&mut self, side: Side, nth: u64, fault: Fault) {
        self.link.faults.insert((side, nth), fault);
    }

    /// Process the next event.
    ///
    /// Returns `false` when the queue is empty or the next event lies beyond
    /// [`SimulatorConfig::max_time`].
    pub fn step(&mut self) -> bool {
        let Some(event) = self.link.queue.pop() else {
            return false;
        };
        if event.time > self.config.max_time {
            self.link.queue.push(event);
            return false;
        }
        self.link.clock = event.time;

        match event.kind {
            EventKind::AppMessage(message) => self.offer(message),
            EventKind::GenerateMessage => self.generate(),
            EventKind::PacketArrival { to: Side::A, packet } => {
                self.sender.on_input(packet, &mut self.link);
            }
            EventKind::PacketArrival { to: Side::B, packet } => {
                self.receiver.on_input(packet, &mut self.link);
            }
            EventKind::TimerInterrupt { side, token } => {
                if self.link.timers[slot(side)] != Some(token) {
                    log::trace!("[sim] stale timer for {side} ignored");
                    return true;
                }
                self.link.timers[slot(side)] = None;
                match side {
                    Side::A => self.sender.on_timer_interrupt(&mut self.link),
                    Side::B => log::warn!("[sim] B has no use for a timer"),
                }
            }
        }
        true
    }

    /// Run until the event queue drains or the time limit is reached.
    pub fn run(&mut self) -> Report {
        while self.step() {}
        let report = self.report();
        log::info!(
            "[sim] finished at t={:.3}: {} delivered, {} resent",
            report.sim_time,
            report.messages_delivered,
            report.sender.packets_resent
        );
        report
    }

    pub fn report(&self) -> Report {
        Report {
            sim_time: self.link.clock,
            drained: self.link.queue.is_empty(),
            messages_offered: self.offered,
            messages_admitted: self.admitted.len() as u64,
            messages_delivered: self.link.delivered.len() as u64,
            packets_lost: self.link.lost,
            packets_corrupted: self.link.corrupted,
            sender: self.sender.stats().clone(),
            receiver: self.receiver.stats().clone(),
        }
    }

    pub fn now(&self) -> f64 {
        self.link.clock
    }

    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    /// Every packet handed to the channel, in order.
    pub fn transmissions(&self) -> &[Transmission] {
        &self.link.transmissions
    }

    /// Payloads A accepted into its window, in order.
    pub fn admitted(&self) -> &[Payload] {
        &self.admitted
    }

    /// Payloads delivered to the application at B, in order.
    pub fn delivered(&self) -> &[Payload] {
        &self.link.delivered
    }

    /// Payloads whose delivery A has seen acknowledged, in ACK order.
    pub fn confirmed(&self) -> &[Payload] {
        &self.link.confirmed
    }

    fn offer(&mut self, message: Message) {
        self.offered += 1;
        if self.sender.on_output(message, &mut self.link) {
            self.admitted.push(message.data);
        }
    }

    fn generate(&mut self) {
        let letter = b'a' + (self.generated % 26) as u8;
        self.generated += 1;
        log::trace!("[sim] application message {} ('{}')", self.generated, letter as char);
        self.offer(Message::filled(letter));

        if self.generated < self.config.messages {
            let gap = self.link.rng.gen::<f64>() * 2.0 * self.config.mean_interval;
            let at = self.link.clock + gap;
            self.link.schedule(at, EventKind::GenerateMessage);
        }
    }
}
