//! End-to-end tests: sender and receiver talking through the simulator.
//!
//! Scripted tests use a fixed one-way delay and scheduled messages so that
//! every event time is known in advance; randomized tests use a seeded RNG so
//! failures are reproducible.

use sr_arq::config::{ProtocolConfig, SimulatorConfig};
use sr_arq::host::Side;
use sr_arq::packet::{Message, Payload, PAYLOAD_LEN};
use sr_arq::simulator::{Fate, Fault, Simulator};
use sr_arq::state::SenderState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const DELAY: f64 = 5.0;

fn payload(i: u8) -> Payload {
    [b'a' + i; PAYLOAD_LEN]
}

/// A simulator with a perfect channel of fixed delay.
fn scripted() -> Simulator {
    let config = SimulatorConfig {
        min_delay: DELAY,
        max_delay: DELAY,
        ..Default::default()
    };
    Simulator::new(&ProtocolConfig::default(), config).expect("valid config")
}

/// Schedule messages M0..M(n-1) at times 0, 1, 2, ...
fn send_burst(sim: &mut Simulator, n: u8) {
    for i in 0..n {
        sim.schedule_message(f64::from(i), Message::new(payload(i)));
    }
}

/// Times at which A transmitted a data packet with sequence number `seq`.
fn data_sends(sim: &Simulator, seq: i32) -> Vec<f64> {
    sim.transmissions()
        .iter()
        .filter(|t| t.side == Side::A && t.packet.seq == seq)
        .map(|t| t.time)
        .collect()
}

// ---------------------------------------------------------------------------
// Scripted scenarios
// ---------------------------------------------------------------------------

#[test]
fn clean_channel_delivers_in_order_without_retransmission() {
    let mut sim = scripted();
    send_burst(&mut sim, 6);

    let report = sim.run();

    let expected: Vec<Payload> = (0..6).map(payload).collect();
    assert!(report.drained);
    assert_eq!(sim.delivered(), expected.as_slice());
    assert_eq!(report.sender.window_full, 0);
    assert_eq!(report.sender.packets_resent, 0);
    assert_eq!(report.sender.new_acks, 6);
    assert_eq!(report.receiver.packets_received, 6);
    assert_eq!(sim.sender().state(), SenderState::Idle);
    assert!(!sim.sender().timer_running());
}

#[test]
fn lost_ack_triggers_one_retransmission_and_no_redelivery() {
    let mut sim = scripted();
    // B's third transmission is the ACK for M2.
    sim.inject(Side::B, 2, Fault::Lose);
    send_burst(&mut sim, 6);

    let report = sim.run();

    assert_eq!(report.sender.packets_resent, 1);
    // Last timer restart came with ACK 5 at t=15; one RTT later is t=30.
    assert_eq!(data_sends(&sim, 2), vec![2.0, 30.0]);
    for seq in [0, 1, 3, 4, 5] {
        assert_eq!(data_sends(&sim, seq).len(), 1, "seq {seq} was resent");
    }

    let expected: Vec<Payload> = (0..6).map(payload).collect();
    assert_eq!(sim.delivered(), expected.as_slice());
    assert_eq!(report.receiver.duplicates, 1);
    assert_eq!(report.packets_lost, 1);
    assert!(sim.sender().window().is_empty());
    assert_eq!(sim.confirmed().len(), 6);
}

#[test]
fn lost_data_is_recovered_and_delivered_in_order() {
    let mut sim = scripted();
    // A's second transmission carries M1.
    sim.inject(Side::A, 1, Fault::Lose);
    send_burst(&mut sim, 4);

    let report = sim.run();

    let expected: Vec<Payload> = (0..4).map(payload).collect();
    assert_eq!(sim.delivered(), expected.as_slice());
    assert_eq!(report.sender.packets_resent, 1);
    assert_eq!(data_sends(&sim, 1).len(), 2);
    assert_eq!(report.receiver.duplicates, 0);
    assert_eq!(report.receiver.packets_received, 4);
}

#[test]
fn corrupted_ack_is_ignored_and_recovered_by_timeout() {
    let mut sim = scripted();
    sim.inject(Side::B, 0, Fault::Corrupt);
    send_burst(&mut sim, 1);

    let report = sim.run();

    assert_eq!(report.sender.corrupted_acks, 1);
    assert_eq!(report.sender.packets_resent, 1);
    assert_eq!(data_sends(&sim, 0), vec![0.0, 15.0]);
    assert_eq!(sim.delivered(), &[payload(0)]);
    assert_eq!(report.receiver.duplicates, 1);
}

#[test]
fn burst_beyond_window_is_blocked_and_counted() {
    let mut sim = scripted();
    for i in 0..8 {
        sim.schedule_message(0.0, Message::new(payload(i)));
    }

    let report = sim.run();

    assert_eq!(report.messages_offered, 8);
    assert_eq!(report.messages_admitted, 6);
    assert_eq!(report.sender.window_full, 2);
    let expected: Vec<Payload> = (0..6).map(payload).collect();
    assert_eq!(sim.delivered(), expected.as_slice());
}

#[test]
fn sequence_numbers_wrap_across_a_long_transfer() {
    let mut sim = scripted();
    // Spaced out so every message is acknowledged before the next one.
    for i in 0..26u8 {
        sim.schedule_message(f64::from(i) * 20.0, Message::new(payload(i)));
    }

    let report = sim.run();

    let expected: Vec<Payload> = (0..26).map(payload).collect();
    assert_eq!(sim.delivered(), expected.as_slice());
    assert_eq!(report.sender.packets_resent, 0);

    let seqs: Vec<i32> = sim
        .transmissions()
        .iter()
        .filter(|t| t.side == Side::A)
        .map(|t| t.packet.seq)
        .collect();
    assert_eq!(seqs[12], 0);
    assert_eq!(seqs[13], 1);
    assert_eq!(seqs[25], 1);
    assert!(sim
        .transmissions()
        .iter()
        .all(|t| t.fate == Fate::Delivered));
}

// ---------------------------------------------------------------------------
// Randomized runs
// ---------------------------------------------------------------------------

fn lossy(seed: u64) -> SimulatorConfig {
    SimulatorConfig {
        messages: 40,
        loss_prob: 0.2,
        corrupt_prob: 0.2,
        mean_interval: 20.0,
        min_delay: 1.0,
        max_delay: 10.0,
        seed,
        max_time: 1_000_000.0,
    }
}

#[test]
fn lossy_channel_delivers_every_admitted_message_exactly_once() {
    for seed in [1, 2, 3, 42] {
        let mut sim = Simulator::new(&ProtocolConfig::default(), lossy(seed)).expect("valid");
        let report = sim.run();

        assert!(report.drained, "seed {seed}: run did not finish");
        assert_eq!(report.messages_offered, 40);
        assert_eq!(
            sim.delivered(),
            sim.admitted(),
            "seed {seed}: delivery differs from admission"
        );
        assert_eq!(
            report.messages_admitted + report.sender.window_full,
            report.messages_offered
        );
        assert_eq!(sim.sender().state(), SenderState::Idle);
    }
}

#[test]
fn same_seed_reproduces_the_same_run() {
    let run = |seed| {
        let mut sim = Simulator::new(&ProtocolConfig::default(), lossy(seed)).expect("valid");
        let report = sim.run();
        (report, sim.transmissions().to_vec())
    };
    assert_eq!(run(9), run(9));
}

#[test]
fn larger_window_and_space_work_end_to_end() {
    let protocol = ProtocolConfig {
        rtt: 30.0,
        window_size: 8,
        seq_space: 16,
    };
    let mut sim = Simulator::new(&protocol, lossy(5)).expect("valid");
    let report = sim.run();

    assert!(report.drained);
    assert_eq!(sim.delivered(), sim.admitted());
}
