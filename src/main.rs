//! Entry point for `sr-sim`.
//!
//! Parses CLI arguments into protocol and simulator configurations, runs one
//! simulation and prints its report.  All protocol work is delegated to the
//! library; `main.rs` owns only process setup (logging, argument parsing).

use anyhow::Context;
use clap::Parser;

use sr_arq::config::{ProtocolConfig, SimulatorConfig};
use sr_arq::simulator::Simulator;

/// Simulate a Selective-Repeat ARQ transfer over a lossy, corrupting channel.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Number of messages the application generates.
    #[arg(short, long, default_value_t = 20)]
    messages: usize,

    /// Probability that a packet is lost.
    #[arg(short, long, default_value_t = 0.0)]
    loss: f64,

    /// Probability that a packet is corrupted.
    #[arg(short, long, default_value_t = 0.0)]
    corrupt: f64,

    /// Mean time between messages from the application.
    #[arg(short, long, default_value_t = 10.0)]
    interval: f64,

    /// Minimum one-way channel delay.
    #[arg(long, default_value_t = 1.0)]
    min_delay: f64,

    /// Maximum one-way channel delay.
    #[arg(long, default_value_t = 10.0)]
    max_delay: f64,

    /// Seed for the simulator's random decisions.
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Stop the simulation after this much simulated time.
    #[arg(long, default_value_t = 1_000_000.0)]
    max_time: f64,

    /// Retransmission timeout.
    #[arg(long, default_value_t = 15.0)]
    rtt: f64,

    /// Sender window size.
    #[arg(short, long, default_value_t = 6)]
    window: usize,

    /// Size of the sequence-number space (at least twice the window).
    #[arg(long, default_value_t = 12)]
    seq_space: i32,
}

fn main() -> anyhow::Result<()> {
    // Initialise env_logger; set RUST_LOG to control verbosity.
    env_logger::init();

    let cli = Cli::parse();

    let protocol = ProtocolConfig {
        rtt: cli.rtt,
        window_size: cli.window,
        seq_space: cli.seq_space,
    };
    let config = SimulatorConfig {
        messages: cli.messages,
        loss_prob: cli.loss,
        corrupt_prob: cli.corrupt,
        mean_interval: cli.interval,
        min_delay: cli.min_delay,
        max_delay: cli.max_delay,
        seed: cli.seed,
        max_time: cli.max_time,
    };

    log::info!(
        "Simulating {} messages (loss={}, corrupt={}, window={}, seq_space={})",
        config.messages,
        config.loss_prob,
        config.corrupt_prob,
        protocol.window_size,
        protocol.seq_space
    );

    let mut sim = Simulator::new(&protocol, config).context("invalid configuration")?;
    let report = sim.run();
    println!("{report}");

    Ok(())
}
