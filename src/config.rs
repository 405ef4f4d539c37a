//! Run-time parameters for the protocol engines and the simulator.
//!
//! Both config structs are plain data with a `Default` that matches the
//! classic laboratory setup, plus a `validate` method that rejects
//! combinations the protocol cannot operate under.

use thiserror::Error;

/// Errors reported when a configuration is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("window size must be at least 1")]
    ZeroWindow,

    #[error("sequence space {seq_space} is smaller than twice the window size {window_size}")]
    SeqSpaceTooSmall { seq_space: i32, window_size: usize },

    #[error("round-trip time must be positive and finite, got {0}")]
    BadRtt(f64),

    #[error("{name} must be a probability in [0, 1], got {value}")]
    BadProbability { name: &'static str, value: f64 },

    #[error("delay bounds must satisfy 0 < min_delay <= max_delay, got [{min}, {max}]")]
    BadDelay { min: f64, max: f64 },

    #[error("mean message interval must be positive and finite, got {0}")]
    BadInterval(f64),

    #[error("time limit must be a number, got {0}")]
    BadMaxTime(f64),
}

/// Fixed per-run protocol constants shared by sender and receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolConfig {
    /// Retransmission timeout, in simulated time units.
    pub rtt: f64,
    /// Maximum number of buffered, unacknowledged packets.
    pub window_size: usize,
    /// Size of the modular sequence-number space.
    pub seq_space: i32,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            rtt: 15.0,
            window_size: 6,
            seq_space: 12,
        }
    }
}

impl ProtocolConfig {
    /// Check that the window fits the sequence space without ambiguity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        let too_small = usize::try_from(self.seq_space)
            .map_or(true, |space| space < self.window_size.saturating_mul(2));
        if too_small {
            return Err(ConfigError::SeqSpaceTooSmall {
                seq_space: self.seq_space,
                window_size: self.window_size,
            });
        }
        if !(self.rtt.is_finite() && self.rtt > 0.0) {
            return Err(ConfigError::BadRtt(self.rtt));
        }
        Ok(())
    }
}

/// Fault model and workload of the network simulator.
///
/// All probabilities are in the range `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Number of application messages to generate (0 = only scheduled ones).
    pub messages: usize,
    /// Probability that any given packet is silently dropped.
    pub loss_prob: f64,
    /// Probability that a packet that was not dropped gets damaged.
    pub corrupt_prob: f64,
    /// Mean time between generated application messages.
    pub mean_interval: f64,
    /// Lower bound of the one-way channel delay.
    pub min_delay: f64,
    /// Upper bound of the one-way channel delay.
    pub max_delay: f64,
    /// Seed for every random decision the simulator makes.
    pub seed: u64,
    /// Stop the run once the clock passes this point.
    pub max_time: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        // No faults by default; the simulator is a transparent channel.
        Self {
            messages: 0,
            loss_prob: 0.0,
            corrupt_prob: 0.0,
            mean_interval: 1000.0,
            min_delay: 1.0,
            max_delay: 10.0,
            seed: 0,
            max_time: 1_000_000.0,
        }
    }
}

impl SimulatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("loss_prob", self.loss_prob),
            ("corrupt_prob", self.corrupt_prob),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::BadProbability { name, value });
            }
        }
        let delay_ok = self.min_delay.is_finite()
            && self.max_delay.is_finite()
            && (self.max_delay - self.min_delay).is_finite()
            && self.min_delay > 0.0
            && self.min_delay <= self.max_delay;
        if !delay_ok {
            return Err(ConfigError::BadDelay {
                min: self.min_delay,
                max: self.max_delay,
            });
        }
        if !(self.mean_interval.is_finite() && self.mean_interval > 0.0) {
            return Err(ConfigError::BadInterval(self.mean_interval));
        }
        if self.max_time.is_nan() {
            return Err(ConfigError::BadMaxTime(self.max_time));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(ProtocolConfig::default().validate(), Ok(()));
        assert_eq!(SimulatorConfig::default().validate(), Ok(()));
    }

    #[test]
    fn seq_space_must_cover_two_windows() {
        let cfg = ProtocolConfig {
            window_size: 6,
            seq_space: 11,
            ..Default::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::SeqSpaceTooSmall {
                seq_space: 11,
                window_size: 6
            })
        );

        let exact = ProtocolConfig {
            window_size: 6,
            seq_space: 12,
            ..Default::default()
        };
        assert!(exact.validate().is_ok());
    }

    #[test]
    fn negative_seq_space_rejected() {
        let cfg = ProtocolConfig {
            seq_space: -4,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::SeqSpaceTooSmall { .. })
        ));
    }

    #[test]
    fn zero_window_rejected() {
        let cfg = ProtocolConfig {
            window_size: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroWindow));
    }

    #[test]
    fn rtt_must_be_positive() {
        let cfg = ProtocolConfig {
            rtt: 0.0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::BadRtt(0.0)));
    }

    #[test]
    fn probabilities_checked() {
        let cfg = SimulatorConfig {
            corrupt_prob: 1.5,
            ..Default::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::BadProbability {
                name: "corrupt_prob",
                value: 1.5
            })
        );
    }

    #[test]
    fn delay_bounds_checked() {
        let cfg = SimulatorConfig {
            min_delay: 8.0,
            max_delay: 2.0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::BadDelay { .. })));

        for (min, max) in [
            (1.0, f64::INFINITY),
            (f64::NAN, 10.0),
            (1.0, f64::NAN),
            (0.0, 5.0),
        ] {
            let cfg = SimulatorConfig {
                min_delay: min,
                max_delay: max,
                ..Default::default()
            };
            assert!(
                matches!(cfg.validate(), Err(ConfigError::BadDelay { .. })),
                "[{min}, {max}] accepted"
            );
        }
    }

    #[test]
    fn interval_and_time_limit_must_be_numbers() {
        let cfg = SimulatorConfig {
            mean_interval: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::BadInterval(_))));

        let cfg = SimulatorConfig {
            max_time: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::BadMaxTime(_))));

        let unlimited = SimulatorConfig {
            max_time: f64::INFINITY,
            ..Default::default()
        };
        assert!(unlimited.validate().is_ok());
    }

    #[test]
    fn infinite_rtt_rejected() {
        let cfg = ProtocolConfig {
            rtt: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::BadRtt(_))));
    }

    #[test]
    fn error_messages_are_readable() {
        let err = ConfigError::SeqSpaceTooSmall {
            seq_space: 8,
            window_size: 6,
        };
        assert_eq!(
            err.to_string(),
            "sequence space 8 is smaller than twice the window size 6"
        );
    }
}
