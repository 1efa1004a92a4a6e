use crate::{
    defaults::{
        DEFAULT_ACTIVITY_WINDOW, DEFAULT_BURST, DEFAULT_CLOCK_DESYNC, DEFAULT_LATENCY_PER_DISTANCE,
        DEFAULT_LINK_RATE, DEFAULT_MAX_RANDOM_LATENCY, DEFAULT_NODE_RATE, DEFAULT_PACKET_LOSS,
        DEFAULT_SEED,
    },
    measure::{Latency, PacketLoss, Rate},
};
use thiserror::Error;

/// Network-wide parameters of a simulation.
///
/// ## Defaults
///
/// | Setting | Default |
/// |---------|---------|
/// | Link rate | `30B/s` |
/// | Node rate | `20B/s` |
/// | Burst | `10` seconds of refill |
/// | Latency per distance | `0.01` s per unit |
/// | Max random latency | `100ms` |
/// | Packet loss | `20%` |
/// | Clock desync | `0` s |
/// | Seed | `12345` |
///
/// ## Example
///
/// ```
/// use p2psim_core::{config::SimConfiguration, measure::PacketLoss};
///
/// let configuration = SimConfiguration::default()
///     .set_packet_loss(PacketLoss::NONE)
///     .set_clock_desync(0.5)
///     .unwrap()
///     .set_seed(42);
///
/// assert_eq!(configuration.seed, 42);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfiguration {
    /// rate of the links created on first use
    pub link_rate: Rate,
    /// default inbound rate of a node
    pub node_rate: Rate,
    /// bucket capacity in seconds of refill, for links and nodes
    pub burst: f64,
    /// seconds of latency per unit of distance
    pub latency_per_distance: f64,
    /// random latency added to links created on first use, drawn in `[0, max)`
    pub max_random_latency: Latency,
    pub packet_loss: PacketLoss,
    /// bound of the per-node clock offsets, in seconds
    pub clock_desync: f64,
    pub seed: u64,
    /// seconds a link is shown active after its last arrival
    pub activity_window: f64,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Burst must be positive and finite, got {0}")]
    InvalidBurst(f64),
    #[error("Latency per distance must be non-negative and finite, got {0}")]
    InvalidLatencyPerDistance(f64),
    #[error("Clock desynchronisation must be non-negative and finite, got {0}")]
    InvalidClockDesync(f64),
    #[error("Activity window must be non-negative and finite, got {0}")]
    InvalidActivityWindow(f64),
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

impl SimConfiguration {
    pub fn set_link_rate(mut self, rate: Rate) -> Self {
        self.link_rate = rate;
        self
    }

    pub fn set_node_rate(mut self, rate: Rate) -> Self {
        self.node_rate = rate;
        self
    }

    pub fn set_burst(mut self, burst: f64) -> Result<Self, ConfigError> {
        if !(burst.is_finite() && burst > 0.0) {
            return Err(ConfigError::InvalidBurst(burst));
        }
        self.burst = burst;
        Ok(self)
    }

    pub fn set_latency_per_distance(mut self, seconds: f64) -> Result<Self, ConfigError> {
        if !non_negative(seconds) {
            return Err(ConfigError::InvalidLatencyPerDistance(seconds));
        }
        self.latency_per_distance = seconds;
        Ok(self)
    }

    pub fn set_max_random_latency(mut self, latency: Latency) -> Self {
        self.max_random_latency = latency;
        self
    }

    pub fn set_packet_loss(mut self, packet_loss: PacketLoss) -> Self {
        self.packet_loss = packet_loss;
        self
    }

    pub fn set_clock_desync(mut self, seconds: f64) -> Result<Self, ConfigError> {
        if !non_negative(seconds) {
            return Err(ConfigError::InvalidClockDesync(seconds));
        }
        self.clock_desync = seconds;
        Ok(self)
    }

    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn set_activity_window(mut self, seconds: f64) -> Result<Self, ConfigError> {
        if !non_negative(seconds) {
            return Err(ConfigError::InvalidActivityWindow(seconds));
        }
        self.activity_window = seconds;
        Ok(self)
    }

    /// check every field, for configurations built with struct syntax
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.clone()
            .set_burst(self.burst)?
            .set_latency_per_distance(self.latency_per_distance)?
            .set_clock_desync(self.clock_desync)?
            .set_activity_window(self.activity_window)?;
        Ok(())
    }
}

impl Default for SimConfiguration {
    fn default() -> Self {
        Self {
            link_rate: DEFAULT_LINK_RATE,
            node_rate: DEFAULT_NODE_RATE,
            burst: DEFAULT_BURST,
            latency_per_distance: DEFAULT_LATENCY_PER_DISTANCE,
            max_random_latency: DEFAULT_MAX_RANDOM_LATENCY,
            packet_loss: DEFAULT_PACKET_LOSS,
            clock_desync: DEFAULT_CLOCK_DESYNC,
            seed: DEFAULT_SEED,
            activity_window: DEFAULT_ACTIVITY_WINDOW,
        }
    }
}
