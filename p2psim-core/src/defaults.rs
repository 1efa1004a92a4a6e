//! Default values of a simulation, taken from the reference overlay setup:
//! a handful of slow links (tens of bytes per second) so that congestion is
//! visible at human speed.

use crate::measure::{Latency, PacketLoss, Rate};
use std::time::Duration;

/// Default [`Rate`] of a lazily created [`Link`]
///
/// ```
/// # use p2psim_core::defaults::*;
/// assert_eq!(DEFAULT_LINK_RATE.to_string(), "30B/s");
/// ```
///
/// [`Link`]: crate::link::Link
pub const DEFAULT_LINK_RATE: Rate = Rate::new_unchecked(30.0);

/// Default inbound [`Rate`] of a node
///
/// ```
/// # use p2psim_core::defaults::*;
/// assert_eq!(DEFAULT_NODE_RATE.to_string(), "20B/s");
/// ```
pub const DEFAULT_NODE_RATE: Rate = Rate::new_unchecked(20.0);

/// Bucket capacity, expressed in seconds worth of refill.
///
/// A link of `30B/s` holds up to `300` bytes of burst.
pub const DEFAULT_BURST: f64 = 10.0;

/// Latency added per unit of distance between two nodes, in seconds
pub const DEFAULT_LATENCY_PER_DISTANCE: f64 = 0.01;

/// Upper bound (exclusive) of the random latency added to a lazily created
/// link
///
/// ```
/// # use p2psim_core::defaults::*;
/// assert_eq!(DEFAULT_MAX_RANDOM_LATENCY.to_string(), "100ms");
/// ```
pub const DEFAULT_MAX_RANDOM_LATENCY: Latency = Latency::new(Duration::from_millis(100));

/// Probability of losing any given transmission
///
/// ```
/// # use p2psim_core::defaults::*;
/// assert_eq!(DEFAULT_PACKET_LOSS.to_string(), "20%");
/// ```
pub const DEFAULT_PACKET_LOSS: PacketLoss = PacketLoss::new_unchecked(0.2);

/// Bound of the per-node clock offset, in seconds. Offsets are drawn in
/// `[-desync, desync]`; by default all clocks agree.
pub const DEFAULT_CLOCK_DESYNC: f64 = 0.0;

/// Seed of the network's random generator
pub const DEFAULT_SEED: u64 = 12_345;

/// How long a link stays "active" for rendering after its last arrival,
/// in simulated seconds
pub const DEFAULT_ACTIVITY_WINDOW: f64 = 2.0;
