/*!
# p2psim core

Thread-free building blocks of the peer-to-peer overlay simulator:

* [`clock::Clock`]: the shared simulated timeline, scaled from wall-clock
  time by a mutable speed multiplier;
* [`measure::FlowLimiter`]: the token bucket used by both links and nodes
  to model bandwidth;
* [`link::Link`]: a directed channel with latency and its own bucket;
* [`transmission::Transmission`] and [`time_queue::TimeQueue`]: the
  scheduled deliveries, ordered by arrival time;
* [`config::SimConfiguration`]: the network-wide parameters.

The running simulation (nodes, threads and the scheduler) lives in the
`p2psim` crate.

```
use p2psim_core::{
    link::Link,
    measure::{FlowLimiter, Latency, Rate},
    time::SimTime,
};
use std::time::Duration;

let now = SimTime::from_secs_f64(10.0);
let rate = Rate::new(30.0).unwrap();

let mut link = Link::new(
    Latency::new(Duration::from_millis(250)),
    FlowLimiter::with_burst(rate, 10.0, now),
);
let mut recipient = FlowLimiter::with_burst(Rate::new(20.0).unwrap(), 10.0, now);

// the delivery is gated by the most constrained of the two buckets
let arrival = link.schedule_send(10, now).max(recipient.reserve(10, now));
assert_eq!(arrival.secs_since(now), 0.25);
```
*/

pub mod clock;
pub mod config;
pub mod data;
pub mod defaults;
pub mod link;
pub mod measure;
pub mod node;
pub mod random;
pub mod time;
pub mod time_queue;
pub mod transmission;

pub use self::{
    clock::Clock,
    config::{ConfigError, SimConfiguration},
    data::Data,
    link::{Link, LinkId},
    measure::{FlowLimiter, Latency, PacketLoss, Rate},
    node::{Color, NodeAddress, Position},
    time::SimTime,
    time_queue::TimeQueue,
    transmission::{Message, Transmission},
};
