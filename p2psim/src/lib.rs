/*!
# p2psim

Threaded simulator of a peer-to-peer overlay network.

Every node runs in its own thread and talks to the other nodes through
directed links with latency and limited bandwidth. A scheduler thread
delivers the transmissions as they become due on a simulated clock that
can be sped up, slowed down or paused.

```no_run
use p2psim::{NodeAddress, NodeConfig, Position, ProbeConfig, SimConfiguration, SimContext};
use std::time::Duration;

# fn main() -> anyhow::Result<()> {
let mut context = SimContext::<Vec<u8>>::new(SimConfiguration::default())?;

context.add_probe_node(
    NodeConfig::new("alice").set_position(Position::new(0.0, 0.0)),
    ProbeConfig {
        targets: vec![NodeAddress::new("bob")],
        wait: Duration::from_millis(500),
        size: 10,
    },
)?;
context.add_probe_node(
    NodeConfig::new("bob").set_position(Position::new(100.0, 0.0)),
    ProbeConfig {
        targets: Vec::new(),
        wait: Duration::from_millis(500),
        size: 10,
    },
)?;

std::thread::sleep(Duration::from_secs(3));
for transmission in context.snapshot().transmissions {
    println!("{} -> {}: {:.0}%", transmission.from, transmission.to, transmission.progress * 100.0);
}

context.shutdown()
# }
```
*/

mod context;
mod network;
mod node;
pub mod snapshot;
mod stop;
mod sync;

// convenient re-export of `p2psim_core` core objects
pub use p2psim_core::{
    Clock, Color, ConfigError, Data, Latency, LinkId, Message, NodeAddress, PacketLoss, Position,
    Rate, SimConfiguration, SimTime,
};

pub use self::{
    context::{RING_CENTER, RING_RADIUS, RING_SLOTS, SimContext},
    network::{AddNodeError, LinkBuilder, Network, SCHEDULER_TICK},
    node::{Behavior, NODE_TICK, NodeIo, NodeConfig, ProbeConfig, ProbeNode, SILENCE_FACTOR},
    snapshot::{LinkView, NetworkStats, NodeView, Snapshot, TransmissionView},
};
