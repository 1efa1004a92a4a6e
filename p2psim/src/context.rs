use crate::{
    network::{AddNodeError, Network, spawn_scheduler},
    node::{Behavior, NodeConfig, ProbeConfig, ProbeNode},
    snapshot::{NetworkStats, Snapshot},
};
use anyhow::{Context as _, Result, bail};
use p2psim_core::{
    Clock, Color, Data, NodeAddress, Position, SimConfiguration, clock::ClockError, random,
};
use std::{thread::JoinHandle, time::Duration};
use tracing::debug;

/// Center of the ring spawned nodes are laid out on.
pub const RING_CENTER: Position = Position::new(300.0, 300.0);
pub const RING_RADIUS: f64 = 200.0;
/// Number of slots on the ring, the ninth spawned node shares the first
/// node's slot.
pub const RING_SLOTS: usize = 8;

/// Number of random targets a spawned node starts with, once the network is
/// large enough.
const INITIAL_TARGETS: usize = 3;
const PROBE_SIZE: usize = 10;
const MIN_PROBE_WAIT: f64 = 0.1;

/// Driver of a running simulation.
///
/// Creating a `SimContext` starts the scheduler thread, every node added
/// runs in its own thread. Call [`SimContext::shutdown`] for a clean stop
/// of all of them.
///
/// ```no_run
/// use p2psim::{SimConfiguration, SimContext};
///
/// # fn main() -> anyhow::Result<()> {
/// let mut context = SimContext::<Vec<u8>>::new(SimConfiguration::default())?;
/// for _ in 0..10 {
///     context.spawn_probe_node()?;
/// }
/// context.set_speed(4.0)?;
///
/// std::thread::sleep(std::time::Duration::from_secs(1));
/// println!("{:?}", context.stats());
///
/// context.shutdown()
/// # }
/// ```
pub struct SimContext<T> {
    network: Network<T>,

    scheduler: JoinHandle<()>,

    /// nodes in the order they were added
    nodes: Vec<(NodeAddress, JoinHandle<()>)>,

    /// suffix of the next spawned node's address
    spawned: usize,
}

impl<T> SimContext<T>
where
    T: Data,
{
    pub fn new(configuration: SimConfiguration) -> Result<Self> {
        Self::with_clock(configuration, Clock::new())
    }

    pub fn with_clock(configuration: SimConfiguration, clock: Clock) -> Result<Self> {
        let network =
            Network::with_clock(configuration, clock).context("Invalid simulation configuration")?;
        let scheduler =
            spawn_scheduler(network.clone()).context("Failed to start the scheduler")?;

        Ok(Self {
            network,
            scheduler,
            nodes: Vec::new(),
            spawned: 0,
        })
    }

    pub fn network(&self) -> &Network<T> {
        &self.network
    }

    /// register a node running `behavior` and start it
    pub fn add_node<B>(&mut self, settings: NodeConfig, behavior: B) -> Result<(), AddNodeError>
    where
        B: Behavior<T>,
    {
        let address = settings.address().clone();
        let handle = self.network.add_node(settings, behavior)?;
        self.nodes.push((address, handle));
        Ok(())
    }

    /// stop the most recently added node still running, returns its address
    pub fn remove_node(&mut self) -> Option<NodeAddress> {
        let address = self
            .nodes
            .iter()
            .rev()
            .map(|(address, _)| address)
            .find(|address| self.network.is_node_running(address))?
            .clone();

        self.network.stop_node(&address);
        Some(address)
    }

    /// stop the node at `address`, returns `false` if it is unknown or
    /// already stopped
    pub fn stop(&self, address: &NodeAddress) -> bool {
        self.network.stop_node(address)
    }

    pub fn set_speed(&self, speed: f64) -> Result<(), ClockError> {
        self.network.set_speed(speed)
    }

    /// multiply the simulation speed by `factor`, returns the new speed
    pub fn adjust_speed(&self, factor: f64) -> Result<f64, ClockError> {
        self.network.adjust_speed(factor)
    }

    pub fn set_color(&self, address: &NodeAddress, color: Color) -> bool {
        self.network.set_color(address, color)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.network.snapshot()
    }

    pub fn stats(&self) -> NetworkStats {
        self.network.stats()
    }

    /// stop every node and the scheduler, then wait for all their threads
    pub fn shutdown(self) -> Result<()> {
        let Self {
            network,
            scheduler,
            nodes,
            ..
        } = self;

        network.stop();

        let mut panicked = Vec::new();
        for (address, handle) in nodes {
            if handle.join().is_err() {
                panicked.push(address);
            }
        }

        if scheduler.join().is_err() {
            bail!("Scheduler panicked");
        }

        if !panicked.is_empty() {
            let addresses: Vec<&str> = panicked.iter().map(NodeAddress::as_str).collect();
            bail!("Node(s) panicked: {}", addresses.join(", "));
        }

        debug!("simulation shut down");
        Ok(())
    }
}

impl<T> SimContext<T>
where
    T: Data + From<Vec<u8>>,
{
    /// register a [`ProbeNode`] and start it
    pub fn add_probe_node(&mut self, settings: NodeConfig, config: ProbeConfig) -> Result<(), AddNodeError> {
        self.add_node(settings, ProbeNode::new(config))
    }

    /// add a [`ProbeNode`] with generated parameters.
    ///
    /// Nodes are named `Node-<n>` and laid out on a ring. Once more than
    /// three nodes exist, a new node starts with three random targets
    /// (possibly fewer if the draws repeat). It probes every `0.1s` to
    /// `1.1s` with `10` bytes, at the default node rate.
    pub fn spawn_probe_node(&mut self) -> Result<NodeAddress, AddNodeError> {
        let position = Position::on_ring(RING_CENTER, RING_RADIUS, self.nodes.len(), RING_SLOTS);

        let targets = if self.nodes.len() > INITIAL_TARGETS {
            (0..INITIAL_TARGETS)
                .filter_map(|_| self.network.random_node())
                .collect()
        } else {
            Vec::new()
        };
        let wait = MIN_PROBE_WAIT + self.network.with_rng(random::unit);
        let config = ProbeConfig {
            targets,
            wait: Duration::from_secs_f64(wait),
            size: PROBE_SIZE,
        };

        loop {
            let address = NodeAddress::new(format!("Node-{}", self.spawned));
            self.spawned += 1;

            let settings = NodeConfig::new(address.clone()).set_position(position);
            match self.add_probe_node(settings, config.clone()) {
                Ok(()) => return Ok(address),
                // taken by a node added by hand, try the next name
                Err(AddNodeError::AddressInUse(_)) => continue,
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::testing::{Idle, Recorder, eventually};
    use crate::sync::lock;
    use p2psim_core::PacketLoss;
    use std::{
        sync::{Arc, Mutex},
        thread,
    };

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn lossless() -> SimConfiguration {
        SimConfiguration::default().set_packet_loss(PacketLoss::NONE)
    }

    fn addr(name: &str) -> NodeAddress {
        NodeAddress::new(name)
    }

    #[test]
    fn start_and_shutdown() {
        let context = SimContext::<Vec<u8>>::new(SimConfiguration::default()).unwrap();
        context.shutdown().unwrap();
    }

    #[test]
    fn spawned_nodes_are_named_and_placed() {
        let mut context = SimContext::<Vec<u8>>::new(lossless()).unwrap();

        for expected in ["Node-0", "Node-1", "Node-2"] {
            assert_eq!(context.spawn_probe_node().unwrap(), addr(expected));
        }

        let snapshot = context.snapshot();
        let first = snapshot.node(&addr("Node-0")).unwrap();
        assert_eq!(first.position, Position::new(300.0, 500.0));
        assert_eq!(snapshot.running_nodes().count(), 3);

        context.shutdown().unwrap();
    }

    #[test]
    fn spawned_names_skip_taken_addresses() {
        let mut context = SimContext::<Vec<u8>>::new(lossless()).unwrap();

        context.add_node(NodeConfig::new("Node-0"), Idle).unwrap();
        assert_eq!(context.spawn_probe_node().unwrap(), addr("Node-1"));

        context.shutdown().unwrap();
    }

    #[test]
    fn probe_nodes_talk_to_each_other() {
        let mut context = SimContext::<Vec<u8>>::new(lossless()).unwrap();
        context.set_speed(10.0).unwrap();

        for _ in 0..6 {
            context.spawn_probe_node().unwrap();
        }

        assert!(eventually(TIMEOUT, || context.stats().delivered > 0));
        context.shutdown().unwrap();
    }

    #[test]
    fn remove_node_stops_most_recent_first() {
        let mut context = SimContext::<Vec<u8>>::new(lossless()).unwrap();
        for name in ["a", "b", "c"] {
            context.add_node(NodeConfig::new(name), Idle).unwrap();
        }

        assert!(context.stop(&addr("c")));
        assert_eq!(context.remove_node(), Some(addr("b")));
        assert_eq!(context.remove_node(), Some(addr("a")));
        assert_eq!(context.remove_node(), None);
        assert_eq!(context.snapshot().running_nodes().count(), 0);

        context.shutdown().unwrap();
    }

    #[test]
    fn stopped_node_goes_silent() {
        let mut context = SimContext::<Vec<u8>>::new(lossless()).unwrap();
        context.set_speed(10.0).unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));

        context
            .add_node(NodeConfig::new("b"), Recorder(Arc::clone(&received)))
            .unwrap();
        context
            .add_probe_node(
                NodeConfig::new("a"),
                ProbeConfig {
                    targets: vec![addr("b")],
                    wait: Duration::from_millis(100),
                    size: 10,
                },
            )
            .unwrap();

        assert!(eventually(TIMEOUT, || !lock(&received).is_empty()));

        assert!(context.stop(&addr("a")));
        thread::sleep(Duration::from_millis(50));
        let scheduled = context.stats().scheduled;
        thread::sleep(Duration::from_millis(200));
        assert_eq!(context.stats().scheduled, scheduled);

        context.shutdown().unwrap();
    }

    #[test]
    fn pause_freezes_time() {
        let context = SimContext::<Vec<u8>>::new(lossless()).unwrap();

        context.set_speed(0.0).unwrap();
        let frozen = context.snapshot().time;
        thread::sleep(Duration::from_millis(20));
        assert_eq!(context.snapshot().time, frozen);

        assert_eq!(context.adjust_speed(2.0).unwrap(), 0.0);
        assert!(context.set_speed(-1.0).is_err());

        context.shutdown().unwrap();
    }

    #[test]
    fn set_color_is_visible_in_snapshots() {
        let mut context = SimContext::<Vec<u8>>::new(lossless()).unwrap();
        context.add_node(NodeConfig::new("a"), Idle).unwrap();

        let red = Color::new(255, 0, 0);
        assert!(context.set_color(&addr("a"), red));
        assert_eq!(context.snapshot().node(&addr("a")).unwrap().color, red);

        context.shutdown().unwrap();
    }
}
