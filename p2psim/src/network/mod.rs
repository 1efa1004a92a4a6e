mod scheduler;

pub use self::scheduler::SCHEDULER_TICK;
pub(crate) use self::scheduler::spawn_scheduler;
use crate::{
    node::{self, Behavior, NodeContext, NodeEntry, NodeConfig},
    snapshot::{LinkView, NetworkStats, NodeView, Snapshot, TransmissionView},
    stop::Stop,
    sync::{lock, read, write},
};
use p2psim_core::{
    Clock, Color, ConfigError, Data, FlowLimiter, Latency, Link, LinkId, NodeAddress, Rate,
    SimConfiguration, SimTime, TimeQueue, Transmission,
    clock::ClockError,
    node::UNREACHABLE_DISTANCE,
    random,
};
use rand_chacha::ChaChaRng;
use rand_core::SeedableRng as _;
use std::{
    collections::BTreeMap,
    io,
    sync::{
        Arc, Mutex, RwLock,
        atomic::{AtomicU64, Ordering},
        mpsc,
    },
    thread::{self, JoinHandle},
};
use thiserror::Error;
use tracing::{debug, trace};

type Nodes<T> = RwLock<BTreeMap<NodeAddress, Arc<NodeEntry<T>>>>;
type Links = RwLock<BTreeMap<LinkId, Arc<Mutex<Link>>>>;

/// The simulated overlay: nodes, directed links and in-flight
/// transmissions.
///
/// A `Network` is a cheap handle, clones share the same state. Every
/// operation is safe to call from any thread.
///
/// Lock order, whenever more than one is held: nodes, links, a link,
/// a node's bucket, the random generator, the in-flight queue.
pub struct Network<T> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    configuration: SimConfiguration,
    clock: Clock,

    nodes: Nodes<T>,
    links: Links,
    transit: Mutex<TimeQueue<T>>,

    rng: Mutex<ChaChaRng>,
    stop: Stop,

    counters: Counters,
}

#[derive(Default)]
struct Counters {
    scheduled: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
    discarded: AtomicU64,
}

#[derive(Debug, Error)]
pub enum AddNodeError {
    #[error("A node is already registered at address {0}")]
    AddressInUse(NodeAddress),
    #[error("Failed to spawn the thread of node {address}")]
    Spawn {
        address: NodeAddress,
        #[source]
        source: io::Error,
    },
}

/// Builder for the link from one node to another.
///
/// Obtained via [`Network::configure_link`]. Call [`LinkBuilder::apply`] to
/// commit the configuration, replacing any link already in place for that
/// direction. The other direction is left untouched.
pub struct LinkBuilder<'a, T> {
    id: LinkId,
    latency: Latency,
    rate: Rate,
    network: &'a Network<T>,
}

impl<T> Clone for Network<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> LinkBuilder<'_, T>
where
    T: Data,
{
    pub fn set_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    pub fn set_rate(mut self, rate: Rate) -> Self {
        self.rate = rate;
        self
    }

    pub fn apply(self) {
        let Self {
            id,
            latency,
            rate,
            network,
        } = self;
        let configuration = network.configuration();

        let limiter = FlowLimiter::with_burst(rate, configuration.burst, network.now());
        let link = Link::new(latency, limiter);

        debug!(link = %id, %latency, %rate, "link configured");
        write(&network.shared.links).insert(id, Arc::new(Mutex::new(link)));
    }
}

impl<T> Network<T>
where
    T: Data,
{
    /// create a network running on the system clock
    pub fn new(configuration: SimConfiguration) -> Result<Self, ConfigError> {
        Self::with_clock(configuration, Clock::new())
    }

    pub fn with_clock(configuration: SimConfiguration, clock: Clock) -> Result<Self, ConfigError> {
        configuration.validate()?;

        let rng = ChaChaRng::seed_from_u64(configuration.seed);

        Ok(Self {
            shared: Arc::new(Shared {
                configuration,
                clock,
                nodes: RwLock::new(BTreeMap::new()),
                links: RwLock::new(BTreeMap::new()),
                transit: Mutex::new(TimeQueue::new()),
                rng: Mutex::new(rng),
                stop: Stop::new(),
                counters: Counters::default(),
            }),
        })
    }

    #[inline]
    pub fn configuration(&self) -> &SimConfiguration {
        &self.shared.configuration
    }

    #[inline]
    pub fn clock(&self) -> &Clock {
        &self.shared.clock
    }

    /// the simulated time of the network
    #[inline]
    pub fn now(&self) -> SimTime {
        self.shared.clock.now()
    }

    pub fn set_speed(&self, speed: f64) -> Result<(), ClockError> {
        self.shared.clock.set_speed(speed)
    }

    pub fn adjust_speed(&self, factor: f64) -> Result<f64, ClockError> {
        self.shared.clock.adjust_speed(factor)
    }

    pub(crate) fn with_rng<R>(&self, f: impl FnOnce(&mut ChaChaRng) -> R) -> R {
        f(&mut lock(&self.shared.rng))
    }

    fn node(&self, address: &NodeAddress) -> Option<Arc<NodeEntry<T>>> {
        read(&self.shared.nodes).get(address).cloned()
    }

    /// register a node and start its thread.
    ///
    /// The node is reachable as soon as this function returns. It starts
    /// with a full inbound bucket and a clock offset drawn uniformly within
    /// the configured desynchronisation.
    pub fn add_node<B>(&self, settings: NodeConfig, behavior: B) -> Result<JoinHandle<()>, AddNodeError>
    where
        B: Behavior<T>,
    {
        let configuration = self.configuration();
        let address = settings.address().clone();

        let rate = settings.rate.unwrap_or(configuration.node_rate);
        let limiter = FlowLimiter::with_burst(rate, configuration.burst, self.now());
        let desync = configuration.clock_desync;
        let clock_offset = self.with_rng(|rng| random::uniform(rng, -desync, desync));

        let (inbox, receiver) = mpsc::channel();
        let entry = NodeEntry::new(settings, limiter, clock_offset, inbox);

        {
            let mut nodes = write(&self.shared.nodes);
            if nodes.contains_key(&address) {
                return Err(AddNodeError::AddressInUse(address));
            }
            nodes.insert(address.clone(), Arc::new(entry));
        }

        let context = NodeContext::new(self.clone(), address.clone(), clock_offset, receiver);
        let spawned = thread::Builder::new()
            .name(format!("p2psim-{address}"))
            .spawn(move || node::run(behavior, context));

        match spawned {
            Ok(handle) => {
                debug!(%address, %rate, clock_offset, "node added");
                Ok(handle)
            }
            Err(source) => {
                write(&self.shared.nodes).remove(&address);
                Err(AddNodeError::Spawn { address, source })
            }
        }
    }

    /// `true` while neither the node nor the network is stopped
    pub fn is_node_running(&self, address: &NodeAddress) -> bool {
        !self.is_stopped() && self.node(address).is_some_and(|node| !node.is_stopped())
    }

    /// stop a node, returns `false` if it is unknown or already stopped.
    ///
    /// The node stays registered: its address cannot be reused.
    pub fn stop_node(&self, address: &NodeAddress) -> bool {
        let stopped = self.node(address).is_some_and(|node| node.stop());
        if stopped {
            debug!(%address, "node stopped");
        }
        stopped
    }

    /// returns `false` if the node is unknown
    pub fn set_color(&self, address: &NodeAddress, color: Color) -> bool {
        let Some(node) = self.node(address) else {
            return false;
        };
        node.set_color(color);
        true
    }

    /// a registered address picked uniformly, `None` if there is none
    pub fn random_node(&self) -> Option<NodeAddress> {
        let nodes = read(&self.shared.nodes);
        let index = self.with_rng(|rng| random::index(rng, nodes.len()))?;
        nodes.keys().nth(index).cloned()
    }

    /// Euclidean distance between two nodes, [`UNREACHABLE_DISTANCE`] if
    /// either is unknown.
    pub fn distance(&self, from: &NodeAddress, to: &NodeAddress) -> f64 {
        let nodes = read(&self.shared.nodes);
        match (nodes.get(from), nodes.get(to)) {
            (Some(from), Some(to)) => from.position().distance(&to.position()),
            _ => UNREACHABLE_DISTANCE,
        }
    }

    /// configure the link from `from` to `to`.
    ///
    /// Defaults to the latency the link would get if created on first use,
    /// without the random part, and to the configured link rate.
    pub fn configure_link(&self, from: NodeAddress, to: NodeAddress) -> LinkBuilder<'_, T> {
        let latency = Latency::from_secs_f64(
            self.configuration().latency_per_distance * self.distance(&from, &to),
        );

        LinkBuilder {
            id: LinkId::new(from, to),
            latency,
            rate: self.configuration().link_rate,
            network: self,
        }
    }

    fn link(&self, id: &LinkId) -> Arc<Mutex<Link>> {
        if let Some(link) = read(&self.shared.links).get(id) {
            return Arc::clone(link);
        }

        let distance = self.distance(id.from(), id.to());

        let mut links = write(&self.shared.links);
        let link = links.entry(id.clone()).or_insert_with(|| {
            let configuration = self.configuration();
            let jitter = self.with_rng(|rng| {
                random::uniform(rng, 0.0, configuration.max_random_latency.as_secs_f64())
            });
            let latency =
                Latency::from_secs_f64(configuration.latency_per_distance * distance + jitter);
            let limiter =
                FlowLimiter::with_burst(configuration.link_rate, configuration.burst, self.now());

            debug!(link = %id, %latency, "link created");
            Arc::new(Mutex::new(Link::new(latency, limiter)))
        });
        Arc::clone(link)
    }

    /// schedule the delivery of `payload` from `from` to `to`.
    ///
    /// Silently does nothing if either node is unknown or stopped. The
    /// arrival time is the latest of the link's and the recipient's
    /// bucket constraints. Packet loss is decided now but the lost
    /// transmission stays in flight until its arrival time.
    pub fn send(&self, from: &NodeAddress, to: &NodeAddress, payload: T) {
        if self.is_stopped() {
            return;
        }

        let (source, target) = {
            let nodes = read(&self.shared.nodes);
            match (nodes.get(from), nodes.get(to)) {
                (Some(source), Some(target)) => (Arc::clone(source), Arc::clone(target)),
                _ => return,
            }
        };
        if source.is_stopped() || target.is_stopped() {
            return;
        }

        let link = self.link(&LinkId::new(from.clone(), to.clone()));

        let now = self.now();
        let size = payload.bytes_size();

        let link_arrival = lock(&link).schedule_send(size, now);
        let node_arrival = target.reserve(size, now);
        let arrival = link_arrival.max(node_arrival);

        let packet_loss = self.configuration().packet_loss;
        let dropped = self.with_rng(|rng| packet_loss.should_drop(rng));

        trace!(%from, %to, size, sent = %now, %arrival, dropped, "transmission scheduled");

        lock(&self.shared.transit).push(Transmission::new(
            from.clone(),
            to.clone(),
            payload,
            now,
            arrival,
            dropped,
        ));
        self.shared
            .counters
            .scheduled
            .fetch_add(1, Ordering::Relaxed);
    }

    /// hand every transmission due by now to its recipient, returns the
    /// number of transmissions taken out of flight
    pub(crate) fn deliver_due(&self) -> usize {
        let now = self.now();
        let due = lock(&self.shared.transit).pop_all_elapsed(now);
        let count = due.len();

        for transmission in due {
            let counter = if transmission.is_dropped() {
                &self.shared.counters.dropped
            } else if self.deliver(transmission) {
                &self.shared.counters.delivered
            } else {
                &self.shared.counters.discarded
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }

        count
    }

    fn deliver(&self, transmission: Transmission<T>) -> bool {
        let Some(target) = self.node(transmission.to()) else {
            return false;
        };
        if target.is_stopped() {
            return false;
        }

        target.receive(transmission.into_message())
    }

    /// stop the network: no new transmission is scheduled and every loop
    /// (nodes and scheduler) exits on its next iteration
    pub fn stop(&self) {
        if self.shared.stop.toggle() {
            debug!("network stopped");
        }
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.shared.stop.get()
    }

    pub fn snapshot(&self) -> Snapshot {
        let time = self.now();
        let window = self.configuration().activity_window;
        let network_running = !self.is_stopped();

        let nodes = read(&self.shared.nodes)
            .values()
            .map(|node| {
                let (tokens, capacity) = node.flow(time);
                NodeView {
                    address: node.address().clone(),
                    position: node.position(),
                    color: node.color(),
                    tokens,
                    capacity,
                    running: network_running && !node.is_stopped(),
                    clock_offset: node.clock_offset(),
                }
            })
            .collect();

        let links = read(&self.shared.links)
            .iter()
            .map(|(id, link)| {
                let link = lock(link);
                LinkView {
                    id: id.clone(),
                    latency: link.latency(),
                    tokens: link.limiter().tokens_at(time),
                    capacity: link.limiter().capacity(),
                    active: link.is_active(time, window),
                }
            })
            .collect();

        let mut transmissions: Vec<TransmissionView> = lock(&self.shared.transit)
            .iter()
            .map(|transmission| TransmissionView {
                from: transmission.from().clone(),
                to: transmission.to().clone(),
                sent: transmission.sent(),
                arrival: transmission.arrival(),
                progress: transmission.progress(time),
                dropped: transmission.is_dropped(),
            })
            .collect();
        transmissions.sort_by_key(|transmission| transmission.arrival);

        Snapshot {
            time,
            links,
            nodes,
            transmissions,
        }
    }

    pub fn stats(&self) -> NetworkStats {
        let counters = &self.shared.counters;
        NetworkStats {
            scheduled: counters.scheduled.load(Ordering::Relaxed),
            delivered: counters.delivered.load(Ordering::Relaxed),
            dropped: counters.dropped.load(Ordering::Relaxed),
            discarded: counters.discarded.load(Ordering::Relaxed),
            in_flight: lock(&self.shared.transit).len() as u64,
        }
    }
}
