mod probe;

pub use self::probe::{ProbeConfig, ProbeNode, SILENCE_FACTOR};
use crate::{
    network::Network,
    stop::Stop,
    sync::lock,
};
use p2psim_core::{
    Color, Data, FlowLimiter, Message, NodeAddress, Position, Rate, SimTime,
};
use std::{
    sync::{
        Mutex,
        mpsc::{Receiver, Sender, TryRecvError},
    },
    thread,
    time::Duration,
};
use tracing::debug;

/// Pause between two iterations of a node's loop, in wall-clock time.
pub const NODE_TICK: Duration = Duration::from_millis(2);

/// What a node does, one loop iteration at a time.
///
/// The node core (address, inbound bucket, inbox, lifecycle) is the same
/// for every node; the behavior is the pluggable part. [`step`] is called
/// repeatedly from the node's own thread, with a short sleep in between,
/// until the node is stopped.
///
/// [`step`]: Behavior::step
pub trait Behavior<T>: Send + 'static {
    fn step<Io: NodeIo<T>>(&mut self, io: &mut Io);
}

/// The view a [`Behavior`] has of its node and of the network.
pub trait NodeIo<T> {
    fn address(&self) -> &NodeAddress;

    /// the node's local time: the network time plus the node's clock offset
    fn now(&self) -> SimTime;

    /// schedule `payload` for delivery to `to`.
    ///
    /// Never fails: an unknown or stopped recipient silently swallows it.
    fn send(&mut self, to: &NodeAddress, payload: T);

    /// the next delivered message, if any
    fn try_recv(&mut self) -> Option<Message<T>>;
}

/// Parameters of a node to register with the [`Network`].
///
/// ```
/// # use p2psim::{NodeConfig, Position};
/// let settings = NodeConfig::new("Node-0")
///     .set_position(Position::new(300.0, 500.0))
///     .set_rate("20B/s".parse().unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub(crate) address: NodeAddress,
    pub(crate) position: Position,
    pub(crate) color: Color,
    pub(crate) rate: Option<Rate>,
}

/// Node state shared between the registry, the scheduler and the node's
/// own thread.
///
/// Entries are never removed from the registry: a stopped node stays there,
/// inert. It no longer sends nor receives and renderers hide it, but its
/// address stays taken for the lifetime of the network.
pub(crate) struct NodeEntry<T> {
    address: NodeAddress,
    position: Position,
    color: Mutex<Color>,
    clock_offset: f64,
    limiter: Mutex<FlowLimiter>,
    inbox: Sender<Message<T>>,
    stop: Stop,
}

/// [`NodeIo`] given to a behavior running in a node thread.
pub(crate) struct NodeContext<T> {
    network: Network<T>,
    address: NodeAddress,
    clock_offset: f64,
    inbox: Receiver<Message<T>>,
}

impl NodeConfig {
    pub fn new(address: impl Into<NodeAddress>) -> Self {
        Self {
            address: address.into(),
            position: Position::default(),
            color: Color::default(),
            rate: None,
        }
    }

    pub fn address(&self) -> &NodeAddress {
        &self.address
    }

    pub fn set_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn set_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// inbound rate of the node, the network's default node rate otherwise
    pub fn set_rate(mut self, rate: Rate) -> Self {
        self.rate = Some(rate);
        self
    }
}

impl<T> NodeEntry<T> {
    pub(crate) fn new(
        settings: NodeConfig,
        limiter: FlowLimiter,
        clock_offset: f64,
        inbox: Sender<Message<T>>,
    ) -> Self {
        Self {
            address: settings.address,
            position: settings.position,
            color: Mutex::new(settings.color),
            clock_offset,
            limiter: Mutex::new(limiter),
            inbox,
            stop: Stop::new(),
        }
    }

    #[inline]
    pub(crate) fn address(&self) -> &NodeAddress {
        &self.address
    }

    #[inline]
    pub(crate) fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub(crate) fn clock_offset(&self) -> f64 {
        self.clock_offset
    }

    pub(crate) fn color(&self) -> Color {
        *lock(&self.color)
    }

    pub(crate) fn set_color(&self, color: Color) {
        *lock(&self.color) = color;
    }

    #[inline]
    pub(crate) fn is_stopped(&self) -> bool {
        self.stop.get()
    }

    /// returns `true` if the node was running
    pub(crate) fn stop(&self) -> bool {
        self.stop.toggle()
    }

    /// account `size` inbound bytes, returns when the node can take them
    pub(crate) fn reserve(&self, size: u64, request_time: SimTime) -> SimTime {
        lock(&self.limiter).reserve(size, request_time)
    }

    /// `(tokens, capacity)` of the inbound bucket at `now`
    pub(crate) fn flow(&self, now: SimTime) -> (f64, f64) {
        let limiter = lock(&self.limiter);
        (limiter.tokens_at(now), limiter.capacity())
    }

    /// push a message into the inbox, `false` if the node's loop is gone
    pub(crate) fn receive(&self, message: Message<T>) -> bool {
        self.inbox.send(message).is_ok()
    }
}

impl<T> NodeContext<T>
where
    T: Data,
{
    pub(crate) fn new(
        network: Network<T>,
        address: NodeAddress,
        clock_offset: f64,
        inbox: Receiver<Message<T>>,
    ) -> Self {
        Self {
            network,
            address,
            clock_offset,
            inbox,
        }
    }

    fn is_running(&self) -> bool {
        self.network.is_node_running(&self.address)
    }
}

impl<T> NodeIo<T> for NodeContext<T>
where
    T: Data,
{
    fn address(&self) -> &NodeAddress {
        &self.address
    }

    fn now(&self) -> SimTime {
        self.network.now().offset(self.clock_offset)
    }

    fn send(&mut self, to: &NodeAddress, payload: T) {
        self.network.send(&self.address, to, payload);
    }

    fn try_recv(&mut self) -> Option<Message<T>> {
        match self.inbox.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

/// the loop of a node thread
pub(crate) fn run<T, B>(mut behavior: B, mut context: NodeContext<T>)
where
    T: Data,
    B: Behavior<T>,
{
    while context.is_running() {
        behavior.step(&mut context);

        thread::sleep(NODE_TICK);
    }

    debug!(address = %context.address, "node loop exited");
}

#[cfg(test)]
pub(crate) mod testing {
    //! behaviors and I/O doubles shared by the tests of this crate

    use super::*;
    use std::{
        collections::VecDeque,
        sync::Arc,
        time::Instant,
    };

    /// does nothing, forever
    pub(crate) struct Idle;

    impl<T> Behavior<T> for Idle {
        fn step<Io: NodeIo<T>>(&mut self, _io: &mut Io) {}
    }

    /// records every message it receives
    pub(crate) struct Recorder<T>(pub(crate) Arc<Mutex<Vec<Message<T>>>>);

    impl<T: Data> Behavior<T> for Recorder<T> {
        fn step<Io: NodeIo<T>>(&mut self, io: &mut Io) {
            while let Some(message) = io.try_recv() {
                lock(&self.0).push(message);
            }
        }
    }

    /// poll `condition` until it holds or `timeout` elapsed
    pub(crate) fn eventually(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    /// in-memory [`NodeIo`] driven by hand
    pub(crate) struct MockIo<T> {
        pub(crate) address: NodeAddress,
        pub(crate) now: SimTime,
        pub(crate) sent: Vec<(NodeAddress, T)>,
        pub(crate) inbox: VecDeque<Message<T>>,
    }

    impl<T> MockIo<T> {
        pub(crate) fn new(address: &str) -> Self {
            Self {
                address: NodeAddress::new(address),
                now: SimTime::ZERO,
                sent: Vec::new(),
                inbox: VecDeque::new(),
            }
        }

        pub(crate) fn at(&mut self, secs: f64) -> &mut Self {
            self.now = SimTime::from_secs_f64(secs);
            self
        }

        pub(crate) fn deliver(&mut self, from: &str, payload: T) {
            self.inbox
                .push_back(Message::new(NodeAddress::new(from), payload));
        }

        pub(crate) fn recipients(&self) -> Vec<&str> {
            self.sent.iter().map(|(to, _)| to.as_str()).collect()
        }
    }

    impl<T> NodeIo<T> for MockIo<T> {
        fn address(&self) -> &NodeAddress {
            &self.address
        }

        fn now(&self) -> SimTime {
            self.now
        }

        fn send(&mut self, to: &NodeAddress, payload: T) {
            self.sent.push((to.clone(), payload));
        }

        fn try_recv(&mut self) -> Option<Message<T>> {
            self.inbox.pop_front()
        }
    }
}
