use super::{Behavior, NodeIo};
use p2psim_core::{Data, NodeAddress, SimTime};
use std::{collections::HashMap, time::Duration};

/// A target silent for longer than this many probe intervals is evicted.
pub const SILENCE_FACTOR: f64 = 30.0;

/// Parameters of a [`ProbeNode`].
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub targets: Vec<NodeAddress>,
    /// interval between two probes
    pub wait: Duration,
    /// size of a probe, in bytes
    pub size: usize,
}

/// Reference behavior: probes its targets round robin and learns new
/// targets from whoever talks to it.
///
/// Every `wait`, the node sends `size` zeroed bytes to the next target. A
/// target that has not been heard of for more than [`SILENCE_FACTOR`]
/// probe intervals is evicted instead of probed. A target is granted that
/// grace period from the first time it is probed, even if it never
/// answers.
pub struct ProbeNode {
    targets: Vec<NodeAddress>,
    last_contact: HashMap<NodeAddress, SimTime>,
    cursor: usize,
    wait: Duration,
    size: usize,
    last_probe: Option<SimTime>,
}

impl ProbeNode {
    pub fn new(config: ProbeConfig) -> Self {
        let mut targets: Vec<NodeAddress> = Vec::with_capacity(config.targets.len());
        for target in config.targets {
            if !targets.contains(&target) {
                targets.push(target);
            }
        }

        Self {
            targets,
            last_contact: HashMap::new(),
            cursor: 0,
            wait: config.wait,
            size: config.size,
            last_probe: None,
        }
    }

    pub fn targets(&self) -> &[NodeAddress] {
        &self.targets
    }

    fn silence_limit(&self) -> f64 {
        SILENCE_FACTOR * self.wait.as_secs_f64()
    }

    fn probe_due(&self, now: SimTime) -> bool {
        self.last_probe
            .is_none_or(|last| now.secs_since(last) >= self.wait.as_secs_f64())
    }

    fn probe<T, Io>(&mut self, io: &mut Io, now: SimTime)
    where
        T: From<Vec<u8>>,
        Io: NodeIo<T>,
    {
        self.last_probe = Some(now);

        if self.cursor >= self.targets.len() {
            self.cursor = 0;
        }
        let Some(target) = self.targets.get(self.cursor).cloned() else {
            return;
        };

        let last_contact = *self.last_contact.entry(target.clone()).or_insert(now);
        if now.secs_since(last_contact) > self.silence_limit() {
            // the cursor now points at the following target
            self.targets.remove(self.cursor);
            self.last_contact.remove(&target);
        } else {
            io.send(&target, T::from(vec![0; self.size]));
            self.cursor += 1;
        }
    }

    fn learn<T, Io>(&mut self, io: &mut Io, now: SimTime)
    where
        Io: NodeIo<T>,
    {
        while let Some(message) = io.try_recv() {
            let (from, _payload) = message.into_inner();
            if &from == io.address() {
                continue;
            }
            if !self.targets.contains(&from) {
                self.targets.push(from.clone());
            }
            self.last_contact.insert(from, now);
        }
    }
}

impl<T> Behavior<T> for ProbeNode
where
    T: Data + From<Vec<u8>>,
{
    fn step<Io: NodeIo<T>>(&mut self, io: &mut Io) {
        let now = io.now();

        if self.probe_due(now) {
            self.probe::<T, Io>(io, now);
        }

        self.learn::<T, Io>(io, now);
    }
}
