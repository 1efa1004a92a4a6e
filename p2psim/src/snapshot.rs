//! Read-only views of the running simulation, for renderers and drivers.
//!
//! Obtain them via [`SimContext::snapshot`] and [`SimContext::stats`].
//!
//! [`SimContext::snapshot`]: crate::SimContext::snapshot
//! [`SimContext::stats`]: crate::SimContext::stats

use p2psim_core::{Color, Latency, LinkId, NodeAddress, Position, SimTime};

/// State of the whole network at a given simulated time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub time: SimTime,
    pub links: Vec<LinkView>,
    pub nodes: Vec<NodeView>,
    /// in-flight transmissions, earliest arrival first
    pub transmissions: Vec<TransmissionView>,
}

#[derive(Debug, Clone)]
pub struct LinkView {
    pub id: LinkId,
    pub latency: Latency,
    /// token level of the link's bucket at the snapshot time, may be
    /// negative while the link is congested
    pub tokens: f64,
    pub capacity: f64,
    /// a transmission arrived over the link in the recent activity window
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct NodeView {
    pub address: NodeAddress,
    pub position: Position,
    pub color: Color,
    pub tokens: f64,
    pub capacity: f64,
    /// `false` once the node is stopped, renderers should hide it
    pub running: bool,
    /// seconds added to the network time to get the node's local time
    pub clock_offset: f64,
}

#[derive(Debug, Clone)]
pub struct TransmissionView {
    pub from: NodeAddress,
    pub to: NodeAddress,
    pub sent: SimTime,
    pub arrival: SimTime,
    /// fraction of the trip done, in `[0, 1]`
    pub progress: f64,
    /// the transmission will be lost on arrival
    pub dropped: bool,
}

/// Delivery counters of a network, since its creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkStats {
    /// transmissions put in flight
    pub scheduled: u64,
    /// transmissions handed to their recipient
    pub delivered: u64,
    /// transmissions lost to packet loss
    pub dropped: u64,
    /// transmissions whose recipient was gone or stopped on arrival
    pub discarded: u64,
    /// transmissions still in flight
    pub in_flight: u64,
}

impl Snapshot {
    pub fn node(&self, address: &NodeAddress) -> Option<&NodeView> {
        self.nodes.iter().find(|node| &node.address == address)
    }

    pub fn link(&self, id: &LinkId) -> Option<&LinkView> {
        self.links.iter().find(|link| &link.id == id)
    }

    /// the nodes still running
    pub fn running_nodes(&self) -> impl Iterator<Item = &NodeView> {
        self.nodes.iter().filter(|node| node.running)
    }
}

impl NetworkStats {
    /// transmissions that reached the end of their trip, whatever happened
    /// to them
    pub fn completed(&self) -> u64 {
        self.delivered + self.dropped + self.discarded
    }
}
