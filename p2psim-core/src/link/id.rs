use crate::node::NodeAddress;
use std::fmt;

/// Unique identifier of the directed link between two nodes
///
/// Links are one-way: `(a, b)` and `(b, a)` are two different links, each
/// with its own latency and bandwidth.
///
/// ```
/// # use p2psim_core::{link::LinkId, node::NodeAddress};
/// let a = NodeAddress::new("a");
/// let b = NodeAddress::new("b");
///
/// assert_ne!(LinkId::new(a.clone(), b.clone()), LinkId::new(b.clone(), a.clone()));
/// assert_eq!(LinkId::new(a, b).to_string(), "a-b");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkId {
    from: NodeAddress,
    to: NodeAddress,
}

impl LinkId {
    pub fn new(from: NodeAddress, to: NodeAddress) -> Self {
        Self { from, to }
    }

    #[inline]
    pub fn from(&self) -> &NodeAddress {
        &self.from
    }

    #[inline]
    pub fn to(&self) -> &NodeAddress {
        &self.to
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directional() {
        let ab = LinkId::new("a".into(), "b".into());
        let ba = LinkId::new("b".into(), "a".into());

        assert_ne!(ab, ba);
        assert_eq!(LinkId::new(ab.to().clone(), ab.from().clone()), ba);
        assert_eq!(ab.from().as_str(), "a");
        assert_eq!(ab.to().as_str(), "b");
    }
}
