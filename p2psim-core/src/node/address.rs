use std::{borrow::Borrow, fmt, sync::Arc};

/// The address of a node in the simulated overlay.
///
/// Addresses are free-form strings (e.g. `"Node-3"`) and are the unique key
/// of a node in the network registry. Cloning is cheap.
///
/// ```
/// # use p2psim_core::node::NodeAddress;
/// let address = NodeAddress::new("Node-3");
/// assert_eq!(address.to_string(), "Node-3");
/// assert_eq!(address, NodeAddress::from("Node-3"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeAddress(Arc<str>);

impl NodeAddress {
    pub fn new(address: impl AsRef<str>) -> Self {
        Self(Arc::from(address.as_ref()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeAddress {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeAddress {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl Borrow<str> for NodeAddress {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for NodeAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn print() {
        assert_eq!(format!("{}", NodeAddress::new("Node-42")), "Node-42");
    }

    #[test]
    fn lookup_by_str() {
        let mut map = BTreeMap::new();
        map.insert(NodeAddress::new("a"), 1);

        assert_eq!(map.get("a"), Some(&1));
        assert_eq!(map.get("b"), None);
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(NodeAddress::new("Node-1") < NodeAddress::new("Node-2"));
    }
}
