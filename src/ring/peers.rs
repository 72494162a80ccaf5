use std::fmt;

/// NodeAddr is the full address a node is reachable at, e.g. `http://10.0.0.7:5000`. It is
/// both the node's identity in the ring and the target of outbound calls.
#[derive(Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct NodeAddr(String);

impl NodeAddr {
    pub fn new(addr: impl Into<String>) -> Self {
        NodeAddr(addr.into())
    }

    /// Wire form of an optional address: empty string means "none".
    pub(crate) fn from_wire(addr: String) -> Option<Self> {
        if addr.is_empty() {
            None
        } else {
            Some(NodeAddr(addr))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NodeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeAddr {
    fn from(addr: &str) -> Self {
        NodeAddr::new(addr)
    }
}
