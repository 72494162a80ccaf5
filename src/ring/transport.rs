use crate::ring::heartbeat::HeartbeatProbe;
use crate::ring::membership::LeaveNotice;
use crate::ring::message_log::LogEntry;
use crate::ring::peers::NodeAddr;
use crate::ring::ring_api::RingMessage;

/// RingTransport is how a node reaches the equivalent endpoints of another node. Every call is a
/// single attempt; the node applies its own per-call deadline around it.
#[async_trait::async_trait]
pub(crate) trait RingTransport: Send + Sync + 'static {
    /// Ask `target` to splice `joiner` in after itself. Returns the follower `joiner` must adopt.
    async fn join(&self, target: &NodeAddr, joiner: &NodeAddr) -> Result<NodeAddr, TransportError>;

    async fn leave(&self, target: &NodeAddr, notice: LeaveNotice) -> Result<(), TransportError>;

    async fn deliver(&self, target: &NodeAddr, message: RingMessage) -> Result<(), TransportError>;

    async fn fetch_log(&self, target: &NodeAddr) -> Result<Vec<LogEntry>, TransportError>;

    async fn heartbeat(&self, target: &NodeAddr, probe: HeartbeatProbe) -> Result<(), TransportError>;
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("timed out calling {0}")]
    Timeout(NodeAddr),
    #[error("cannot connect to {addr}: {reason}")]
    ConnectionFailed { addr: NodeAddr, reason: String },
    #[error("{addr} rejected the call: {reason}")]
    Rejected { addr: NodeAddr, reason: String },
    #[error("malformed response from {addr}: {reason}")]
    MalformedResponse { addr: NodeAddr, reason: String },
}
