use crate::actor::ActorClient;
use crate::ring::{ConnectError, ElectionError, LeaveError, LogEntry, NodeAddr, Payload, SubmitError};
use crate::ActorExited;
use bytes::Bytes;

/// RingHandle is how the application drives its local node. Clones share the node; the node
/// shuts down once every handle is dropped.
#[derive(Clone)]
pub struct RingHandle {
    actor_client: ActorClient,
}

impl RingHandle {
    pub(super) fn new(actor_client: ActorClient) -> Self {
        RingHandle { actor_client }
    }

    /// Join the ring `target` is a member of. The node must not be in a ring already.
    pub async fn connect(&self, target: impl Into<NodeAddr>) -> Result<(), ConnectError> {
        self.actor_client.connect(target.into()).await
    }

    /// Start leaving the ring. Returns once the notice is on its way; the node resets itself
    /// when the notice comes back around.
    pub async fn leave(&self) -> Result<(), LeaveError> {
        self.actor_client.leave().await
    }

    /// Hand application data to the ring for sequencing by the leader.
    pub async fn submit(&self, data: Bytes) -> Result<(), SubmitError> {
        self.actor_client.submit(Payload::Data(data)).await
    }

    pub async fn announce(&self, text: impl Into<String>) -> Result<(), SubmitError> {
        self.actor_client.submit(Payload::Control(text.into())).await
    }

    /// Wipe the replicated log on every node.
    pub async fn clean(&self) -> Result<(), SubmitError> {
        self.actor_client.submit(Payload::Clean).await
    }

    pub async fn start_election(&self) -> Result<(), ElectionError> {
        self.actor_client.start_election().await
    }

    /// The local copy of the replicated log, in id order.
    pub async fn read_log(&self) -> Result<Vec<LogEntry>, ActorExited> {
        self.actor_client.fetch_log().await
    }
}
