use crate::actor::ActorExited;
use crate::ring::election::{ElectionMessage, Uid};
use crate::ring::message_log::{Payload, SeqId};
use crate::ring::peers::NodeAddr;
use crate::ring::transport::TransportError;

/// Everything that arrives at the messages endpoint.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RingMessage {
    Election { candidate: Uid },
    Elected { leader: Uid },
    Propagate(Propagation),
    Persistent(PersistentMessage),
}

/// A not yet sequenced payload on its way to the leader.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Propagation {
    /// Node that submitted the payload. If the relay gets back here, no one claimed leadership.
    pub origin: NodeAddr,
    pub payload: Payload,
}

/// A payload the leader has sequenced, replicating around the ring.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PersistentMessage {
    /// Uid of the sequencing leader. The wave stops when it gets back to this uid.
    pub origin: Uid,
    /// `SeqId::CLEAN` for `Payload::Clean`.
    pub id: SeqId,
    pub payload: Payload,
}

impl From<ElectionMessage> for RingMessage {
    fn from(message: ElectionMessage) -> Self {
        match message {
            ElectionMessage::Election { candidate } => RingMessage::Election { candidate },
            ElectionMessage::Elected { leader } => RingMessage::Elected { leader },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("already in a ring with follower {follower}, leave first")]
    AlreadyInRing { follower: NodeAddr },
    #[error("joining via {target} failed")]
    JoinFailed {
        target: NodeAddr,
        #[source]
        source: TransportError,
    },
    #[error("node task dispatcher has exited")]
    ActorExited,
}

#[derive(Debug, thiserror::Error)]
pub enum LeaveError {
    #[error("could not send leave notice")]
    Network(#[source] TransportError),
    #[error("node task dispatcher has exited")]
    ActorExited,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("node has no follower")]
    NotConnected,
    // Likely an election is in progress. One has been started if not.
    #[error("no leader known")]
    NoLeader,
    #[error("could not forward message")]
    Network(#[source] TransportError),
    #[error("node task dispatcher has exited")]
    ActorExited,
}

/// Errors the contacted node reports for a join request.
#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    #[error("a node can't join itself")]
    SelfJoin,
    #[error("{joiner} is already this node's follower")]
    AlreadyFollower { joiner: NodeAddr },
    #[error("node task dispatcher has exited")]
    ActorExited,
}

impl From<ActorExited> for ConnectError {
    fn from(_: ActorExited) -> Self {
        ConnectError::ActorExited
    }
}

impl From<ActorExited> for LeaveError {
    fn from(_: ActorExited) -> Self {
        LeaveError::ActorExited
    }
}

impl From<ActorExited> for SubmitError {
    fn from(_: ActorExited) -> Self {
        SubmitError::ActorExited
    }
}

impl From<ActorExited> for JoinError {
    fn from(_: ActorExited) -> Self {
        JoinError::ActorExited
    }
}
