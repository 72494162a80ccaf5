mod actor;
mod api;
mod ring;
mod server;
mod grpc {
    include!("../generated/ring.rs");
}

pub use actor::ActorExited;
pub use api::try_create_ring_node;
pub use api::RingEventStream;
pub use api::RingHandle;
pub use api::RingNode;
pub use api::RingNodeConfig;
pub use api::RingNodeCreationError;
pub use api::RingOptions;
pub use api::RingStateListener;
pub use ring::ConnectError;
pub use ring::ElectionError;
pub use ring::LeaveError;
pub use ring::LogEntry;
pub use ring::NodeAddr;
pub use ring::NodeEvent;
pub use ring::NodeSnapshot;
pub use ring::Payload;
pub use ring::SeqId;
pub use ring::SubmitError;
pub use ring::TransportError;
pub use ring::Uid;

