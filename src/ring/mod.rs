mod election;
mod heartbeat;
mod membership;
mod message_log;
mod node;
mod node_wiring;
mod observers;
mod peer_client;
mod peers;
mod ring_api;
mod transport;
mod wire;

#[cfg(test)]
mod test_utils;

pub use election::ElectionError;
pub use election::Uid;
pub use heartbeat::HeartbeatProbe;
pub use membership::LeaveNotice;
pub use message_log::LogEntry;
pub use message_log::Payload;
pub use message_log::SeqId;
pub use observers::NodeEvent;
pub use observers::NodeSnapshot;
pub use peers::NodeAddr;
pub use ring_api::ConnectError;
pub use ring_api::JoinError;
pub use ring_api::LeaveError;
pub use ring_api::RingMessage;
pub use ring_api::SubmitError;
pub use transport::TransportError;

pub(crate) use node::Node;
pub(crate) use node_wiring::create_node;
pub(crate) use node_wiring::NodeTimings;
pub(crate) use observers::EventReceiver;
pub(crate) use observers::SnapshotListener;
pub(crate) use transport::RingTransport;
pub(crate) use wire::{
    decode_heartbeat, decode_host, decode_leave, decode_message, encode_log_entry, Malformed,
};
