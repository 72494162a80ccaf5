use crate::actor::{ActorClient, NodeActor};
use crate::api::client::RingNode;
use crate::api::events::{RingEventStream, RingStateListener};
use crate::api::handle::RingHandle;
use crate::api::options::RingOptionsValidated;
use crate::ring::{self, NodeAddr, NodeTimings};
use crate::server::{self, RpcServer};
use crate::RingOptions;
use std::convert::TryFrom;
use std::net::SocketAddr;
use tonic::transport::Endpoint;

pub struct RingNodeConfig {
    /// Where the RPC server binds.
    pub listen_addr: SocketAddr,
    /// Full URL other nodes reach us at, e.g. `http://10.0.0.7:5000`. This is also our identity
    /// in the ring, so it must stay stable for as long as we're a member.
    pub advertised_addr: String,
    pub info_logger: slog::Logger,
    pub options: RingOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum RingNodeCreationError {
    #[error("Illegal options for configuring node: {0}")]
    IllegalOptions(String),
    #[error("Advertised address '{addr}' is not a valid URL: {reason}")]
    InvalidAdvertisedAddr { addr: String, reason: String },
}

/// `try_create_ring_node()` starts a node that is alone in its own ring. Call
/// `RingHandle::connect()` to join others.
pub async fn try_create_ring_node(config: RingNodeConfig) -> Result<RingNode, RingNodeCreationError> {
    let me = validate_advertised_addr(config.advertised_addr)?;
    let root_logger = config.info_logger.new(slog::o!("Node" => me.to_string()));

    let options = RingOptionsValidated::try_from(config.options)
        .map_err(|e| RingNodeCreationError::IllegalOptions(e.to_string()))?;

    let (actor_client, actor_queue_rx) = ActorClient::new(options.queue_capacity);
    let (server_shutdown_handle, server_shutdown_signal) = server::shutdown_signal();

    let (node, snapshot_listener, event_receiver) = ring::create_node(
        root_logger.clone(),
        me,
        NodeTimings {
            heartbeat_interval: options.heartbeat_interval,
            heartbeat_tolerance: options.heartbeat_tolerance,
            call_timeout: options.call_timeout,
        },
        options.max_uid_redraws,
        server_shutdown_handle,
        actor_client.weak(),
    );

    let node_actor = NodeActor::new(root_logger.clone(), actor_queue_rx, node);
    tokio::spawn(node_actor.run_event_loop());

    let rpc_server = RpcServer::new(root_logger, actor_client.weak());
    tokio::spawn(rpc_server.run(config.listen_addr, server_shutdown_signal));

    Ok(RingNode {
        handle: RingHandle::new(actor_client),
        events: RingEventStream::new(event_receiver),
        state: RingStateListener::new(snapshot_listener),
    })
}

fn validate_advertised_addr(addr: String) -> Result<NodeAddr, RingNodeCreationError> {
    if addr.is_empty() {
        return Err(RingNodeCreationError::InvalidAdvertisedAddr {
            addr,
            reason: "empty".into(),
        });
    }

    match Endpoint::from_shared(addr.clone()) {
        Ok(_) => Ok(NodeAddr::new(addr)),
        Err(e) => Err(RingNodeCreationError::InvalidAdvertisedAddr {
            addr,
            reason: e.to_string(),
        }),
    }
}
