use crate::actor::WeakActorClient;
use crate::ring::election::Uid;
use crate::ring::heartbeat::HeartbeatTimerHandle;
use crate::ring::node::{Node, NodeConfig};
use crate::ring::observers::{self, EventReceiver, NodeSnapshot, SnapshotListener};
use crate::ring::peer_client::GrpcTransport;
use crate::ring::peers::NodeAddr;
use crate::server;
use tokio::time::Duration;

pub(crate) struct NodeTimings {
    pub heartbeat_interval: Duration,
    pub heartbeat_tolerance: Duration,
    pub call_timeout: Duration,
}

/// `create_node()` builds a blank node talking gRPC and starts its heartbeat ticker.
pub(crate) fn create_node(
    logger: slog::Logger,
    me: NodeAddr,
    timings: NodeTimings,
    max_uid_redraws: usize,
    server_shutdown_handle: server::RpcServerShutdownHandle,
    actor_client: WeakActorClient,
) -> (Node<GrpcTransport>, SnapshotListener, EventReceiver) {
    let uid = Uid::random();
    slog::info!(logger, "Starting node {} with uid {}", me, uid);

    let (observers, snapshot_listener, event_receiver) = observers::new(NodeSnapshot {
        address: me.clone(),
        uid,
        follower: None,
        leader: None,
        voting: false,
        log_len: 0,
    });

    let heartbeat_timer = HeartbeatTimerHandle::spawn_timer_task(timings.heartbeat_interval, actor_client);

    let node = Node::new(NodeConfig {
        // Leaves room inside call_timeout so a silent peer reads as unreachable, not slow.
        transport: GrpcTransport::new(logger.clone(), timings.call_timeout * 4 / 5),
        logger,
        me,
        uid,
        call_timeout: timings.call_timeout,
        heartbeat_tolerance: timings.heartbeat_tolerance,
        max_uid_redraws,
        observers,
        heartbeat_timer: Some(heartbeat_timer),
        server_shutdown_handle: Some(server_shutdown_handle),
    });

    (node, snapshot_listener, event_receiver)
}
