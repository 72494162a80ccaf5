use crate::actor::{ActorClient, ActorExited, NodeActor};
use crate::ring::election::Uid;
use crate::ring::heartbeat::HeartbeatProbe;
use crate::ring::membership::LeaveNotice;
use crate::ring::message_log::LogEntry;
use crate::ring::node::{Node, NodeConfig};
use crate::ring::observers::{self, EventReceiver, NodeEvent, NodeSnapshot, SnapshotListener};
use crate::ring::peers::NodeAddr;
use crate::ring::ring_api::RingMessage;
use crate::ring::transport::{RingTransport, TransportError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::Duration;

pub(crate) const HEARTBEAT_TOLERANCE: Duration = Duration::from_millis(100);
const CALL_TIMEOUT: Duration = Duration::from_secs(1);
const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// LocalNetwork routes ring calls straight into other nodes' task queues, the same way the RPC
/// server would, minus the sockets.
#[derive(Clone, Default)]
pub(crate) struct LocalNetwork {
    nodes: Arc<Mutex<HashMap<NodeAddr, ActorClient>>>,
}

pub(crate) struct TestNode {
    pub addr: NodeAddr,
    pub client: ActorClient,
    pub state: SnapshotListener,
    pub events: EventReceiver,
}

impl LocalNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Builds a node, connected to nothing, and makes it reachable under `name`.
    pub(crate) fn spawn_node(&self, name: &str, uid: u64) -> TestNode {
        let addr = NodeAddr::new(name);
        let (node, state, events) = self.standalone_node(name, uid);

        let (client, rx) = ActorClient::new(10);
        let actor = NodeActor::new(test_logger(name), rx, node);
        tokio::task::spawn(actor.run_event_loop());

        self.nodes.lock().unwrap().insert(addr.clone(), client.clone());

        TestNode {
            addr,
            client,
            state,
            events,
        }
    }

    /// Spawns the nodes and joins each one via the one before it, so the ring ends up in the
    /// given order. Every join waits out the election it starts.
    pub(crate) async fn spawn_ring(&self, members: &[(&str, u64)]) -> Vec<TestNode> {
        let mut nodes: Vec<TestNode> = Vec::with_capacity(members.len());
        for (name, uid) in members {
            let node = self.spawn_node(name, *uid);
            let joined = match nodes.last() {
                Some(previous) => {
                    node.client.connect(previous.addr.clone()).await.unwrap();
                    true
                }
                None => false,
            };
            nodes.push(node);

            if joined {
                let largest = nodes.iter().map(|n| n.state.current().uid).max().unwrap();
                settle_on_leader(&mut nodes, largest).await;
            }
        }

        nodes
    }

    /// A node not driven by any dispatcher, for tests that call its methods directly.
    pub(crate) fn standalone_node(&self, name: &str, uid: u64) -> (Node<LocalTransport>, SnapshotListener, EventReceiver) {
        let addr = NodeAddr::new(name);
        let (observers, state, events) = observers::new(NodeSnapshot {
            address: addr.clone(),
            uid: Uid::new(uid),
            follower: None,
            leader: None,
            voting: false,
            log_len: 0,
        });

        let node = Node::new(NodeConfig {
            logger: test_logger(name),
            me: addr,
            uid: Uid::new(uid),
            call_timeout: CALL_TIMEOUT,
            heartbeat_tolerance: HEARTBEAT_TOLERANCE,
            max_uid_redraws: 16,
            transport: LocalTransport { network: self.clone() },
            observers,
            heartbeat_timer: None,
            server_shutdown_handle: None,
        });

        (node, state, events)
    }

    /// Makes `addr` unreachable, as if its process died.
    pub(crate) fn kill(&self, addr: &NodeAddr) {
        self.nodes.lock().unwrap().remove(addr);
    }

    fn client(&self, target: &NodeAddr) -> Result<ActorClient, TransportError> {
        self.nodes
            .lock()
            .unwrap()
            .get(target)
            .cloned()
            .ok_or_else(|| TransportError::ConnectionFailed {
                addr: target.clone(),
                reason: "connection refused".into(),
            })
    }
}

/// Waits until every node follows `leader` and nothing is left circulating.
pub(crate) async fn settle_on_leader(nodes: &mut [TestNode], leader: Uid) {
    for _ in 0..2 {
        for node in nodes.iter_mut() {
            node.wait_for(|s| s.leader == Some(leader) && !s.voting).await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

impl TestNode {
    pub(crate) async fn wait_for<F>(&mut self, predicate: F) -> NodeSnapshot
    where
        F: FnMut(&NodeSnapshot) -> bool,
    {
        match tokio::time::timeout(WAIT_TIMEOUT, self.state.wait_for(predicate)).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => panic!("{} dispatcher exited", self.addr),
            Err(_) => panic!("Timed out waiting on {}, last state {:?}", self.addr, self.state.current()),
        }
    }

    pub(crate) async fn wait_for_event<F>(&mut self, mut predicate: F) -> NodeEvent
    where
        F: FnMut(&NodeEvent) -> bool,
    {
        let addr = self.addr.clone();
        let events = &mut self.events;
        let wait = async move {
            while let Some(event) = events.next().await {
                if predicate(&event) {
                    return event;
                }
            }
            panic!("Event stream closed");
        };

        tokio::time::timeout(WAIT_TIMEOUT, wait)
            .await
            .unwrap_or_else(|_| panic!("Timed out waiting for event on {}", addr))
    }
}

pub(crate) struct LocalTransport {
    network: LocalNetwork,
}

fn exited(addr: &NodeAddr, _: ActorExited) -> TransportError {
    TransportError::ConnectionFailed {
        addr: addr.clone(),
        reason: "node shut down".into(),
    }
}

#[async_trait::async_trait]
impl RingTransport for LocalTransport {
    async fn join(&self, target: &NodeAddr, joiner: &NodeAddr) -> Result<NodeAddr, TransportError> {
        self.network
            .client(target)?
            .join(joiner.clone())
            .await
            .map_err(|e| TransportError::Rejected {
                addr: target.clone(),
                reason: e.to_string(),
            })
    }

    async fn leave(&self, target: &NodeAddr, notice: LeaveNotice) -> Result<(), TransportError> {
        self.network
            .client(target)?
            .leave_notice(notice)
            .await
            .map_err(|e| exited(target, e))
    }

    async fn deliver(&self, target: &NodeAddr, message: RingMessage) -> Result<(), TransportError> {
        self.network
            .client(target)?
            .deliver(message)
            .await
            .map_err(|e| exited(target, e))
    }

    async fn fetch_log(&self, target: &NodeAddr) -> Result<Vec<LogEntry>, TransportError> {
        self.network
            .client(target)?
            .fetch_log()
            .await
            .map_err(|e| exited(target, e))
    }

    async fn heartbeat(&self, target: &NodeAddr, probe: HeartbeatProbe) -> Result<(), TransportError> {
        self.network
            .client(target)?
            .heartbeat(probe)
            .await
            .map_err(|e| exited(target, e))
    }
}

pub(crate) fn test_logger(name: &str) -> slog::Logger {
    use slog::Drain;

    let decorator = slog_term::PlainSyncDecorator::new(slog_term::TestStdoutWriter);
    let drain = slog_term::FullFormat::new(decorator).build().fuse();

    slog::Logger::root(drain, slog::o!("Node" => name.to_string()))
}
