use crate::ring::election::Uid;
use crate::ring::message_log::LogEntry;
use crate::ring::peers::NodeAddr;
use tokio::sync::{mpsc, watch};

/// Point-in-time view of a node's ring state, published after every task.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NodeSnapshot {
    pub address: NodeAddr,
    pub uid: Uid,
    pub follower: Option<NodeAddr>,
    pub leader: Option<Uid>,
    pub voting: bool,
    pub log_len: usize,
}

/// Things a UI layer wants to render, in the order the node observed them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NodeEvent {
    Connected { follower: NodeAddr },
    Disconnected,
    Appended(LogEntry),
    Cleaned,
    LeaderElected(Uid),
}

pub(crate) fn new(initial: NodeSnapshot) -> (NodeObservers, SnapshotListener, EventReceiver) {
    let (snapshot_tx, snapshot_rx) = watch::channel(initial);
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    (
        NodeObservers { snapshot_tx, event_tx },
        SnapshotListener { rcv: snapshot_rx },
        EventReceiver { receiver: event_rx },
    )
}

pub(crate) struct NodeObservers {
    snapshot_tx: watch::Sender<NodeSnapshot>,
    event_tx: mpsc::UnboundedSender<NodeEvent>,
}

impl NodeObservers {
    pub(crate) fn publish_snapshot(&self, snapshot: NodeSnapshot) {
        if *self.snapshot_tx.borrow() != snapshot {
            self.snapshot_tx.send_replace(snapshot);
        }
    }

    pub(crate) fn emit(&self, event: NodeEvent) {
        // Nobody listening is fine.
        let _ = self.event_tx.send(event);
    }
}

#[derive(Clone)]
pub(crate) struct SnapshotListener {
    rcv: watch::Receiver<NodeSnapshot>,
}

impl SnapshotListener {
    pub(crate) fn current(&self) -> NodeSnapshot {
        self.rcv.borrow().clone()
    }

    pub(crate) async fn next(&mut self) -> Option<NodeSnapshot> {
        match self.rcv.changed().await {
            Ok(_) => Some(self.rcv.borrow().clone()),
            Err(_) => None,
        }
    }

    /// Wait until a published snapshot satisfies `predicate`, checking the current one first.
    pub(crate) async fn wait_for<F>(&mut self, mut predicate: F) -> Option<NodeSnapshot>
    where
        F: FnMut(&NodeSnapshot) -> bool,
    {
        let current = self.current();
        if predicate(&current) {
            return Some(current);
        }

        while let Some(snapshot) = self.next().await {
            if predicate(&snapshot) {
                return Some(snapshot);
            }
        }

        None
    }
}

pub(crate) struct EventReceiver {
    receiver: mpsc::UnboundedReceiver<NodeEvent>,
}

impl EventReceiver {
    pub(crate) async fn next(&mut self) -> Option<NodeEvent> {
        self.receiver.recv().await
    }
}
