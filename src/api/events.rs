use crate::ring::{EventReceiver, NodeEvent, NodeSnapshot, SnapshotListener};

/// RingEventStream yields what the local node observed, in order: membership changes, log
/// appends and cleans, elected leaders. Nothing is dropped, so keep consuming it.
pub struct RingEventStream {
    receiver: EventReceiver,
}

impl RingEventStream {
    pub(super) fn new(receiver: EventReceiver) -> Self {
        RingEventStream { receiver }
    }

    /// `None` once the node has shut down.
    pub async fn next(&mut self) -> Option<NodeEvent> {
        self.receiver.next().await
    }
}

/// RingStateListener watches the node's latest state. Intermediate states between two reads
/// may be skipped.
#[derive(Clone)]
pub struct RingStateListener {
    listener: SnapshotListener,
}

impl RingStateListener {
    pub(super) fn new(listener: SnapshotListener) -> Self {
        RingStateListener { listener }
    }

    pub fn current(&self) -> NodeSnapshot {
        self.listener.current()
    }

    /// Waits for the state to change. `None` once the node has shut down.
    pub async fn next(&mut self) -> Option<NodeSnapshot> {
        self.listener.next().await
    }

    pub async fn wait_for<F>(&mut self, predicate: F) -> Option<NodeSnapshot>
    where
        F: FnMut(&NodeSnapshot) -> bool,
    {
        self.listener.wait_for(predicate).await
    }
}
