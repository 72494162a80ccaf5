use crate::ring;
use std::error::Error;
use std::fmt::{self, Debug};
use tokio::sync::{mpsc, oneshot};

// Design choice: a task runs to completion before the next one is pulled, including whatever
// outbound calls it makes. That makes the dispatcher the only writer of node state, at the
// price of one slow peer stalling the whole queue for up to one call timeout.
//
// Inbound relay traffic (leave notices, election/log messages, heartbeats) is fire-and-forget:
// the RPC handler returns as soon as the task is queued. Only Join and FetchLog wait for a
// reply, and those tasks never call out, so no ring-wide wait cycle can form.
pub(crate) enum Task {
    // -- Local API --
    // Join a ring through any member, pull its log, start an election.
    Connect(ring::NodeAddr, Callback<(), ring::ConnectError>),
    // Start circulating our own leave notice.
    Leave(Callback<(), ring::LeaveError>),
    // Hand a payload to the ring for sequencing.
    Submit(ring::Payload, Callback<(), ring::SubmitError>),
    StartElection(Callback<(), ring::ElectionError>),

    // -- Inbound protocol --
    // Someone wants to be spliced in after us.
    Join(ring::NodeAddr, Callback<ring::NodeAddr, ring::JoinError>),
    LeaveNotice(ring::LeaveNotice),
    Deliver(ring::RingMessage),
    FetchLog(Callback<Vec<ring::LogEntry>, ActorExited>),
    Heartbeat(ring::HeartbeatProbe),

    // -- Timer --
    // Probe our follower and check the watchdog.
    HeartbeatTick,
}

impl Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Connect(target, _) => write!(f, "Connect({})", target),
            Task::Leave(_) => write!(f, "Leave"),
            Task::Submit(payload, _) => write!(f, "Submit({:?})", payload),
            Task::StartElection(_) => write!(f, "StartElection"),
            Task::Join(joiner, _) => write!(f, "Join({})", joiner),
            Task::LeaveNotice(notice) => write!(f, "LeaveNotice({:?})", notice),
            Task::Deliver(message) => write!(f, "Deliver({:?})", message),
            Task::FetchLog(_) => write!(f, "FetchLog"),
            Task::Heartbeat(probe) => write!(f, "Heartbeat({:?})", probe),
            Task::HeartbeatTick => write!(f, "HeartbeatTick"),
        }
    }
}

pub(crate) struct Callback<O, E: Error>(oneshot::Sender<Result<O, E>>);

impl<O, E: Error> Callback<O, E> {
    pub(crate) fn send(self, message: Result<O, E>) {
        // Caller may have given up waiting.
        let _ = self.0.send(message);
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("node task dispatcher has exited")]
pub struct ActorExited;

#[derive(Clone)]
pub(crate) struct ActorClient {
    sender: mpsc::Sender<Task>,
}

/// WeakActorClient doesn't keep the dispatcher alive. Held by the RPC server and timers so that
/// dropping the application's handles shuts the node down.
#[derive(Clone)]
pub(crate) struct WeakActorClient {
    sender: mpsc::WeakSender<Task>,
}

impl ActorClient {
    /// `new()` creates the bounded task queue. Producers wait while it is full.
    pub(crate) fn new(queue_capacity: usize) -> (Self, mpsc::Receiver<Task>) {
        let (tx, rx) = mpsc::channel(queue_capacity);
        (ActorClient { sender: tx }, rx)
    }

    pub(crate) fn weak(&self) -> WeakActorClient {
        WeakActorClient {
            sender: self.sender.downgrade(),
        }
    }

    pub(crate) async fn connect(&self, target: ring::NodeAddr) -> Result<(), ring::ConnectError> {
        self.call(|callback| Task::Connect(target, callback)).await
    }

    pub(crate) async fn leave(&self) -> Result<(), ring::LeaveError> {
        self.call(Task::Leave).await
    }

    pub(crate) async fn submit(&self, payload: ring::Payload) -> Result<(), ring::SubmitError> {
        self.call(|callback| Task::Submit(payload, callback)).await
    }

    pub(crate) async fn start_election(&self) -> Result<(), ring::ElectionError> {
        self.call(Task::StartElection).await
    }

    pub(crate) async fn join(&self, joiner: ring::NodeAddr) -> Result<ring::NodeAddr, ring::JoinError> {
        self.call(|callback| Task::Join(joiner, callback)).await
    }

    pub(crate) async fn leave_notice(&self, notice: ring::LeaveNotice) -> Result<(), ActorExited> {
        self.send(Task::LeaveNotice(notice)).await
    }

    pub(crate) async fn deliver(&self, message: ring::RingMessage) -> Result<(), ActorExited> {
        self.send(Task::Deliver(message)).await
    }

    pub(crate) async fn fetch_log(&self) -> Result<Vec<ring::LogEntry>, ActorExited> {
        self.call(Task::FetchLog).await
    }

    pub(crate) async fn heartbeat(&self, probe: ring::HeartbeatProbe) -> Result<(), ActorExited> {
        self.send(Task::Heartbeat(probe)).await
    }

    pub(crate) async fn heartbeat_tick(&self) -> Result<(), ActorExited> {
        self.send(Task::HeartbeatTick).await
    }

    async fn call<O, E, F>(&self, to_task: F) -> Result<O, E>
    where
        E: Error + From<ActorExited>,
        F: FnOnce(Callback<O, E>) -> Task,
    {
        let (tx, rx) = oneshot::channel();
        self.send(to_task(Callback(tx))).await?;

        rx.await.unwrap_or_else(|_| Err(E::from(ActorExited)))
    }

    async fn send(&self, task: Task) -> Result<(), ActorExited> {
        self.sender.send(task).await.map_err(|_| ActorExited)
    }
}

impl WeakActorClient {
    pub(crate) fn upgrade(&self) -> Result<ActorClient, ActorExited> {
        self.sender
            .upgrade()
            .map(|sender| ActorClient { sender })
            .ok_or(ActorExited)
    }

    pub(crate) async fn heartbeat_tick(&self) -> Result<(), ActorExited> {
        self.upgrade()?.heartbeat_tick().await
    }
}

/// NodeActor is the TaskDispatcher: the single consumer of a node's task queue.
pub(crate) struct NodeActor<T: ring::RingTransport> {
    logger: slog::Logger,
    receiver: mpsc::Receiver<Task>,
    node: ring::Node<T>,
}

impl<T: ring::RingTransport> NodeActor<T> {
    pub(crate) fn new(logger: slog::Logger, receiver: mpsc::Receiver<Task>, node: ring::Node<T>) -> Self {
        NodeActor { logger, receiver, node }
    }

    /// Runs until every strong `ActorClient` is dropped.
    pub(crate) async fn run_event_loop(mut self) {
        while let Some(task) = self.receiver.recv().await {
            slog::debug!(self.logger, "Dispatching {:?}", task);
            self.handle_task(task).await;
            self.node.publish_snapshot();
        }

        slog::info!(self.logger, "Task queue closed, dispatcher exiting");
    }

    async fn handle_task(&mut self, task: Task) {
        match task {
            Task::Connect(target, callback) => {
                let result = self.node.connect(target).await;
                callback.send(result);
            }
            Task::Leave(callback) => {
                let result = self.node.leave().await;
                callback.send(result);
            }
            Task::Submit(payload, callback) => {
                let result = self.node.submit(payload).await;
                callback.send(result);
            }
            Task::StartElection(callback) => {
                let result = self.node.start_election().await;
                callback.send(result);
            }
            Task::Join(joiner, callback) => {
                let result = self.node.handle_join(joiner);
                callback.send(result);
            }
            Task::LeaveNotice(notice) => {
                self.node.handle_leave_notice(notice).await;
            }
            Task::Deliver(message) => {
                self.node.handle_message(message).await;
            }
            Task::FetchLog(callback) => {
                callback.send(Ok(self.node.log_entries()));
            }
            Task::Heartbeat(probe) => {
                self.node.handle_heartbeat(probe).await;
            }
            Task::HeartbeatTick => {
                self.node.heartbeat_tick().await;
            }
        }
    }
}
