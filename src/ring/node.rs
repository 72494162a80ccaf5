use crate::ring::election::{ElectionError, ElectionMessage, ElectionOutcome, ElectionState, Uid};
use crate::ring::heartbeat::{HeartbeatProbe, HeartbeatTimerHandle, LivenessWatchdog};
use crate::ring::membership::{LeaveAction, LeaveNotice, RingMembership};
use crate::ring::message_log::{Applied, LogEntry, MessageLog, Payload, SeqId};
use crate::ring::observers::{NodeEvent, NodeObservers, NodeSnapshot};
use crate::ring::peers::NodeAddr;
use crate::ring::ring_api::{
    ConnectError, JoinError, LeaveError, PersistentMessage, Propagation, RingMessage, SubmitError,
};
use crate::ring::transport::{RingTransport, TransportError};
use crate::server;
use std::future::Future;
use tokio::time::{Duration, Instant};

pub(crate) struct NodeConfig<T: RingTransport> {
    pub logger: slog::Logger,
    pub me: NodeAddr,
    pub uid: Uid,
    pub call_timeout: Duration,
    pub heartbeat_tolerance: Duration,
    pub max_uid_redraws: usize,
    pub transport: T,
    pub observers: NodeObservers,
    pub heartbeat_timer: Option<HeartbeatTimerHandle>,
    pub server_shutdown_handle: Option<server::RpcServerShutdownHandle>,
}

/// Node owns every piece of a ring member's state. It is only ever touched by the dispatcher,
/// one task at a time.
pub(crate) struct Node<T: RingTransport> {
    logger: slog::Logger,
    membership: RingMembership,
    election: ElectionState,
    watchdog: LivenessWatchdog,
    log: MessageLog,
    transport: T,
    call_timeout: Duration,
    observers: NodeObservers,
    // Last joiner we accepted and the follower we handed it, so a retried join gets the same answer.
    last_admission: Option<(NodeAddr, NodeAddr)>,
    // Submitted once the election in progress has a winner.
    pending_announcements: Vec<Payload>,
    // Held so they stop with the node.
    _heartbeat_timer: Option<HeartbeatTimerHandle>,
    _server_shutdown_handle: Option<server::RpcServerShutdownHandle>,
}

impl<T: RingTransport> Node<T> {
    pub(crate) fn new(config: NodeConfig<T>) -> Self {
        Node {
            logger: config.logger,
            membership: RingMembership::new(config.me),
            election: ElectionState::new(config.uid, config.max_uid_redraws),
            watchdog: LivenessWatchdog::new(config.heartbeat_tolerance),
            log: MessageLog::new(),
            transport: config.transport,
            call_timeout: config.call_timeout,
            observers: config.observers,
            last_admission: None,
            pending_announcements: Vec::new(),
            _heartbeat_timer: config.heartbeat_timer,
            _server_shutdown_handle: config.server_shutdown_handle,
        }
    }

    pub(crate) fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            address: self.membership.me().clone(),
            uid: self.election.uid(),
            follower: self.membership.follower().cloned(),
            leader: self.election.leader(),
            voting: self.election.is_voting(),
            log_len: self.log.len(),
        }
    }

    pub(crate) fn publish_snapshot(&self) {
        self.observers.publish_snapshot(self.snapshot());
    }

    pub(crate) fn log_entries(&self) -> Vec<LogEntry> {
        self.log.entries()
    }

    // ------- Membership -------

    pub(crate) async fn connect(&mut self, target: NodeAddr) -> Result<(), ConnectError> {
        if let Some(follower) = self.membership.follower() {
            return Err(ConnectError::AlreadyInRing {
                follower: follower.clone(),
            });
        }

        let me = self.membership.me().clone();
        let follower = self
            .call(&target, self.transport.join(&target, &me))
            .await
            .map_err(|source| ConnectError::JoinFailed {
                target: target.clone(),
                source,
            })?;
        if follower == me {
            return Err(ConnectError::JoinFailed {
                target: target.clone(),
                source: TransportError::MalformedResponse {
                    addr: target,
                    reason: "handed us our own address as follower".into(),
                },
            });
        }
        slog::info!(self.logger, "Joined ring via {}, follower is {}", target, follower);

        // New predecessor, new liveness window.
        self.watchdog.disarm();
        self.set_follower(Some(follower.clone()));

        match self.call(&follower, self.transport.fetch_log(&follower)).await {
            Ok(entries) => self.replace_log(entries),
            Err(e) => slog::warn!(self.logger, "Couldn't fetch log from {}: {}", follower, e),
        }

        if let Err(e) = self.start_election().await {
            slog::warn!(self.logger, "Couldn't start election after joining: {}", e);
        }

        Ok(())
    }

    pub(crate) fn handle_join(&mut self, joiner: NodeAddr) -> Result<NodeAddr, JoinError> {
        if joiner == *self.membership.me() {
            return Err(JoinError::SelfJoin);
        }

        if self.membership.follower() == Some(&joiner) {
            return match &self.last_admission {
                Some((admitted, handed)) if *admitted == joiner => {
                    slog::info!(self.logger, "{} retried its join, handing it {} again", joiner, handed);
                    Ok(handed.clone())
                }
                _ => Err(JoinError::AlreadyFollower { joiner }),
            };
        }

        if self.membership.is_alone() {
            // Joiner is about to become our predecessor as well.
            self.watchdog.disarm();
        }

        let old_follower = self.membership.accept_joiner(joiner.clone());
        slog::info!(self.logger, "Accepted {} into the ring, handing it {}", joiner, old_follower);
        self.last_admission = Some((joiner.clone(), old_follower.clone()));
        self.observers.emit(NodeEvent::Connected { follower: joiner });

        Ok(old_follower)
    }

    pub(crate) async fn leave(&mut self) -> Result<(), LeaveError> {
        let follower = match self.membership.follower() {
            Some(follower) => follower.clone(),
            None => {
                self.reset();
                return Ok(());
            }
        };

        let notice = self.membership.leave_notice();
        slog::info!(self.logger, "Leaving ring, sending {:?} to {}", notice, follower);
        self.call(&follower, self.transport.leave(&follower, notice))
            .await
            .map_err(LeaveError::Network)
    }

    pub(crate) async fn handle_leave_notice(&mut self, notice: LeaveNotice) {
        match self.membership.route_leave(&notice) {
            LeaveAction::Complete => {
                slog::info!(self.logger, "Leave notice made it around the ring, resetting");
                self.reset();
            }
            LeaveAction::Relay(next) => {
                if let Err(e) = self.call(&next, self.transport.leave(&next, notice)).await {
                    slog::warn!(self.logger, "Couldn't relay leave notice to {}: {}", next, e);
                }
            }
            LeaveAction::Splice { leaving, replacement } => {
                self.notify_departed(&leaving, notice).await;

                slog::info!(self.logger, "{} left, new follower is {}", leaving, replacement);
                self.set_follower(Some(replacement));

                // The departed node may have been leader, so only announce once a new one is known.
                self.pending_announcements
                    .push(Payload::Control(format!("{} leaves.", leaving)));
                if let Err(e) = self.start_election().await {
                    slog::warn!(self.logger, "Couldn't start election after {} left: {}", leaving, e);
                }
            }
            LeaveAction::Collapse { leaving } => {
                self.notify_departed(&leaving, notice).await;

                slog::info!(self.logger, "{} left, we're the only node now", leaving);
                self.set_follower(None);
            }
            LeaveAction::Stranded => {
                slog::warn!(self.logger, "Got {:?} but have no follower, dropping", notice);
            }
        }
    }

    /// Hand the notice to the departing node so it completes its own leave.
    async fn notify_departed(&self, leaving: &NodeAddr, notice: LeaveNotice) {
        if let Err(e) = self.call(leaving, self.transport.leave(leaving, notice)).await {
            slog::warn!(self.logger, "Couldn't tell {} its leave is done: {}", leaving, e);
        }
    }

    fn set_follower(&mut self, follower: Option<NodeAddr>) {
        if self.membership.follower() == follower.as_ref() {
            return;
        }

        self.membership.set_follower(follower.clone());
        match follower {
            Some(follower) => self.observers.emit(NodeEvent::Connected { follower }),
            None => self.observers.emit(NodeEvent::Disconnected),
        }
    }

    /// Back to the blank state of a freshly started node.
    fn reset(&mut self) {
        self.membership.set_follower(None);
        self.last_admission = None;
        self.pending_announcements.clear();
        self.election.reset();
        self.watchdog.disarm();
        self.log.clean();

        slog::info!(self.logger, "Reset, new uid is {}", self.election.uid());
        self.observers.emit(NodeEvent::Cleaned);
        self.observers.emit(NodeEvent::Disconnected);
    }

    // ------- Election -------

    pub(crate) async fn start_election(&mut self) -> Result<(), ElectionError> {
        slog::info!(self.logger, "Starting election with uid {}", self.election.uid());
        self.handle_election_message(ElectionMessage::Election { candidate: Uid::NOBODY })
            .await
    }

    async fn handle_election_message(&mut self, message: ElectionMessage) -> Result<(), ElectionError> {
        let result = self.advance_election(message).await;
        self.submit_pending_announcements().await;
        result
    }

    async fn advance_election(&mut self, message: ElectionMessage) -> Result<(), ElectionError> {
        let was_voting = self.election.is_voting();
        let leader_before = self.election.leader();

        let outcome = match message {
            ElectionMessage::Election { candidate } => self.election.on_election(candidate)?,
            ElectionMessage::Elected { leader } => self.election.on_elected(leader),
        };

        if let Some(leader) = self.election.leader() {
            if leader_before != Some(leader) {
                slog::info!(self.logger, "Leader is now {}", leader);
                self.observers.emit(NodeEvent::LeaderElected(leader));
            }
        }

        let next = match outcome {
            ElectionOutcome::Forward(next) => next,
            ElectionOutcome::Swallow => {
                slog::debug!(self.logger, "Swallowed {:?}, already campaigning", message);
                return Ok(());
            }
            ElectionOutcome::Finished => {
                slog::info!(self.logger, "Election finished, we lead with uid {}", self.election.uid());
                return Ok(());
            }
        };

        let result = match self.membership.follower() {
            Some(follower) => self
                .call(follower, self.transport.deliver(follower, next.into()))
                .await
                .map_err(ElectionError::Network),
            None => Err(ElectionError::NotConnected),
        };

        if result.is_err() {
            if let ElectionMessage::Election { .. } = next {
                // The token never left, so we aren't really campaigning.
                self.election.restore_voting(was_voting);
            }
        }

        result
    }

    async fn submit_pending_announcements(&mut self) {
        if self.pending_announcements.is_empty() || self.election.leader().is_none() || self.election.is_voting() {
            return;
        }

        let follower = match self.membership.follower() {
            Some(follower) => follower.clone(),
            None => return,
        };

        for payload in std::mem::take(&mut self.pending_announcements) {
            let message = if self.election.is_leader() {
                RingMessage::Persistent(self.sequence(payload))
            } else {
                RingMessage::Propagate(Propagation {
                    origin: self.membership.me().clone(),
                    payload,
                })
            };

            if let Err(e) = self.call(&follower, self.transport.deliver(&follower, message)).await {
                slog::warn!(self.logger, "Couldn't submit announcement to {}: {}", follower, e);
            }
        }
    }

    // ------- Message log -------

    pub(crate) async fn submit(&mut self, payload: Payload) -> Result<(), SubmitError> {
        let propagation = Propagation {
            origin: self.membership.me().clone(),
            payload,
        };
        self.propagate(propagation).await
    }

    async fn propagate(&mut self, propagation: Propagation) -> Result<(), SubmitError> {
        let follower = self.membership.follower().cloned().ok_or(SubmitError::NotConnected)?;

        if self.election.is_leader() {
            let message = self.sequence(propagation.payload);
            return self
                .call(&follower, self.transport.deliver(&follower, RingMessage::Persistent(message)))
                .await
                .map_err(SubmitError::Network);
        }

        if self.election.leader().is_none() {
            if let Err(e) = self.start_election().await {
                slog::warn!(self.logger, "Couldn't start election: {}", e);
            }
            return Err(SubmitError::NoLeader);
        }

        self.call(&follower, self.transport.deliver(&follower, RingMessage::Propagate(propagation)))
            .await
            .map_err(SubmitError::Network)
    }

    /// Assign the next id to `payload` and store it. Only called on the leader.
    fn sequence(&mut self, payload: Payload) -> PersistentMessage {
        let origin = self.election.uid();
        match self.log.sequence(payload.clone()) {
            Some(id) => {
                slog::debug!(self.logger, "Sequenced {:?} as {}", payload, id);
                self.observers.emit(NodeEvent::Appended(LogEntry {
                    id,
                    payload: payload.clone(),
                }));
                PersistentMessage { origin, id, payload }
            }
            None => {
                slog::info!(self.logger, "Cleaned log");
                self.observers.emit(NodeEvent::Cleaned);
                PersistentMessage {
                    origin,
                    id: SeqId::CLEAN,
                    payload,
                }
            }
        }
    }

    async fn handle_propagate(&mut self, propagation: Propagation) {
        if !self.election.is_leader() && propagation.origin == *self.membership.me() {
            slog::warn!(
                self.logger,
                "{:?} went around the ring without reaching a leader, dropping",
                propagation.payload
            );
            if let Err(e) = self.start_election().await {
                slog::warn!(self.logger, "Couldn't start election: {}", e);
            }
            return;
        }

        if let Err(e) = self.propagate(propagation).await {
            slog::warn!(self.logger, "Dropped propagated message: {}", e);
        }
    }

    async fn handle_persistent(&mut self, message: PersistentMessage) {
        if message.origin == self.election.uid() {
            slog::debug!(self.logger, "Replication of {} completed the ring", message.id);
            return;
        }

        match self.log.apply(message.id, message.payload.clone()) {
            Applied::Stored => self.observers.emit(NodeEvent::Appended(LogEntry {
                id: message.id,
                payload: message.payload.clone(),
            })),
            Applied::Cleaned => self.observers.emit(NodeEvent::Cleaned),
            Applied::AlreadyPresent => {
                slog::debug!(self.logger, "Already hold entry {}, stopping replication", message.id);
                return;
            }
        }

        if self.election.is_leader() {
            slog::warn!(
                self.logger,
                "Got entry {} sequenced by {} while leading ourselves, not forwarding",
                message.id,
                message.origin
            );
            return;
        }

        let follower = match self.membership.follower() {
            Some(follower) => follower,
            None => {
                slog::warn!(self.logger, "No follower to replicate entry {} to", message.id);
                return;
            }
        };

        let id = message.id;
        if let Err(e) = self
            .call(follower, self.transport.deliver(follower, RingMessage::Persistent(message)))
            .await
        {
            slog::warn!(self.logger, "Couldn't replicate entry {} to {}: {}", id, follower, e);
        }
    }

    fn replace_log(&mut self, entries: Vec<LogEntry>) {
        self.log.replace(entries);
        self.observers.emit(NodeEvent::Cleaned);
        for entry in self.log.entries() {
            self.observers.emit(NodeEvent::Appended(entry));
        }
    }

    pub(crate) async fn handle_message(&mut self, message: RingMessage) {
        match message {
            RingMessage::Election { candidate } => {
                self.handle_relayed_election(ElectionMessage::Election { candidate }).await
            }
            RingMessage::Elected { leader } => self.handle_relayed_election(ElectionMessage::Elected { leader }).await,
            RingMessage::Propagate(propagation) => self.handle_propagate(propagation).await,
            RingMessage::Persistent(message) => self.handle_persistent(message).await,
        }
    }

    async fn handle_relayed_election(&mut self, message: ElectionMessage) {
        match self.handle_election_message(message).await {
            Ok(()) => {}
            Err(e @ ElectionError::IdentifierCollision { .. }) => {
                slog::error!(self.logger, "Giving up on election: {}", e);
            }
            Err(e) => slog::warn!(self.logger, "Couldn't pass on {:?}: {}", message, e),
        }
    }

    // ------- Heartbeat -------

    pub(crate) async fn handle_heartbeat(&mut self, probe: HeartbeatProbe) {
        // Anything from upstream proves the predecessor is alive.
        self.watchdog.record_heartbeat(Instant::now());

        match probe {
            HeartbeatProbe::Alive => {}
            HeartbeatProbe::Correction { host } if host == *self.membership.me() => {
                slog::info!(self.logger, "Own correction came back around, absorbing");
            }
            HeartbeatProbe::Correction { host } => self.panic(host).await,
        }
    }

    pub(crate) async fn heartbeat_tick(&mut self) {
        let follower = match self.membership.follower() {
            Some(follower) => follower.clone(),
            None => return,
        };

        if let Err(e) = self
            .call(&follower, self.transport.heartbeat(&follower, HeartbeatProbe::Alive))
            .await
        {
            slog::debug!(self.logger, "Heartbeat to {} failed: {}", follower, e);
        }

        let now = Instant::now();
        if self.watchdog.expired(now) {
            slog::warn!(
                self.logger,
                "No heartbeat since {:?}, predecessor presumed dead",
                self.watchdog.last_heartbeat()
            );
            // One panic per tolerance window.
            self.watchdog.record_heartbeat(now);

            let me = self.membership.me().clone();
            self.panic(me).await;
        }
    }

    /// `panic()` sends a correction suggesting `host` downstream. If the follower can't be reached
    /// at all, it's assumed dead and we splice around it by adopting `host` directly.
    async fn panic(&mut self, host: NodeAddr) {
        let follower = match self.membership.follower() {
            Some(follower) => follower.clone(),
            None => {
                slog::warn!(self.logger, "Can't relay correction for {}, no follower", host);
                return;
            }
        };

        let probe = HeartbeatProbe::Correction { host: host.clone() };
        match self.call(&follower, self.transport.heartbeat(&follower, probe)).await {
            Ok(()) => {}
            Err(TransportError::ConnectionFailed { reason, .. }) if host == *self.membership.me() => {
                slog::warn!(self.logger, "Follower {} unreachable ({}), we're on our own", follower, reason);
                self.set_follower(None);
            }
            Err(TransportError::ConnectionFailed { reason, .. }) => {
                slog::warn!(
                    self.logger,
                    "Follower {} unreachable ({}), adopting {} instead",
                    follower,
                    reason,
                    host
                );
                self.set_follower(Some(host));
                if let Err(e) = self.start_election().await {
                    slog::warn!(self.logger, "Couldn't start election after self-heal: {}", e);
                }
            }
            Err(e) => slog::warn!(self.logger, "Correction to {} not delivered: {}", follower, e),
        }
    }

    async fn call<O, F>(&self, target: &NodeAddr, call: F) -> Result<O, TransportError>
    where
        F: Future<Output = Result<O, TransportError>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_elapsed) => Err(TransportError::Timeout(target.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::test_utils::{self, LocalNetwork};
    use bytes::Bytes;

    fn data(s: &'static str) -> Payload {
        Payload::Data(Bytes::from_static(s.as_bytes()))
    }

    #[tokio::test]
    async fn join_forms_two_node_ring() {
        let network = LocalNetwork::new();
        let mut a = network.spawn_node("a", 5);
        let mut b = network.spawn_node("b", 9);

        b.client.connect(a.addr.clone()).await.unwrap();

        let a_state = a.wait_for(|s| s.leader == Some(Uid::new(9))).await;
        let b_state = b.wait_for(|s| s.leader == Some(Uid::new(9)) && !s.voting).await;
        assert_eq!(a_state.follower, Some(b.addr.clone()));
        assert_eq!(b_state.follower, Some(a.addr.clone()));
    }

    #[tokio::test]
    async fn connect_rejected_when_already_in_ring() {
        let network = LocalNetwork::new();
        let a = network.spawn_node("a", 5);
        let b = network.spawn_node("b", 9);
        b.client.connect(a.addr.clone()).await.unwrap();

        let result = b.client.connect(a.addr.clone()).await;

        match result {
            Err(ConnectError::AlreadyInRing { follower }) => assert_eq!(follower, a.addr),
            other => panic!("Unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn node_cannot_join_itself() {
        let network = LocalNetwork::new();
        let a = network.spawn_node("a", 5);

        let result = a.client.join(a.addr.clone()).await;
        assert!(matches!(result, Err(JoinError::SelfJoin)));

        let result = a.client.connect(a.addr.clone()).await;
        assert!(matches!(result, Err(ConnectError::JoinFailed { .. })));
        assert_eq!(a.state.current().follower, None);
    }

    #[tokio::test]
    async fn retried_join_gets_the_same_answer() {
        let network = LocalNetwork::new();
        let (mut b, _listener, _events) = network.standalone_node("b", 9);
        let joiner = NodeAddr::new("a");

        let first = b.handle_join(joiner.clone()).unwrap();
        // The first reply got lost, so the joiner asks again.
        let retried = b.handle_join(joiner.clone()).unwrap();

        assert_eq!(first, NodeAddr::new("b"));
        assert_eq!(retried, first);
        assert_eq!(b.membership.follower(), Some(&joiner));
    }

    #[tokio::test]
    async fn join_by_existing_follower_is_rejected() {
        let network = LocalNetwork::new();
        let (mut b, _listener, _events) = network.standalone_node("b", 9);
        b.membership.set_follower(Some(NodeAddr::new("a")));

        let result = b.handle_join(NodeAddr::new("a"));

        assert!(matches!(result, Err(JoinError::AlreadyFollower { .. })));
    }

    /// Answers every join with the joiner's own address.
    struct MirroringTransport;

    #[async_trait::async_trait]
    impl RingTransport for MirroringTransport {
        async fn join(&self, _: &NodeAddr, joiner: &NodeAddr) -> Result<NodeAddr, TransportError> {
            Ok(joiner.clone())
        }

        async fn leave(&self, _: &NodeAddr, _: LeaveNotice) -> Result<(), TransportError> {
            Ok(())
        }

        async fn deliver(&self, _: &NodeAddr, _: RingMessage) -> Result<(), TransportError> {
            Ok(())
        }

        async fn fetch_log(&self, _: &NodeAddr) -> Result<Vec<LogEntry>, TransportError> {
            Ok(Vec::new())
        }

        async fn heartbeat(&self, _: &NodeAddr, _: HeartbeatProbe) -> Result<(), TransportError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn connect_rejects_own_address_as_follower() {
        let me = NodeAddr::new("a");
        let (observers, _listener, _events) = crate::ring::observers::new(NodeSnapshot {
            address: me.clone(),
            uid: Uid::new(5),
            follower: None,
            leader: None,
            voting: false,
            log_len: 0,
        });
        let mut node = Node::new(NodeConfig {
            logger: test_utils::test_logger("a"),
            me,
            uid: Uid::new(5),
            call_timeout: Duration::from_secs(1),
            heartbeat_tolerance: test_utils::HEARTBEAT_TOLERANCE,
            max_uid_redraws: 16,
            transport: MirroringTransport,
            observers,
            heartbeat_timer: None,
            server_shutdown_handle: None,
        });

        let result = node.connect(NodeAddr::new("b")).await;

        match result {
            Err(ConnectError::JoinFailed {
                source: TransportError::MalformedResponse { .. },
                ..
            }) => {}
            other => panic!("Unexpected {:?}", other),
        }
        assert_eq!(node.membership.follower(), None);
    }

    #[tokio::test]
    async fn connect_to_unknown_node_fails() {
        let network = LocalNetwork::new();
        let a = network.spawn_node("a", 5);

        let result = a.client.connect(NodeAddr::new("nowhere")).await;

        match result {
            Err(ConnectError::JoinFailed {
                source: TransportError::ConnectionFailed { .. },
                ..
            }) => {}
            other => panic!("Unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn election_converges_on_largest_uid() {
        let network = LocalNetwork::new();
        let mut nodes = network.spawn_ring(&[("a", 5), ("b", 9), ("c", 2)]).await;

        nodes[0].client.start_election().await.unwrap();

        for node in nodes.iter_mut() {
            node.wait_for(|s| s.leader == Some(Uid::new(9)) && !s.voting).await;
        }
    }

    #[tokio::test]
    async fn leave_splices_predecessor_to_replacement() {
        let network = LocalNetwork::new();
        // a -> b -> c -> a, c leads.
        let mut nodes = network.spawn_ring(&[("a", 5), ("b", 2), ("c", 9)]).await;
        for node in nodes.iter_mut() {
            node.wait_for(|s| s.leader == Some(Uid::new(9)) && !s.voting).await;
        }

        nodes[1].client.leave().await.unwrap();

        let b = nodes[1].wait_for(|s| s.follower.is_none()).await;
        assert_ne!(b.uid, Uid::new(2), "reset draws a fresh uid");
        assert_eq!(b.leader, None);

        let c_addr = nodes[2].addr.clone();
        let a_addr = nodes[0].addr.clone();
        nodes[0]
            .wait_for(|s| s.follower == Some(c_addr.clone()) && s.log_len == 1)
            .await;
        nodes[2]
            .wait_for(|s| s.follower == Some(a_addr.clone()) && s.log_len == 1)
            .await;

        let log = nodes[2].client.fetch_log().await.unwrap();
        assert_eq!(
            log,
            vec![LogEntry {
                id: SeqId::new(1),
                payload: Payload::Control("b leaves.".into()),
            }]
        );

        // An election followed the splice and still lands on c.
        for i in [0, 2].iter() {
            nodes[*i].wait_for(|s| s.leader == Some(Uid::new(9)) && !s.voting).await;
        }
    }

    #[tokio::test]
    async fn departure_of_leader_is_announced_after_reelection() {
        let network = LocalNetwork::new();
        // a -> b -> c -> a, b leads.
        let mut nodes = network.spawn_ring(&[("a", 5), ("b", 9), ("c", 2)]).await;

        nodes[1].client.leave().await.unwrap();
        nodes[1].wait_for(|s| s.follower.is_none()).await;

        let announcement = vec![LogEntry {
            id: SeqId::new(1),
            payload: Payload::Control("b leaves.".into()),
        }];
        for i in [0, 2].iter() {
            nodes[*i]
                .wait_for(|s| s.leader == Some(Uid::new(5)) && !s.voting && s.log_len == 1)
                .await;
            assert_eq!(nodes[*i].client.fetch_log().await.unwrap(), announcement);
        }
    }

    #[tokio::test]
    async fn leave_of_two_node_ring_collapses() {
        let network = LocalNetwork::new();
        let mut nodes = network.spawn_ring(&[("a", 5), ("b", 9)]).await;

        nodes[1].client.leave().await.unwrap();

        nodes[0].wait_for(|s| s.follower.is_none()).await;
        nodes[1].wait_for(|s| s.follower.is_none() && s.leader.is_none()).await;
    }

    #[tokio::test]
    async fn leader_sequences_and_replicates() {
        let network = LocalNetwork::new();
        let mut nodes = network.spawn_ring(&[("a", 5), ("b", 9), ("c", 2)]).await;
        for node in nodes.iter_mut() {
            node.wait_for(|s| s.leader == Some(Uid::new(9)) && !s.voting).await;
        }

        nodes[1].client.submit(data("m1")).await.unwrap();
        nodes[1].client.submit(data("m2")).await.unwrap();
        // Relayed to the leader first.
        nodes[2].client.submit(data("m3")).await.unwrap();

        let expected = vec![
            LogEntry {
                id: SeqId::new(1),
                payload: data("m1"),
            },
            LogEntry {
                id: SeqId::new(2),
                payload: data("m2"),
            },
            LogEntry {
                id: SeqId::new(3),
                payload: data("m3"),
            },
        ];
        for node in nodes.iter_mut() {
            node.wait_for(|s| s.log_len == 3).await;
            assert_eq!(node.client.fetch_log().await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn clean_empties_every_log() {
        let network = LocalNetwork::new();
        let mut nodes = network.spawn_ring(&[("a", 5), ("b", 9), ("c", 2)]).await;
        for node in nodes.iter_mut() {
            node.wait_for(|s| s.leader == Some(Uid::new(9)) && !s.voting).await;
        }
        nodes[0].client.submit(data("m1")).await.unwrap();
        for node in nodes.iter_mut() {
            node.wait_for(|s| s.log_len == 1).await;
        }

        nodes[2].client.submit(Payload::Clean).await.unwrap();

        for node in nodes.iter_mut() {
            node.wait_for(|s| s.log_len == 0).await;
            node.wait_for_event(|e| *e == NodeEvent::Cleaned).await;
        }

        // Ids restart after a clean.
        nodes[0].client.submit(data("m2")).await.unwrap();
        nodes[0].wait_for(|s| s.log_len == 1).await;
        assert_eq!(
            nodes[0].client.fetch_log().await.unwrap(),
            vec![LogEntry {
                id: SeqId::new(1),
                payload: data("m2"),
            }]
        );
    }

    #[tokio::test]
    async fn joiner_receives_existing_log() {
        let network = LocalNetwork::new();
        let mut nodes = network.spawn_ring(&[("a", 5), ("b", 9)]).await;
        for node in nodes.iter_mut() {
            node.wait_for(|s| s.leader == Some(Uid::new(9)) && !s.voting).await;
        }
        nodes[0].client.submit(data("m1")).await.unwrap();
        for node in nodes.iter_mut() {
            node.wait_for(|s| s.log_len == 1).await;
        }

        let mut c = network.spawn_node("c", 2);
        c.client.connect(nodes[0].addr.clone()).await.unwrap();

        c.wait_for_event(|e| matches!(e, NodeEvent::Appended(entry) if entry.payload == data("m1")))
            .await;
        assert_eq!(c.state.current().log_len, 1);
    }

    #[tokio::test]
    async fn persistent_overwrite_is_idempotent() {
        let network = LocalNetwork::new();
        let a = network.spawn_node("a", 5);
        let persistent = |payload| {
            RingMessage::Persistent(PersistentMessage {
                origin: Uid::new(9),
                id: SeqId::new(3),
                payload,
            })
        };

        a.client.deliver(persistent(data("first"))).await.unwrap();
        a.client.deliver(persistent(data("second"))).await.unwrap();

        assert_eq!(
            a.client.fetch_log().await.unwrap(),
            vec![LogEntry {
                id: SeqId::new(3),
                payload: data("second"),
            }]
        );
    }

    #[tokio::test]
    async fn persistent_wave_stops_at_origin() {
        let network = LocalNetwork::new();
        let mut nodes = network.spawn_ring(&[("a", 5), ("b", 9)]).await;
        for node in nodes.iter_mut() {
            node.wait_for(|s| s.leader == Some(Uid::new(9)) && !s.voting).await;
        }
        let mut events = Vec::new();

        nodes[1].client.submit(data("m1")).await.unwrap();
        nodes[0].wait_for(|s| s.log_len == 1).await;
        // Give a runaway wave time to show up as extra appends.
        tokio::time::sleep(Duration::from_millis(50)).await;
        while let Ok(Some(event)) = tokio::time::timeout(Duration::from_millis(10), nodes[0].events.next()).await {
            if let NodeEvent::Appended(_) = event {
                events.push(event);
            }
        }

        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn submit_requires_follower() {
        let network = LocalNetwork::new();
        let a = network.spawn_node("a", 5);

        let result = a.client.submit(data("m1")).await;

        assert!(matches!(result, Err(SubmitError::NotConnected)));
    }

    #[tokio::test]
    async fn submit_without_leader_starts_election() {
        let network = LocalNetwork::new();
        let (mut node, _listener, _events) = network.standalone_node("a", 5);
        node.membership.set_follower(Some(NodeAddr::new("nowhere")));

        let result = node.submit(data("m1")).await;

        assert!(matches!(result, Err(SubmitError::NoLeader)));
        // The election token couldn't leave, so we aren't left campaigning.
        assert!(!node.election.is_voting());
    }

    #[tokio::test]
    async fn watchdog_expiry_splices_around_dead_node() {
        let network = LocalNetwork::new();
        // a -> b -> c -> a
        let mut nodes = network.spawn_ring(&[("a", 5), ("b", 9), ("c", 2)]).await;
        for node in nodes.iter_mut() {
            node.wait_for(|s| s.leader == Some(Uid::new(9)) && !s.voting).await;
        }

        network.kill(&nodes[1].addr);

        // c stops hearing from b. The correction travels c -> a, and a can't reach b.
        nodes[2].client.heartbeat_tick().await.unwrap();
        tokio::time::sleep(test_utils::HEARTBEAT_TOLERANCE * 2).await;
        nodes[2].client.heartbeat_tick().await.unwrap();

        let c_addr = nodes[2].addr.clone();
        nodes[0].wait_for(|s| s.follower == Some(c_addr.clone())).await;
        // The self-heal election picks the largest surviving uid.
        for i in [0, 2].iter() {
            nodes[*i].wait_for(|s| s.leader == Some(Uid::new(5)) && !s.voting).await;
        }
    }

    #[tokio::test]
    async fn watchdog_expiry_in_two_node_ring_leaves_survivor_alone() {
        let network = LocalNetwork::new();
        let mut nodes = network.spawn_ring(&[("a", 5), ("b", 9)]).await;

        network.kill(&nodes[1].addr);

        nodes[0].client.heartbeat_tick().await.unwrap();
        tokio::time::sleep(test_utils::HEARTBEAT_TOLERANCE * 2).await;
        nodes[0].client.heartbeat_tick().await.unwrap();

        nodes[0].wait_for(|s| s.follower.is_none()).await;
    }

    #[tokio::test]
    async fn heartbeat_keeps_watchdog_quiet() {
        let network = LocalNetwork::new();
        let (mut node, _listener, mut events) = network.standalone_node("a", 5);
        node.membership.set_follower(Some(NodeAddr::new("nowhere")));

        node.heartbeat_tick().await;
        tokio::time::sleep(test_utils::HEARTBEAT_TOLERANCE / 2).await;
        node.handle_heartbeat(HeartbeatProbe::Alive).await;
        tokio::time::sleep(test_utils::HEARTBEAT_TOLERANCE / 2).await;
        node.heartbeat_tick().await;

        assert_eq!(node.membership.follower(), Some(&NodeAddr::new("nowhere")));
        assert!(tokio::time::timeout(Duration::from_millis(10), events.next()).await.is_err());
    }

    #[tokio::test]
    async fn own_correction_is_absorbed() {
        let network = LocalNetwork::new();
        let (mut node, _listener, mut events) = network.standalone_node("a", 5);
        node.membership.set_follower(Some(NodeAddr::new("nowhere")));

        node.handle_heartbeat(HeartbeatProbe::Correction { host: NodeAddr::new("a") })
            .await;

        assert_eq!(node.membership.follower(), Some(&NodeAddr::new("nowhere")));
        assert!(tokio::time::timeout(Duration::from_millis(10), events.next()).await.is_err());
    }

    #[tokio::test]
    async fn foreign_correction_adopts_host_when_follower_is_dead() {
        let network = LocalNetwork::new();
        let (mut node, _listener, mut events) = network.standalone_node("a", 5);
        node.membership.set_follower(Some(NodeAddr::new("dead")));

        node.handle_heartbeat(HeartbeatProbe::Correction { host: NodeAddr::new("c") })
            .await;

        assert_eq!(node.membership.follower(), Some(&NodeAddr::new("c")));
        assert_eq!(
            events.next().await,
            Some(NodeEvent::Connected {
                follower: NodeAddr::new("c")
            })
        );
    }
}
