use crate::ring::peers::NodeAddr;

/// LeaveNotice circulates the ring when a node departs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LeaveNotice {
    pub leaving: NodeAddr,
    /// The departing node's own follower. `None` if it had none.
    pub replacement: Option<NodeAddr>,
}

/// What a node must do with a [`LeaveNotice`] it received, decided by [`RingMembership::route_leave`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum LeaveAction {
    /// The notice went all the way around and came back to the departing node.
    Complete,
    /// We aren't adjacent to the departing node. Pass the notice on unchanged.
    Relay(NodeAddr),
    /// We're the departing node's predecessor and the ring survives: adopt `replacement`.
    Splice { leaving: NodeAddr, replacement: NodeAddr },
    /// We're the departing node's predecessor and the replacement is ourselves. We're alone now.
    Collapse { leaving: NodeAddr },
    /// We have no follower to relay to. The ring is inconsistent with the notice.
    Stranded,
}

/// RingMembership owns this node's identity and its single successor pointer. Its methods only
/// decide; performing any outbound call is the caller's job.
pub(crate) struct RingMembership {
    me: NodeAddr,
    follower: Option<NodeAddr>,
}

impl RingMembership {
    pub(crate) fn new(me: NodeAddr) -> Self {
        RingMembership { me, follower: None }
    }

    pub(crate) fn me(&self) -> &NodeAddr {
        &self.me
    }

    pub(crate) fn follower(&self) -> Option<&NodeAddr> {
        self.follower.as_ref()
    }

    pub(crate) fn is_alone(&self) -> bool {
        self.follower.is_none()
    }

    pub(crate) fn set_follower(&mut self, follower: Option<NodeAddr>) {
        self.follower = follower;
    }

    /// `accept_joiner()` splices `joiner` in right after us and returns the address the joiner
    /// must adopt as its follower: our previous follower, or ourselves if we were alone.
    pub(crate) fn accept_joiner(&mut self, joiner: NodeAddr) -> NodeAddr {
        let old_follower = self.follower.replace(joiner);
        old_follower.unwrap_or_else(|| self.me.clone())
    }

    /// The notice this node sends to start leaving the ring.
    pub(crate) fn leave_notice(&self) -> LeaveNotice {
        LeaveNotice {
            leaving: self.me.clone(),
            replacement: self.follower.clone(),
        }
    }

    pub(crate) fn route_leave(&self, notice: &LeaveNotice) -> LeaveAction {
        if notice.leaving == self.me {
            return LeaveAction::Complete;
        }

        let follower = match &self.follower {
            Some(follower) => follower,
            None => return LeaveAction::Stranded,
        };

        if *follower != notice.leaving {
            return LeaveAction::Relay(follower.clone());
        }

        match &notice.replacement {
            Some(replacement) if *replacement != self.me => LeaveAction::Splice {
                leaving: notice.leaving.clone(),
                replacement: replacement.clone(),
            },
            // Replacement is us, or the departing node claims to have had no follower at all.
            // Either way nobody else is left for us to point at.
            _ => LeaveAction::Collapse {
                leaving: notice.leaving.clone(),
            },
        }
    }
}
