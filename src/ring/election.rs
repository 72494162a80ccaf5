use crate::actor::ActorExited;
use crate::ring::transport::TransportError;
use rand::Rng;
use std::fmt;

/// Uid is the randomly drawn identifier a node campaigns with. The largest one wins.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct Uid(u64);

impl Uid {
    /// Candidate value used to kick off an election. Lower than any drawn uid.
    pub(crate) const NOBODY: Uid = Uid(0);

    const MIN: u64 = 1;
    const MAX: u64 = 100_000_000;

    pub fn new(uid: u64) -> Self {
        Uid(uid)
    }

    pub(crate) fn random() -> Self {
        Uid(rand::thread_rng().gen_range(Self::MIN..=Self::MAX))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two token shapes of the ring election. Both are always sent to our own follower.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ElectionMessage {
    Election { candidate: Uid },
    Elected { leader: Uid },
}

#[derive(Debug, Eq, PartialEq)]
pub(crate) enum ElectionOutcome {
    Forward(ElectionMessage),
    /// A smaller candidate reached a node that is already campaigning. Drop it.
    Swallow,
    /// Our own announcement made it around the ring.
    Finished,
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum ElectionError {
    #[error("uid still collides after {redraws} redraws")]
    IdentifierCollision { redraws: usize },
    #[error("node has no follower to pass the election token to")]
    NotConnected,
    #[error("could not pass the election token on")]
    Network(#[source] TransportError),
    #[error("node task dispatcher has exited")]
    ActorExited,
}

impl From<ActorExited> for ElectionError {
    fn from(_: ActorExited) -> Self {
        ElectionError::ActorExited
    }
}

type UidSource = Box<dyn FnMut() -> Uid + Send + Sync>;

/// ElectionState tracks this node's side of the unidirectional ring election (Chang-Roberts
/// style, largest uid wins). It only decides what to forward; sending is up to the caller.
pub(crate) struct ElectionState {
    uid: Uid,
    leader: Option<Uid>,
    voting: bool,
    max_uid_redraws: usize,
    uid_source: UidSource,
}

impl ElectionState {
    pub(crate) fn new(uid: Uid, max_uid_redraws: usize) -> Self {
        Self::with_uid_source(uid, max_uid_redraws, Box::new(Uid::random))
    }

    fn with_uid_source(uid: Uid, max_uid_redraws: usize, uid_source: UidSource) -> Self {
        ElectionState {
            uid,
            leader: None,
            voting: false,
            max_uid_redraws,
            uid_source,
        }
    }

    pub(crate) fn uid(&self) -> Uid {
        self.uid
    }

    pub(crate) fn leader(&self) -> Option<Uid> {
        self.leader
    }

    pub(crate) fn is_voting(&self) -> bool {
        self.voting
    }

    pub(crate) fn is_leader(&self) -> bool {
        self.leader == Some(self.uid)
    }

    /// Undo the voting mark of a token that never left this node.
    pub(crate) fn restore_voting(&mut self, voting: bool) {
        self.voting = voting;
    }

    /// Back to the blank state of a freshly started node, including a new uid.
    pub(crate) fn reset(&mut self) {
        self.uid = (self.uid_source)();
        self.leader = None;
        self.voting = false;
    }

    pub(crate) fn on_election(&mut self, candidate: Uid) -> Result<ElectionOutcome, ElectionError> {
        self.leader = None;

        let mut redraws = 0;
        loop {
            if candidate > self.uid {
                self.voting = true;
                return Ok(ElectionOutcome::Forward(ElectionMessage::Election { candidate }));
            }

            if candidate < self.uid {
                if self.voting {
                    return Ok(ElectionOutcome::Swallow);
                }
                self.voting = true;
                return Ok(ElectionOutcome::Forward(ElectionMessage::Election { candidate: self.uid }));
            }

            if self.voting {
                // Our candidacy survived a full lap.
                self.leader = Some(self.uid);
                self.voting = false;
                return Ok(ElectionOutcome::Forward(ElectionMessage::Elected { leader: self.uid }));
            }

            // Equal but we never campaigned: someone else drew our uid.
            if redraws >= self.max_uid_redraws {
                return Err(ElectionError::IdentifierCollision { redraws });
            }
            redraws += 1;
            self.uid = (self.uid_source)();
        }
    }

    pub(crate) fn on_elected(&mut self, leader: Uid) -> ElectionOutcome {
        if leader == self.uid {
            return ElectionOutcome::Finished;
        }

        self.voting = false;
        self.leader = Some(leader);
        ElectionOutcome::Forward(ElectionMessage::Elected { leader })
    }
}
