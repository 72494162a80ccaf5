use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;

/// SeqId is the leader-assigned position of a message in the replicated log. Starts from 1.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct SeqId(u64);

impl SeqId {
    /// Placeholder id carried by a clean command.
    pub(crate) const CLEAN: SeqId = SeqId(0);

    pub fn new(id: u64) -> Self {
        SeqId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SeqId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload is what travels through the ring toward the leader and then around as a
/// sequenced message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Payload {
    /// Application data, opaque to the ring.
    Data(Bytes),
    /// Human readable announcement, e.g. a node leaving.
    Control(String),
    /// Wipe the log. Never stored itself.
    Clean,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogEntry {
    pub id: SeqId,
    pub payload: Payload,
}

#[derive(Debug, Eq, PartialEq)]
pub(crate) enum Applied {
    Stored,
    /// The exact same entry was already present.
    AlreadyPresent,
    Cleaned,
}

/// MessageLog is the node-local copy of the replicated log.
#[derive(Default)]
pub(crate) struct MessageLog {
    entries: BTreeMap<SeqId, Payload>,
}

impl MessageLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Id a sequencer hands out next. Only meaningful on the node that believes itself leader.
    pub(crate) fn next_id(&self) -> SeqId {
        SeqId(self.entries.len() as u64 + 1)
    }

    /// Sequence `payload` locally. Returns the assigned id, or `None` for a clean command.
    pub(crate) fn sequence(&mut self, payload: Payload) -> Option<SeqId> {
        match payload {
            Payload::Clean => {
                self.clean();
                None
            }
            payload => {
                let id = self.next_id();
                self.entries.insert(id, payload);
                Some(id)
            }
        }
    }

    /// Apply a leader-sequenced payload at `id`. Re-applying an id overwrites it.
    pub(crate) fn apply(&mut self, id: SeqId, payload: Payload) -> Applied {
        if let Payload::Clean = payload {
            self.clean();
            return Applied::Cleaned;
        }

        if self.entries.get(&id) == Some(&payload) {
            return Applied::AlreadyPresent;
        }

        self.entries.insert(id, payload);
        Applied::Stored
    }

    pub(crate) fn clean(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .iter()
            .map(|(id, payload)| LogEntry {
                id: *id,
                payload: payload.clone(),
            })
            .collect()
    }

    /// Swap in a snapshot fetched from another node.
    pub(crate) fn replace(&mut self, snapshot: Vec<LogEntry>) {
        self.entries = snapshot
            .into_iter()
            .filter(|entry| entry.payload != Payload::Clean)
            .map(|entry| (entry.id, entry.payload))
            .collect();
    }
}
