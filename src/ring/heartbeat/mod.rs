mod stop_signal;
mod time;
mod timer;

#[cfg(test)]
mod test_utils;

pub(crate) use timer::HeartbeatTimerHandle;

use crate::ring::peers::NodeAddr;
use tokio::time::{Duration, Instant};

/// What arrives at the heartbeat endpoint.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HeartbeatProbe {
    /// Plain liveness probe from our predecessor.
    Alive,
    /// A panicking node suggests `host` as the point to splice around a dead node.
    Correction { host: NodeAddr },
}

/// LivenessWatchdog decides when our predecessor has gone quiet for too long.
pub(crate) struct LivenessWatchdog {
    tolerance: Duration,
    last_heartbeat: Option<Instant>,
}

impl LivenessWatchdog {
    pub(crate) fn new(tolerance: Duration) -> Self {
        LivenessWatchdog {
            tolerance,
            last_heartbeat: None,
        }
    }

    pub(crate) fn last_heartbeat(&self) -> Option<Instant> {
        self.last_heartbeat
    }

    pub(crate) fn record_heartbeat(&mut self, now: Instant) {
        self.last_heartbeat = Some(now);
    }

    /// Forget the last probe, e.g. when our predecessor changes.
    pub(crate) fn disarm(&mut self) {
        self.last_heartbeat = None;
    }

    /// `expired()` is checked on every heartbeat tick while we have a follower. The first check
    /// after arming starts the tolerance window instead of firing.
    pub(crate) fn expired(&mut self, now: Instant) -> bool {
        match self.last_heartbeat {
            None => {
                self.last_heartbeat = Some(now);
                false
            }
            Some(last) => now.saturating_duration_since(last) > self.tolerance,
        }
    }
}
