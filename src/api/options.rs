use std::convert::TryFrom;
use tokio::time::Duration;

#[derive(Clone, Default)]
pub struct RingOptions {
    /// How often a node probes its follower.
    pub heartbeat_interval: Option<Duration>,
    /// How long a node waits for a probe from its predecessor before panicking.
    pub heartbeat_tolerance: Option<Duration>,
    /// Deadline of every outbound call.
    pub call_timeout: Option<Duration>,
    pub queue_capacity: Option<usize>,
    pub max_uid_redraws: Option<usize>,
}

pub(super) struct RingOptionsValidated {
    pub heartbeat_interval: Duration,
    pub heartbeat_tolerance: Duration,
    pub call_timeout: Duration,
    pub queue_capacity: usize,
    pub max_uid_redraws: usize,
}

impl RingOptionsValidated {
    fn validate(&self) -> Result<(), &'static str> {
        if self.heartbeat_interval == Duration::from_secs(0) {
            return Err("Heartbeat interval must be non-zero");
        }
        if self.heartbeat_tolerance <= self.heartbeat_interval {
            return Err("Heartbeat tolerance must be greater than the heartbeat interval");
        }
        if self.call_timeout == Duration::from_secs(0) {
            return Err("Call timeout must be non-zero");
        }
        if self.call_timeout >= self.heartbeat_interval {
            return Err("Call timeout must be less than the heartbeat interval");
        }
        if self.queue_capacity == 0 {
            return Err("Queue capacity must be non-zero");
        }
        if self.max_uid_redraws == 0 {
            return Err("Max uid redraws must be non-zero");
        }

        Ok(())
    }
}

impl TryFrom<RingOptions> for RingOptionsValidated {
    type Error = &'static str;

    fn try_from(options: RingOptions) -> Result<Self, Self::Error> {
        let values = RingOptionsValidated {
            heartbeat_interval: options.heartbeat_interval.unwrap_or(Duration::from_secs(5)),
            heartbeat_tolerance: options.heartbeat_tolerance.unwrap_or(Duration::from_secs(11)),
            call_timeout: options.call_timeout.unwrap_or(Duration::from_millis(500)),
            queue_capacity: options.queue_capacity.unwrap_or(10),
            max_uid_redraws: options.max_uid_redraws.unwrap_or(16),
        };

        values.validate()?;
        Ok(values)
    }
}
