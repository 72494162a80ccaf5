use crate::actor::WeakActorClient;
use crate::ring::heartbeat::stop_signal;
use crate::ring::heartbeat::time::{Clock, RealClock};
use tokio::time::{Duration, Instant};

/// HeartbeatTimerHandle keeps the heartbeat ticker alive. Dropping it stops the ticker.
pub(crate) struct HeartbeatTimerHandle {
    _to_drop: stop_signal::Stopper,
}

/// The ticker only enqueues `HeartbeatTick` tasks. Sending probes and checking the watchdog
/// happen on the dispatcher like every other state-touching operation.
struct HeartbeatTimerTask<C: Clock> {
    interval: Duration,
    actor_client: WeakActorClient,
    clock: C,
    first_tick: Instant,
    stop_check: stop_signal::StopCheck,
}

impl HeartbeatTimerHandle {
    pub(crate) fn spawn_timer_task(interval: Duration, actor_client: WeakActorClient) -> Self {
        let (task, handle) = HeartbeatTimerTask::new(interval, actor_client, RealClock);
        tokio::task::spawn(task.run());

        handle
    }
}

impl<C: Clock + Send + Sync + 'static> HeartbeatTimerTask<C> {
    fn new(interval: Duration, actor_client: WeakActorClient, clock: C) -> (Self, HeartbeatTimerHandle) {
        let (stopper, stop_check) = stop_signal::new();

        // Counted from creation, not from when the spawned task first gets polled.
        let first_tick = clock.now() + interval;
        let task = HeartbeatTimerTask {
            interval,
            actor_client,
            clock,
            first_tick,
            stop_check,
        };
        let handle = HeartbeatTimerHandle { _to_drop: stopper };

        (task, handle)
    }

    async fn run(mut self) {
        let mut next_tick = self.first_tick;
        loop {
            tokio::select! {
                biased;
                _ = self.stop_check.stopped() => return,
                _ = self.clock.sleep_until(next_tick) => {}
            }

            if self.actor_client.heartbeat_tick().await.is_err() {
                // Dispatcher is gone, nobody left to tick for.
                return;
            }

            // Missed deadlines are skipped, never caught up on.
            next_tick += self.interval;
            let now = self.clock.now();
            if next_tick <= now {
                next_tick = now + self.interval;
            }
        }
    }
}
