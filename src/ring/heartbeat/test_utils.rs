use crate::actor::Task;
use std::time::Duration;
use tokio::sync::mpsc;

/// TestUtilActor stands in for the dispatcher and lets timer tests assert on what got enqueued.
pub(crate) struct TestUtilActor {
    rx: mpsc::Receiver<Task>,
}

impl TestUtilActor {
    pub(crate) fn new(rx: mpsc::Receiver<Task>) -> Self {
        TestUtilActor { rx }
    }

    pub(crate) async fn assert_heartbeat_tick_event(&mut self) {
        let task = tokio::time::timeout(Duration::from_secs(5), self.rx.recv())
            .await
            .expect("Unexpected timeout")
            .expect("Expected value");

        match task {
            Task::HeartbeatTick => {}
            other => panic!("Expected HeartbeatTick, got {:?}", other),
        }
    }

    pub(crate) async fn assert_no_event(&mut self) {
        tokio::time::timeout(Duration::from_millis(10), self.rx.recv())
            .await
            .expect_err("Expected timeout");
    }
}
