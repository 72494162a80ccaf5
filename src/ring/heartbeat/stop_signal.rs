use tokio::sync::oneshot;

/// Dropping the Stopper wakes whoever awaits the paired StopCheck.
pub(super) struct Stopper {
    _tx: oneshot::Sender<()>,
}

pub(super) struct StopCheck {
    rx: oneshot::Receiver<()>,
}

impl StopCheck {
    /// Resolves once the Stopper is gone. Await it at most once to completion.
    pub(super) async fn stopped(&mut self) {
        // Nothing is ever sent, so this only ever resolves with the sender dropped.
        let _ = (&mut self.rx).await;
    }
}

pub(super) fn new() -> (Stopper, StopCheck) {
    let (tx, rx) = oneshot::channel();

    (Stopper { _tx: tx }, StopCheck { rx })
}
