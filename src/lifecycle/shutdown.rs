//! One-shot stop signal for cooperative cancellation.

use tokio::sync::watch;

/// Coordinator for stopping a group of cooperating tasks.
///
/// Any holder can trigger it; every subscriber observes it, including
/// subscribers created after the trigger. Triggering twice is a no-op.
#[derive(Debug, Clone)]
pub struct StopSignal {
    tx: watch::Sender<bool>,
}

impl StopSignal {
    /// Create a new, untriggered signal.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Subscribe to the stop signal.
    pub fn subscribe(&self) -> StopListener {
        StopListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the stop signal.
    pub fn trigger(&self) {
        self.tx.send_if_modified(|stopped| {
            let changed = !*stopped;
            *stopped = true;
            changed
        });
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of a [`StopSignal`].
#[derive(Debug, Clone)]
pub struct StopListener {
    rx: watch::Receiver<bool>,
}

impl StopListener {
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the signal is triggered.
    ///
    /// Also resolves if every `StopSignal` handle is dropped, since nothing
    /// can trigger it any more.
    pub async fn stopped(&mut self) {
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }
}
