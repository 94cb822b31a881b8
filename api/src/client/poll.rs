use std::{future::Future, time::Duration};

use tokio::{sync::oneshot, task::JoinHandle, time::MissedTickBehavior};

/// Stops the poller when cancelled or dropped.
pub struct PollHandle {
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Stops the poller and waits until the task has exited, so `tick` is
    /// never called again once this returns.
    pub async fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Poller ended abnormally");
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}

/// Runs `tick` on a tokio task right away and then every `period`. A tick
/// that overruns the period makes the poller skip the missed ones instead of
/// bursting to catch up. A tick in flight is abandoned on cancellation.
pub fn every<F, Fut>(period: Duration, mut tick: F) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                // resolves on send and on the sender being dropped
                _ = &mut cancel_rx => break,
                _ = async {
                    interval.tick().await;
                    tick().await;
                } => {}
            }
        }

        tracing::debug!("Poller stopped");
    });

    PollHandle {
        cancel: Some(cancel_tx),
        task: Some(task),
    }
}
