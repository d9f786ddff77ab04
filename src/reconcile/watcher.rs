use std::time::Duration;

use alloy::primitives::Address;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::{PassResult, ReconciliationController};

/// Keeps one user's membership view fresh: a pass on start, one per
/// interval, and one per manual refresh. Every settled pass is published
/// on a watch channel.
pub struct MembershipWatcher {
    trigger: mpsc::Sender<()>,
    updates: watch::Receiver<Option<PassResult>>,
    task: JoinHandle<()>,
}

impl MembershipWatcher {
    pub fn spawn(controller: ReconciliationController, user: Address, interval: Duration) -> Self {
        let (tx, updates) = watch::channel(None);
        let (trigger, mut trigger_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    Some(()) = trigger_rx.recv() => {
                        debug!(%user, "manual refresh");
                    }
                }

                let result = controller.refresh(user).await;

                // Triggers that arrived while the pass ran were served by it.
                while trigger_rx.try_recv().is_ok() {}
                tx.send_replace(Some(result));
            }
        });

        MembershipWatcher {
            trigger,
            updates,
            task,
        }
    }

    /// Request a pass now. Requests made while one is queued or running
    /// fold into it.
    pub fn refresh(&self) {
        let _ = self.trigger.try_send(());
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<PassResult>> {
        self.updates.clone()
    }

    /// Last published outcome, if any pass has settled yet.
    pub fn latest(&self) -> Option<PassResult> {
        self.updates.borrow().clone()
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for MembershipWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}
