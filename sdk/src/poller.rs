//! Periodic refresh with caller-controlled cancellation.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Stops the paired [`Poller`]. Dropping the handle stops it too.
pub struct PollHandle {
    cancel: watch::Sender<bool>,
}

impl PollHandle {
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }
}

pub struct Poller {
    interval: Duration,
    cancelled: watch::Receiver<bool>,
}

pub fn poller(interval: Duration) -> (Poller, PollHandle) {
    let (tx, rx) = watch::channel(false);
    (
        Poller {
            interval,
            cancelled: rx,
        },
        PollHandle { cancel: tx },
    )
}

impl Poller {
    /// Run `tick` now and then every interval until cancelled. A tick that is
    /// already running finishes before the loop stops. Returns the number of
    /// completed ticks.
    pub async fn run<F, Fut>(mut self, mut tick: F) -> u64
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = 0u64;

        loop {
            if *self.cancelled.borrow() {
                break;
            }
            tokio::select! {
                biased;
                changed = self.cancelled.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    tick().await;
                    ticks += 1;
                }
            }
        }
        ticks
    }
}
