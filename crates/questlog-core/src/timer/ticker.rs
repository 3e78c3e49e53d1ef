use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::{elapsed_seconds, Clock};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Elapsed time of the running quest, sent once per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    pub quest_id: i64,
    pub elapsed_seconds: u64,
}

/// Handle to the tick task. The task is aborted when the handle is dropped,
/// and exits on its own once the receiver is gone.
pub struct Ticker {
    quest_id: i64,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn the tick task. Must be called inside a tokio runtime.
    pub fn spawn(
        quest_id: i64,
        started_at: i64,
        clock: Arc<dyn Clock>,
        tx: mpsc::UnboundedSender<TimerTick>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let tick = TimerTick {
                    quest_id,
                    elapsed_seconds: elapsed_seconds(started_at, clock.now_millis()),
                };
                if tx.send(tick).is_err() {
                    debug!(quest_id, "Tick receiver closed, stopping ticker");
                    break;
                }
            }
        });
        debug!(quest_id, "Ticker armed");
        Self { quest_id, handle }
    }

    pub fn quest_id(&self) -> i64 {
        self.quest_id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
        debug!(quest_id = self.quest_id, "Ticker cancelled");
    }
}
