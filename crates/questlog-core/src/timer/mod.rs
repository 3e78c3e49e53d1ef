//! The active quest timer.
//!
//! At most one quest is timed per client. Its start time is persisted under
//! `ACTIVE_QUEST_KEY`, so elapsed time survives restarts: it is always
//! recomputed from the durable start rather than counted.
//!
//! - `QuestTimer`: the `Idle -> Running -> Finishing -> Idle` state machine
//! - `ActiveQuestRecord`: the persisted `{id, start}` record
//! - `Ticker`: the one-second task that reports elapsed time while running

pub mod machine;
pub mod record;
pub mod ticker;

pub use machine::{FinishOutcome, FinishRequest, QuestTimer, StartOutcome, TimerState};
pub use record::ActiveQuestRecord;
pub use ticker::{Ticker, TimerTick};

/// Wall-clock source, in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Whole seconds between `started_at` and `now`. A start in the future
/// (clock skew) counts as zero.
pub fn elapsed_seconds(started_at: i64, now: i64) -> u64 {
    (now.saturating_sub(started_at).max(0) / 1000) as u64
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_clock {
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::Clock;

    /// A clock that only moves when told to.
    pub struct ManualClock {
        now: AtomicI64,
    }

    impl ManualClock {
        pub fn new(now_millis: i64) -> Self {
            Self {
                now: AtomicI64::new(now_millis),
            }
        }

        pub fn set(&self, now_millis: i64) {
            self.now.store(now_millis, Ordering::SeqCst);
        }

        pub fn advance(&self, millis: i64) {
            self.now.fetch_add(millis, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            self.now.load(Ordering::SeqCst)
        }
    }
}
