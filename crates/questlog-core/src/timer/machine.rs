use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::models::Quest;
use crate::storage::KeyValueStore;

use super::{elapsed_seconds, ActiveQuestRecord, Clock, Ticker, TimerTick};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running { quest_id: i64, started_at: i64 },
    /// A finish request is in flight. Further finishes are ignored.
    Finishing { quest_id: i64, started_at: i64 },
}

impl TimerState {
    pub fn quest_id(&self) -> Option<i64> {
        match self {
            TimerState::Idle => None,
            TimerState::Running { quest_id, .. } | TimerState::Finishing { quest_id, .. } => {
                Some(*quest_id)
            }
        }
    }

    fn started_at(&self) -> Option<i64> {
        match self {
            TimerState::Idle => None,
            TimerState::Running { started_at, .. } | TimerState::Finishing { started_at, .. } => {
                Some(*started_at)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// Another quest holds the timer; nothing changed.
    AlreadyRunning(i64),
    /// The quest is already completed on the server; nothing changed.
    QuestCompleted,
}

/// What to submit for a finish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinishRequest {
    pub quest_id: i64,
    pub duration_hours: f64,
}

#[derive(Debug)]
pub enum FinishOutcome {
    Completed(Quest),
    /// Finished elsewhere first. The timer is cleared all the same.
    AlreadyCompleted,
    /// The timer is running again and the finish can be retried.
    Failed(ApiError),
    /// The timer moved on while the request was in flight; result dropped.
    Stale,
}

/// The single active quest timer.
///
/// Every transition writes the persisted record first and then updates the
/// in-memory state, so the two never disagree after a call returns.
pub struct QuestTimer {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    state: TimerState,
    ticks: Option<mpsc::UnboundedSender<TimerTick>>,
    ticker: Option<Ticker>,
}

impl QuestTimer {
    /// An idle timer. Call `restore` to pick up a persisted record.
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            state: TimerState::Idle,
            ticks: None,
            ticker: None,
        }
    }

    /// Deliver one `TimerTick` per second to `tx` while a quest is timed.
    /// The ticker is spawned on the current tokio runtime.
    pub fn with_ticks(mut self, tx: mpsc::UnboundedSender<TimerTick>) -> Self {
        self.ticks = Some(tx);
        self.sync_ticker();
        self
    }

    /// Rebuild state from the persisted record.
    pub fn restore(&mut self) -> TimerState {
        self.state = match ActiveQuestRecord::load(self.store.as_ref()) {
            Some(record) => {
                info!(quest_id = record.id, "Restored running quest timer");
                TimerState::Running {
                    quest_id: record.id,
                    started_at: record.start,
                }
            }
            None => TimerState::Idle,
        };
        self.sync_ticker();
        self.state
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn active_quest(&self) -> Option<i64> {
        self.state.quest_id()
    }

    pub fn is_idle(&self) -> bool {
        self.state == TimerState::Idle
    }

    pub fn is_finishing(&self) -> bool {
        matches!(self.state, TimerState::Finishing { .. })
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn start(&mut self, quest: &Quest) -> Result<StartOutcome> {
        if let Some(active) = self.state.quest_id() {
            debug!(quest_id = quest.id, active, "Start ignored, a timer is already running");
            return Ok(StartOutcome::AlreadyRunning(active));
        }
        if quest.completed {
            debug!(quest_id = quest.id, "Start ignored, quest already completed");
            return Ok(StartOutcome::QuestCompleted);
        }

        let started_at = self.clock.now_millis();
        ActiveQuestRecord::new(quest.id, started_at).save(self.store.as_ref())?;

        self.state = TimerState::Running {
            quest_id: quest.id,
            started_at,
        };
        self.sync_ticker();
        info!(quest_id = quest.id, "Quest timer started");
        Ok(StartOutcome::Started)
    }

    /// Seconds since the timed quest started; 0 when idle.
    pub fn elapsed_seconds(&self) -> u64 {
        self.state
            .started_at()
            .map(|start| elapsed_seconds(start, self.clock.now_millis()))
            .unwrap_or(0)
    }

    pub fn tick(&self) -> Option<TimerTick> {
        self.state.quest_id().map(|quest_id| TimerTick {
            quest_id,
            elapsed_seconds: self.elapsed_seconds(),
        })
    }

    /// Enter `Finishing` and return what to submit. `None` unless running,
    /// which makes a second finish while one is in flight a no-op.
    pub fn begin_finish(&mut self) -> Option<FinishRequest> {
        let TimerState::Running {
            quest_id,
            started_at,
        } = self.state
        else {
            debug!(state = ?self.state, "Finish ignored, timer not running");
            return None;
        };

        let elapsed_millis = self.clock.now_millis().saturating_sub(started_at).max(0);
        self.state = TimerState::Finishing {
            quest_id,
            started_at,
        };

        Some(FinishRequest {
            quest_id,
            duration_hours: elapsed_millis as f64 / MILLIS_PER_HOUR,
        })
    }

    /// Apply the server's answer to a finish started with `begin_finish`.
    pub fn complete_finish(&mut self, quest_id: i64, result: ApiResult<Quest>) -> FinishOutcome {
        let TimerState::Finishing {
            quest_id: current,
            started_at,
        } = self.state
        else {
            debug!(quest_id, "Discarding finish result, timer no longer finishing");
            return FinishOutcome::Stale;
        };
        if current != quest_id {
            debug!(quest_id, current, "Discarding finish result for another quest");
            return FinishOutcome::Stale;
        }

        match result {
            Ok(quest) => {
                info!(quest_id, earned_xp = quest.earned_xp, "Quest finished");
                self.go_idle();
                FinishOutcome::Completed(quest)
            }
            Err(ApiError::QuestAlreadyCompleted) => {
                info!(quest_id, "Quest was already completed, clearing timer");
                self.go_idle();
                FinishOutcome::AlreadyCompleted
            }
            Err(e) => {
                warn!(quest_id, error = %e, "Finish failed, timer still running");
                self.state = TimerState::Running {
                    quest_id,
                    started_at,
                };
                FinishOutcome::Failed(e)
            }
        }
    }

    /// Begin, submit and complete a finish in one call. `None` if the timer
    /// was not running.
    pub async fn finish(&mut self, client: &ApiClient) -> Option<FinishOutcome> {
        let request = self.begin_finish()?;
        let result = client
            .finish_quest(request.quest_id, request.duration_hours)
            .await;
        Some(self.complete_finish(request.quest_id, result))
    }

    /// Stop timing `quest_id` if it is the active quest. Call before the
    /// quest is deleted on the server. Returns whether the timer was cleared.
    pub fn release(&mut self, quest_id: i64) -> bool {
        if self.state.quest_id() != Some(quest_id) {
            return false;
        }
        info!(quest_id, "Releasing timer for deleted quest");
        self.go_idle();
        true
    }

    /// Drop the timer when the server no longer lists its quest as open.
    /// Returns whether the timer was cleared.
    pub fn reconcile(&mut self, quests: &[Quest]) -> bool {
        let Some(active) = self.state.quest_id() else {
            return false;
        };
        let still_open = quests.iter().any(|q| q.id == active && !q.completed);
        if still_open {
            return false;
        }
        info!(quest_id = active, "Active quest missing or completed on server, clearing timer");
        self.go_idle();
        true
    }

    fn go_idle(&mut self) {
        if let Err(e) = ActiveQuestRecord::clear(self.store.as_ref()) {
            warn!(error = %e, "Failed to clear active quest record");
        }
        self.state = TimerState::Idle;
        self.sync_ticker();
    }

    /// Arm or cancel the ticker to match the current state.
    fn sync_ticker(&mut self) {
        let wanted = self
            .state
            .quest_id()
            .zip(self.state.started_at())
            .zip(self.ticks.as_ref());

        match wanted {
            Some(((quest_id, started_at), tx)) => {
                if self.ticker.as_ref().map(Ticker::quest_id) != Some(quest_id) {
                    self.ticker = Some(Ticker::spawn(
                        quest_id,
                        started_at,
                        self.clock.clone(),
                        tx.clone(),
                    ));
                }
            }
            None => self.ticker = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::mock::MockTransport;
    use crate::auth::Session;
    use crate::events::SessionEvents;
    use crate::models::Difficulty;
    use crate::storage::{MemoryStore, ACTIVE_QUEST_KEY, AUTH_HEADER_KEY};
    use crate::timer::test_clock::ManualClock;

    fn quest(id: i64, completed: bool) -> Quest {
        Quest {
            id,
            title: format!("Quest {id}"),
            difficulty: Difficulty::Easy,
            earned_xp: 0,
            completed,
            goal: None,
        }
    }

    fn timer_at(now: i64) -> (QuestTimer, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(now));
        (QuestTimer::new(store.clone(), clock.clone()), store, clock)
    }

    fn client(transport: Arc<MockTransport>) -> ApiClient {
        let store = Arc::new(MemoryStore::new());
        store.set(AUTH_HEADER_KEY, "Basic YXNoOnBpa2FjaHU=").unwrap();
        ApiClient::new(transport, Session::new(store), SessionEvents::new())
    }

    #[test]
    fn test_start_persists_record() {
        let (mut timer, store, _) = timer_at(1_000);

        assert_eq!(timer.start(&quest(42, false)).unwrap(), StartOutcome::Started);

        assert_eq!(
            timer.state(),
            TimerState::Running {
                quest_id: 42,
                started_at: 1_000
            }
        );
        assert_eq!(
            ActiveQuestRecord::load(store.as_ref()),
            Some(ActiveQuestRecord::new(42, 1_000))
        );
    }

    #[test]
    fn test_second_start_is_noop() {
        let (mut timer, store, clock) = timer_at(0);
        timer.start(&quest(1, false)).unwrap();
        clock.advance(3_000);

        assert_eq!(
            timer.start(&quest(2, false)).unwrap(),
            StartOutcome::AlreadyRunning(1)
        );
        assert_eq!(
            timer.start(&quest(1, false)).unwrap(),
            StartOutcome::AlreadyRunning(1)
        );
        assert_eq!(timer.active_quest(), Some(1));
        assert_eq!(
            ActiveQuestRecord::load(store.as_ref()),
            Some(ActiveQuestRecord::new(1, 0))
        );
    }

    #[test]
    fn test_completed_quest_cannot_start() {
        let (mut timer, store, _) = timer_at(0);
        assert_eq!(
            timer.start(&quest(1, true)).unwrap(),
            StartOutcome::QuestCompleted
        );
        assert!(timer.is_idle());
        assert!(!store.contains(ACTIVE_QUEST_KEY).unwrap());
    }

    #[test]
    fn test_restore_reports_elapsed_since_recorded_start() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(0));
        let mut before = QuestTimer::new(store.clone(), clock.clone());
        before.start(&quest(42, false)).unwrap();
        drop(before);

        clock.set(5_000);
        let mut after = QuestTimer::new(store.clone(), clock.clone());
        after.restore();

        assert_eq!(after.active_quest(), Some(42));
        assert_eq!(
            after.tick(),
            Some(TimerTick {
                quest_id: 42,
                elapsed_seconds: 5
            })
        );

        let mut last = after.elapsed_seconds();
        for _ in 0..5 {
            clock.advance(700);
            let now = after.elapsed_seconds();
            assert!(now >= last);
            last = now;
        }
        assert_eq!(last, 8);
    }

    #[test]
    fn test_restore_with_malformed_record_is_idle() {
        let (mut timer, store, _) = timer_at(0);
        store.set(ACTIVE_QUEST_KEY, "{broken").unwrap();

        assert_eq!(timer.restore(), TimerState::Idle);
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.elapsed_seconds(), 0);
        assert!(!store.contains(ACTIVE_QUEST_KEY).unwrap());
    }

    #[test]
    fn test_begin_finish_computes_hours_once() {
        let (mut timer, _, clock) = timer_at(0);
        timer.start(&quest(3, false)).unwrap();
        clock.set(5_400_000);

        let request = timer.begin_finish().unwrap();
        assert_eq!(request.quest_id, 3);
        assert!((request.duration_hours - 1.5).abs() < f64::EPSILON);
        assert!(timer.is_finishing());

        assert_eq!(timer.begin_finish(), None);
    }

    #[test]
    fn test_finish_success_clears_record() {
        let (mut timer, store, _) = timer_at(0);
        timer.start(&quest(3, false)).unwrap();
        timer.begin_finish().unwrap();

        let outcome = timer.complete_finish(3, Ok(quest(3, true)));

        assert!(matches!(outcome, FinishOutcome::Completed(ref q) if q.completed));
        assert!(timer.is_idle());
        assert!(!store.contains(ACTIVE_QUEST_KEY).unwrap());
    }

    #[test]
    fn test_already_completed_clears_record() {
        let (mut timer, store, _) = timer_at(0);
        timer.start(&quest(3, false)).unwrap();
        timer.begin_finish().unwrap();

        let outcome = timer.complete_finish(3, Err(ApiError::QuestAlreadyCompleted));

        assert!(matches!(outcome, FinishOutcome::AlreadyCompleted));
        assert!(timer.is_idle());
        assert!(!store.contains(ACTIVE_QUEST_KEY).unwrap());
    }

    #[test]
    fn test_other_failure_rearms() {
        let (mut timer, store, _) = timer_at(0);
        timer.start(&quest(3, false)).unwrap();
        timer.begin_finish().unwrap();

        let outcome = timer.complete_finish(
            3,
            Err(ApiError::Request {
                operation: "finish quest".to_string(),
                status: 400,
                body: String::new(),
            }),
        );

        assert!(matches!(outcome, FinishOutcome::Failed(_)));
        assert_eq!(
            timer.state(),
            TimerState::Running {
                quest_id: 3,
                started_at: 0
            }
        );
        assert!(store.contains(ACTIVE_QUEST_KEY).unwrap());
        assert!(timer.begin_finish().is_some());
    }

    #[test]
    fn test_result_after_release_is_stale() {
        let (mut timer, store, _) = timer_at(0);
        timer.start(&quest(3, false)).unwrap();
        timer.begin_finish().unwrap();
        assert!(timer.release(3));

        let outcome = timer.complete_finish(3, Err(ApiError::NoCredential));

        assert!(matches!(outcome, FinishOutcome::Stale));
        assert!(timer.is_idle());
        assert!(!store.contains(ACTIVE_QUEST_KEY).unwrap());
    }

    #[test]
    fn test_release_only_matches_active_quest() {
        let (mut timer, store, _) = timer_at(0);
        timer.start(&quest(5, false)).unwrap();

        assert!(!timer.release(6));
        assert_eq!(timer.active_quest(), Some(5));

        assert!(timer.release(5));
        assert!(timer.is_idle());
        assert!(!store.contains(ACTIVE_QUEST_KEY).unwrap());
    }

    #[test]
    fn test_reconcile() {
        let (mut timer, store, _) = timer_at(0);
        timer.start(&quest(5, false)).unwrap();

        assert!(!timer.reconcile(&[quest(4, false), quest(5, false)]));
        assert_eq!(timer.active_quest(), Some(5));

        assert!(timer.reconcile(&[quest(4, false), quest(5, true)]));
        assert!(timer.is_idle());
        assert!(!store.contains(ACTIVE_QUEST_KEY).unwrap());

        timer.start(&quest(4, false)).unwrap();
        assert!(timer.reconcile(&[]));
        assert!(timer.is_idle());
    }

    #[tokio::test]
    async fn test_finish_round_trip() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            200,
            r#"{"id":42,"title":"Write docs","difficulty":"Easy","earnedXp":10,"completed":true}"#,
        );
        let api = client(transport.clone());
        let (mut timer, store, clock) = timer_at(0);
        timer.start(&quest(42, false)).unwrap();
        clock.set(3_600_000);

        let outcome = timer.finish(&api).await.unwrap();

        assert!(matches!(outcome, FinishOutcome::Completed(ref q) if q.earned_xp == 10));
        assert!(timer.is_idle());
        assert!(!store.contains(ACTIVE_QUEST_KEY).unwrap());
        assert_eq!(
            transport.requests()[0].query,
            vec![("hours".to_string(), "1".to_string())]
        );

        assert!(timer.finish(&api).await.is_none());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_finish_race_reaches_idle() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(500, r#"{"message":"Quest already completed"}"#);
        let api = client(transport);
        let (mut timer, store, _) = timer_at(0);
        timer.start(&quest(42, false)).unwrap();

        let outcome = timer.finish(&api).await.unwrap();

        assert!(matches!(outcome, FinishOutcome::AlreadyCompleted));
        assert!(timer.is_idle());
        assert!(!store.contains(ACTIVE_QUEST_KEY).unwrap());
        assert!(api.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_follows_state() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (timer, _, _) = timer_at(0);
        let mut timer = timer.with_ticks(tx);
        assert!(!timer.is_ticking());

        timer.start(&quest(9, false)).unwrap();
        assert!(timer.is_ticking());
        assert_eq!(rx.recv().await.unwrap().quest_id, 9);

        timer.begin_finish().unwrap();
        assert!(timer.is_ticking());

        timer.complete_finish(9, Err(ApiError::QuestAlreadyCompleted));
        assert!(!timer.is_ticking());

        timer.start(&quest(10, false)).unwrap();
        assert!(timer.is_ticking());
        assert!(timer.reconcile(&[]));
        assert!(!timer.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_arms_ticker() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let (timer, store, _) = timer_at(5_000);
        ActiveQuestRecord::new(42, 0).save(store.as_ref()).unwrap();
        let mut timer = timer.with_ticks(tx);

        timer.restore();

        assert!(timer.is_ticking());
        assert_eq!(timer.elapsed_seconds(), 5);
    }
}
