//! Application state management for questlog.
//!
//! This module contains the core `App` struct that manages all application state,
//! including UI state, fetched data, the quest timer, and background task coordination.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use questlog_core::api::{ApiClient, ApiError, ApiResult, ReqwestTransport};
use questlog_core::auth::{AuthMode, Credentials, Session};
use questlog_core::config::Config;
use questlog_core::events::{SessionEvent, SessionEvents};
use questlog_core::models::{
    Achievements, AdminUser, Dashboard, Goal, Quest, WorkRequest, WorkSession,
};
use questlog_core::storage::KeyValueStore;
use questlog_core::timer::{
    Clock, FinishOutcome, QuestTimer, StartOutcome, SystemClock, TimerTick,
};

use crate::form::{Form, FormKind};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Quests,
    Goals,
    Achievements,
    Profile,
    Admin,
}

const USER_TABS: [Tab; 5] = [
    Tab::Dashboard,
    Tab::Quests,
    Tab::Goals,
    Tab::Achievements,
    Tab::Profile,
];

const ADMIN_TABS: [Tab; 6] = [
    Tab::Dashboard,
    Tab::Quests,
    Tab::Goals,
    Tab::Achievements,
    Tab::Profile,
    Tab::Admin,
];

impl Tab {
    /// Tabs shown for a user; Admin only appears for the ADMIN role.
    pub fn visible(is_admin: bool) -> &'static [Tab] {
        if is_admin {
            &ADMIN_TABS
        } else {
            &USER_TABS
        }
    }

    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Quests => "Quests",
            Tab::Goals => "Goals",
            Tab::Achievements => "Achievements",
            Tab::Profile => "Profile",
            Tab::Admin => "Admin",
        }
    }

    /// Get the next visible tab (wrapping around)
    pub fn next(&self, is_admin: bool) -> Self {
        let tabs = Self::visible(is_admin);
        let i = tabs.iter().position(|t| t == self).unwrap_or(0);
        tabs[(i + 1) % tabs.len()]
    }

    /// Get the previous visible tab (wrapping around)
    pub fn prev(&self, is_admin: bool) -> Self {
        let tabs = Self::visible(is_admin);
        let i = tabs.iter().position(|t| t == self).unwrap_or(0);
        tabs[(i + tabs.len() - 1) % tabs.len()]
    }
}

/// What a delete confirmation will remove
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    Quest(i64),
    Goal(i64),
    User(i64),
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    LoggingIn,
    Normal,
    ShowingHelp,
    Editing(FormKind),
    ConfirmingDelete(DeleteTarget),
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Mode,
    Button,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from background tasks back to the main loop.
enum TaskResult {
    Dashboard(Dashboard),
    WorkSessions(Vec<WorkSession>),
    /// `timer_starts` is the start count when the fetch was issued.
    Quests { quests: Vec<Quest>, timer_starts: u64 },
    Goals(Vec<Goal>),
    Achievements(Achievements),
    AdminUsers(Vec<AdminUser>),
    QuestCreated(Quest),
    QuestDeleted(i64),
    GoalSaved(Goal),
    GoalDeleted(i64),
    UserDeleted(i64),
    StatusUpdated(String),
    ProfileUpdated(Dashboard),
    WorkLogged(WorkSession),
    Finished { quest_id: i64, result: ApiResult<Quest> },
    Failed(ApiError),
}

/// A task result tagged with the session generation that issued it.
struct TaskMessage {
    generation: u64,
    result: TaskResult,
}

/// Shorthand for the tasks that spawn one gateway call and report its result.
fn report<T>(result: ApiResult<T>, wrap: impl FnOnce(T) -> TaskResult) -> TaskResult {
    match result {
        Ok(data) => wrap(data),
        Err(e) => TaskResult::Failed(e),
    }
}

/// Gateway over the configured server and credential store
pub fn build_api_client(config: &Config) -> Result<ApiClient> {
    let credential_store = config.credential_store()?;
    let transport = Arc::new(ReqwestTransport::new(&config.api_url)?);
    let api = ApiClient::new(transport, Session::new(credential_store), SessionEvents::new())
        .with_expiry_policy(config.expiry_policy());
    debug!(api_url = %config.api_url, "API client configured");
    Ok(api)
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub api: ApiClient,
    timer_store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    pub timer: Option<QuestTimer>,
    /// Bumped on every timer start; quest lists fetched earlier may not
    /// contain the started quest yet.
    timer_starts: u64,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub form: Option<Form>,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_mode: AuthMode,
    pub login_error: Option<String>,

    // Selection indices
    pub quest_selection: usize,
    pub goal_selection: usize,
    pub badge_selection: usize,
    pub admin_selection: usize,

    // Fetched data
    pub dashboard: Option<Dashboard>,
    pub work_sessions: Vec<WorkSession>,
    pub quests: Vec<Quest>,
    pub goals: Vec<Goal>,
    pub achievements: Achievements,
    pub admin_users: Vec<AdminUser>,

    /// Last tick of the running timer
    pub last_tick: Option<TimerTick>,

    // Background task channels
    task_rx: mpsc::Receiver<TaskMessage>,
    task_tx: mpsc::Sender<TaskMessage>,
    tick_rx: mpsc::UnboundedReceiver<TimerTick>,
    tick_tx: mpsc::UnboundedSender<TimerTick>,
    session_rx: broadcast::Receiver<SessionEvent>,

    /// Bumped whenever the session ends; results from older tasks are dropped.
    generation: u64,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance. Must run inside the tokio runtime.
    pub fn new(config: Config) -> Result<Self> {
        let timer_store = config.timer_store()?;
        let api = build_api_client(&config)?;
        Ok(Self::with_services(config, api, timer_store, Arc::new(SystemClock)))
    }

    /// Build around an existing gateway, timer store and clock.
    pub fn with_services(
        config: Config,
        api: ApiClient,
        timer_store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let session_rx = api.events().subscribe();

        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();

        let login_username = config.last_username.clone().unwrap_or_default();

        Self {
            config,
            api,
            timer_store,
            clock,
            timer: None,
            timer_starts: 0,

            state: AppState::Normal,
            current_tab: Tab::Dashboard,
            form: None,

            login_username,
            login_password: String::new(),
            login_focus: LoginFocus::Username,
            login_mode: AuthMode::Login,
            login_error: None,

            quest_selection: 0,
            goal_selection: 0,
            badge_selection: 0,
            admin_selection: 0,

            dashboard: None,
            work_sessions: Vec::new(),
            quests: Vec::new(),
            goals: Vec::new(),
            achievements: Achievements::default(),
            admin_users: Vec::new(),
            last_tick: None,

            task_rx,
            task_tx,
            tick_rx,
            tick_tx,
            session_rx,
            generation: 0,

            status_message: None,
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.api.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.dashboard.as_ref().is_some_and(Dashboard::is_admin)
    }

    /// Show the login overlay
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
    }

    /// Attempt login or registration with the credentials from the login form
    pub async fn attempt_login(&mut self) {
        let username = self.login_username.trim().to_string();
        if username.is_empty() || self.login_password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return;
        }
        self.login_error = None;

        let credentials = Credentials::new(username.clone(), self.login_password.clone());
        match self.api.authenticate(&credentials, self.login_mode).await {
            Ok(()) => {
                self.config.last_username = Some(username);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                self.login_password.clear();
                self.login_mode = AuthMode::Login;
                self.state = AppState::Normal;
                info!("Login successful");
                self.start_session();
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(match e {
                    ApiError::Network(_) => {
                        "Unable to connect to server. Is it running?".to_string()
                    }
                    other => other.to_string(),
                });
            }
        }
    }

    /// Restore the quest timer and load everything for a fresh session.
    pub fn start_session(&mut self) {
        self.restore_timer();
        self.refresh_all();
    }

    fn restore_timer(&mut self) {
        let mut timer = QuestTimer::new(self.timer_store.clone(), self.clock.clone())
            .with_ticks(self.tick_tx.clone());
        timer.restore();
        self.last_tick = timer.tick();
        self.timer = Some(timer);
    }

    /// Log out on request. The timer record is kept for the next login.
    pub fn logout(&mut self) {
        self.api.logout();
        self.end_session(Some("Logged out".to_string()));
    }

    /// Drop all per-session state and go back to the login overlay.
    fn end_session(&mut self, message: Option<String>) {
        self.generation += 1;
        self.timer = None;
        self.last_tick = None;
        self.form = None;

        self.dashboard = None;
        self.work_sessions.clear();
        self.quests.clear();
        self.goals.clear();
        self.achievements = Achievements::default();
        self.admin_users.clear();

        self.quest_selection = 0;
        self.goal_selection = 0;
        self.badge_selection = 0;
        self.admin_selection = 0;
        self.current_tab = Tab::Dashboard;
        self.status_message = None;

        self.login_password.clear();
        self.login_error = message;
        self.start_login();
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    /// Spawn a gateway call whose result comes back through the task channel.
    fn spawn_task<F, Fut>(&self, task: F)
    where
        F: FnOnce(ApiClient) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = TaskResult> + Send + 'static,
    {
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = task(api).await;
            if let Err(e) = tx.send(TaskMessage { generation, result }).await {
                error!(error = %e, "Failed to send task result - channel closed");
            }
        });
    }

    /// Refresh every view's data in the background
    pub fn refresh_all(&mut self) {
        info!("Refreshing all data");
        self.refresh_dashboard();
        self.refresh_quests();
        self.refresh_goals();
        self.refresh_achievements();
        if self.is_admin() {
            self.refresh_admin_users();
        }
        self.status_message = Some("Refreshing data...".to_string());
    }

    fn refresh_dashboard(&self) {
        self.spawn_task(|api| async move {
            report(api.get_dashboard().await, TaskResult::Dashboard)
        });
        self.spawn_task(|api| async move {
            report(api.get_work_sessions().await, TaskResult::WorkSessions)
        });
    }

    fn refresh_quests(&self) {
        let timer_starts = self.timer_starts;
        self.spawn_task(move |api| async move {
            report(api.get_quests().await, |quests| TaskResult::Quests {
                quests,
                timer_starts,
            })
        });
    }

    fn refresh_goals(&self) {
        self.spawn_task(|api| async move { report(api.get_goals().await, TaskResult::Goals) });
    }

    fn refresh_achievements(&self) {
        self.spawn_task(|api| async move {
            report(api.get_achievements().await, TaskResult::Achievements)
        });
    }

    fn refresh_admin_users(&self) {
        self.spawn_task(|api| async move {
            report(api.get_admin_users().await, TaskResult::AdminUsers)
        });
    }

    /// Drain session events, timer ticks and task results
    pub fn check_background_tasks(&mut self) {
        loop {
            match self.session_rx.try_recv() {
                Ok(SessionEvent::Expired) => self.handle_session_expired(),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Session events lagged");
                    self.handle_session_expired();
                }
                Err(_) => break,
            }
        }

        while let Ok(tick) = self.tick_rx.try_recv() {
            let active = self.timer.as_ref().and_then(QuestTimer::active_quest);
            if active == Some(tick.quest_id) {
                self.last_tick = Some(tick);
            }
        }

        while let Ok(message) = self.task_rx.try_recv() {
            self.handle_task_message(message);
        }
    }

    fn handle_task_message(&mut self, message: TaskMessage) {
        if message.generation != self.generation {
            debug!("Discarding result from an ended session");
            return;
        }
        self.process_task_result(message.result);
    }

    fn handle_session_expired(&mut self) {
        if matches!(self.state, AppState::LoggingIn) && self.dashboard.is_none() {
            return;
        }
        warn!("Session expired, returning to login");
        self.end_session(Some("Session expired. Please log in again.".to_string()));
    }

    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Dashboard(data) => {
                let was_admin = self.is_admin();
                self.dashboard = Some(data);
                if self.is_admin() && !was_admin {
                    self.refresh_admin_users();
                }
                if !self.is_admin() && self.current_tab == Tab::Admin {
                    self.current_tab = Tab::Dashboard;
                }
                self.status_message = None;
            }
            TaskResult::WorkSessions(mut data) => {
                data.sort_by(|a, b| b.work_date.cmp(&a.work_date));
                self.work_sessions = data;
            }
            TaskResult::Quests {
                quests: data,
                timer_starts,
            } => {
                if timer_starts != self.timer_starts {
                    debug!("Quest list predates the running timer, not reconciling");
                } else if let Some(timer) = self.timer.as_mut() {
                    if timer.reconcile(&data) {
                        self.last_tick = None;
                        self.status_message =
                            Some("Timer cleared: quest is no longer open".to_string());
                    }
                }
                self.quests = data;
                self.quest_selection = clamp_selection(self.quest_selection, self.quests.len());
            }
            TaskResult::Goals(data) => {
                self.goals = data;
                self.goal_selection = clamp_selection(self.goal_selection, self.goals.len());
            }
            TaskResult::Achievements(data) => {
                self.achievements = data;
                self.badge_selection =
                    clamp_selection(self.badge_selection, self.achievements.badges.len());
            }
            TaskResult::AdminUsers(data) => {
                self.admin_users = data;
                self.admin_selection = clamp_selection(self.admin_selection, self.admin_users.len());
            }
            TaskResult::QuestCreated(quest) => {
                self.status_message = Some(format!("Quest \"{}\" posted", quest.title));
                self.refresh_quests();
            }
            TaskResult::QuestDeleted(id) => {
                debug!(quest_id = id, "Quest deleted");
                self.status_message = Some("Quest deleted".to_string());
                self.refresh_quests();
            }
            TaskResult::GoalSaved(goal) => {
                self.status_message = Some(format!("Goal \"{}\" saved", goal.title));
                self.refresh_goals();
            }
            TaskResult::GoalDeleted(id) => {
                debug!(goal_id = id, "Goal deleted");
                self.status_message = Some("Goal deleted".to_string());
                self.refresh_goals();
            }
            TaskResult::UserDeleted(id) => {
                debug!(user_id = id, "User deleted");
                self.status_message = Some("User deleted".to_string());
                self.refresh_admin_users();
            }
            TaskResult::StatusUpdated(status) => {
                if let Some(dashboard) = self.dashboard.as_mut() {
                    dashboard.status = Some(status);
                }
                self.status_message = Some("Status updated".to_string());
            }
            TaskResult::ProfileUpdated(dashboard) => {
                let renamed = self
                    .dashboard
                    .as_ref()
                    .is_some_and(|d| d.trainer_name != dashboard.trainer_name);
                if renamed {
                    // The stored credential still carries the old name.
                    self.login_username = dashboard.trainer_name.clone();
                    self.logout();
                    self.login_error =
                        Some("Username changed. Log in with your new name.".to_string());
                    return;
                }
                self.dashboard = Some(dashboard);
                self.status_message = Some("Profile updated".to_string());
            }
            TaskResult::WorkLogged(session) => {
                self.status_message = Some(format!("Logged {}h of work", session.hours));
                self.refresh_dashboard();
                self.refresh_goals();
                self.refresh_achievements();
            }
            TaskResult::Finished { quest_id, result } => self.apply_finish(quest_id, result),
            TaskResult::Failed(e) => self.report_error(e),
        }
    }

    fn report_error(&mut self, e: ApiError) {
        // Expiry is handled through the session event, not per call.
        if e.is_auth_error() {
            debug!(error = %e, "Ignoring auth failure from background task");
            return;
        }
        error!(error = %e, "Background task failed");
        self.status_message = Some(format!("Error: {}", e));
    }

    // =========================================================================
    // Quest Timer
    // =========================================================================

    pub fn active_quest(&self) -> Option<i64> {
        self.timer.as_ref().and_then(QuestTimer::active_quest)
    }

    pub fn is_finishing(&self) -> bool {
        self.timer.as_ref().is_some_and(QuestTimer::is_finishing)
    }

    /// Elapsed seconds of the running quest as last reported by the ticker
    pub fn elapsed_seconds(&self) -> u64 {
        match (self.active_quest(), self.last_tick) {
            (Some(active), Some(tick)) if tick.quest_id == active => tick.elapsed_seconds,
            _ => 0,
        }
    }

    /// Start the timer on the selected quest
    pub fn start_selected_quest(&mut self) {
        let Some(quest) = self.quests.get(self.quest_selection).cloned() else {
            return;
        };
        let Some(timer) = self.timer.as_mut() else {
            return;
        };

        self.status_message = Some(match timer.start(&quest) {
            Ok(StartOutcome::Started) => {
                self.timer_starts += 1;
                self.last_tick = timer.tick();
                format!("Started \"{}\"", quest.title)
            }
            Ok(StartOutcome::AlreadyRunning(active)) => {
                let title = self
                    .quests
                    .iter()
                    .find(|q| q.id == active)
                    .map(|q| q.title.as_str())
                    .unwrap_or("another quest");
                format!("Finish \"{}\" before starting another quest", title)
            }
            Ok(StartOutcome::QuestCompleted) => "That quest is already completed".to_string(),
            Err(e) => {
                error!(error = %e, "Failed to start quest timer");
                format!("Error: {}", e)
            }
        });
    }

    /// Submit the running quest. A finish already in flight is ignored.
    pub fn finish_active_quest(&mut self) {
        let Some(request) = self.timer.as_mut().and_then(QuestTimer::begin_finish) else {
            return;
        };
        let quest_id = request.quest_id;
        let hours = request.duration_hours;
        self.status_message = Some("Turning in quest...".to_string());
        self.spawn_task(move |api| async move {
            TaskResult::Finished {
                quest_id,
                result: api.finish_quest(quest_id, hours).await,
            }
        });
    }

    fn apply_finish(&mut self, quest_id: i64, result: ApiResult<Quest>) {
        let Some(timer) = self.timer.as_mut() else {
            return;
        };

        match timer.complete_finish(quest_id, result) {
            FinishOutcome::Completed(quest) => {
                self.last_tick = None;
                self.status_message = Some(format!(
                    "Quest complete! +{} XP for \"{}\"",
                    quest.earned_xp, quest.title
                ));
                self.refresh_all();
            }
            FinishOutcome::AlreadyCompleted => {
                self.last_tick = None;
                self.status_message = Some("Quest was already completed".to_string());
                self.refresh_quests();
            }
            FinishOutcome::Failed(e) => self.report_error(e),
            FinishOutcome::Stale => {}
        }
    }

    // =========================================================================
    // Forms
    // =========================================================================

    pub fn open_form(&mut self, kind: FormKind) {
        let form = match kind {
            FormKind::NewQuest => Form::new_quest(&self.goals),
            FormKind::NewGoal => Form::new_goal(),
            FormKind::EditGoal(id) => match self.goals.iter().find(|g| g.id == id) {
                Some(goal) => Form::edit_goal(goal),
                None => return,
            },
            FormKind::Profile => match self.dashboard.as_ref() {
                Some(dashboard) => Form::profile(dashboard),
                None => return,
            },
            FormKind::Status => match self.dashboard.as_ref() {
                Some(dashboard) => Form::status(dashboard),
                None => return,
            },
            FormKind::LogWork => Form::log_work(),
        };
        self.form = Some(form);
        self.state = AppState::Editing(kind);
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.state = AppState::Normal;
    }

    /// Validate the open form and send it. Validation errors stay on the form.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.clone() else {
            return;
        };

        let submitted = match form.kind {
            FormKind::NewQuest => form.to_new_quest().map(|quest| {
                self.spawn_task(move |api| async move {
                    report(api.create_quest(&quest).await, TaskResult::QuestCreated)
                })
            }),
            FormKind::NewGoal => form.to_new_goal().map(|goal| {
                self.spawn_task(move |api| async move {
                    report(api.create_goal(&goal).await, TaskResult::GoalSaved)
                })
            }),
            FormKind::EditGoal(id) => form.to_new_goal().map(|goal| {
                self.spawn_task(move |api| async move {
                    report(api.update_goal(id, &goal).await, TaskResult::GoalSaved)
                })
            }),
            FormKind::Profile => form.to_profile_update().map(|update| {
                self.spawn_task(move |api| async move {
                    report(api.update_profile(&update).await, TaskResult::ProfileUpdated)
                })
            }),
            FormKind::Status => form.to_status().map(|status| {
                self.spawn_task(move |api| async move {
                    report(api.update_status(&status).await, TaskResult::StatusUpdated)
                })
            }),
            FormKind::LogWork => form.to_work_request().map(|work: WorkRequest| {
                self.spawn_task(move |api| async move {
                    report(api.log_work(&work).await, TaskResult::WorkLogged)
                })
            }),
        };

        match submitted {
            Ok(()) => self.cancel_form(),
            Err(message) => {
                if let Some(form) = self.form.as_mut() {
                    form.error = Some(message);
                }
            }
        }
    }

    // =========================================================================
    // Deletes
    // =========================================================================

    /// Ask for confirmation before deleting whatever is selected on this tab
    pub fn request_delete(&mut self) {
        let target = match self.current_tab {
            Tab::Quests => self
                .quests
                .get(self.quest_selection)
                .map(|q| DeleteTarget::Quest(q.id)),
            Tab::Goals => self
                .goals
                .get(self.goal_selection)
                .map(|g| DeleteTarget::Goal(g.id)),
            Tab::Admin => self
                .admin_users
                .get(self.admin_selection)
                .map(|u| DeleteTarget::User(u.id)),
            _ => None,
        };
        if let Some(target) = target {
            self.state = AppState::ConfirmingDelete(target);
        }
    }

    pub fn confirm_delete(&mut self, target: DeleteTarget) {
        self.state = AppState::Normal;
        match target {
            DeleteTarget::Quest(id) => {
                // The timer must not outlive its quest.
                if self.timer.as_mut().is_some_and(|t| t.release(id)) {
                    self.last_tick = None;
                }
                self.spawn_task(move |api| async move {
                    report(api.delete_quest(id).await, |()| TaskResult::QuestDeleted(id))
                });
            }
            DeleteTarget::Goal(id) => {
                self.spawn_task(move |api| async move {
                    report(api.delete_goal(id).await, |()| TaskResult::GoalDeleted(id))
                });
            }
            DeleteTarget::User(id) => {
                self.spawn_task(move |api| async move {
                    report(api.delete_user(id).await, |()| TaskResult::UserDeleted(id))
                });
            }
        }
    }

    /// Human-readable name of a delete target for the confirmation dialog
    pub fn describe_target(&self, target: DeleteTarget) -> String {
        match target {
            DeleteTarget::Quest(id) => self
                .quests
                .iter()
                .find(|q| q.id == id)
                .map(|q| format!("quest \"{}\"", q.title))
                .unwrap_or_else(|| "this quest".to_string()),
            DeleteTarget::Goal(id) => self
                .goals
                .iter()
                .find(|g| g.id == id)
                .map(|g| format!("goal \"{}\"", g.title))
                .unwrap_or_else(|| "this goal".to_string()),
            DeleteTarget::User(id) => self
                .admin_users
                .iter()
                .find(|u| u.id == id)
                .map(|u| format!("user \"{}\"", u.username))
                .unwrap_or_else(|| "this user".to_string()),
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// (current selection, list length) for the list on the current tab
    fn selection_mut(&mut self) -> Option<(&mut usize, usize)> {
        match self.current_tab {
            Tab::Quests => Some((&mut self.quest_selection, self.quests.len())),
            Tab::Goals => Some((&mut self.goal_selection, self.goals.len())),
            Tab::Achievements => Some((&mut self.badge_selection, self.achievements.badges.len())),
            Tab::Admin => Some((&mut self.admin_selection, self.admin_users.len())),
            Tab::Dashboard | Tab::Profile => None,
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        if let Some((selection, len)) = self.selection_mut() {
            if len == 0 {
                *selection = 0;
                return;
            }
            let next = (*selection as isize + delta).clamp(0, len as isize - 1);
            *selection = next as usize;
        }
    }

    pub fn select_first(&mut self) {
        if let Some((selection, _)) = self.selection_mut() {
            *selection = 0;
        }
    }

    pub fn select_last(&mut self) {
        if let Some((selection, len)) = self.selection_mut() {
            *selection = len.saturating_sub(1);
        }
    }

    pub fn selected_goal_id(&self) -> Option<i64> {
        self.goals.get(self.goal_selection).map(|g| g.id)
    }
}

/// Keep a selection index inside a list that may have shrunk
fn clamp_selection(selection: usize, len: usize) -> usize {
    selection.min(len.saturating_sub(1))
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c) && c != ':'
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
