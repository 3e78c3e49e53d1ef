//! API client (the request gateway) for the questlog REST API.
//!
//! This module provides the `ApiClient` struct for authenticating and for
//! every authenticated call the views make.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::auth::{AuthMode, Credentials, Session};
use crate::events::SessionEvents;
use crate::models::{
    Achievements, AdminUser, Dashboard, Goal, NewGoal, NewQuest, ProfileUpdate, Quest,
    StatusResponse, WorkRequest, WorkSession,
};

use super::transport::{HttpRequest, Transport};
use super::{ApiError, ApiResult};

/// Which failure statuses count as "the session is no longer valid".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryPolicy {
    /// 401, 403, 404 and 500 all end the session. This is the contract the
    /// server was built against.
    #[default]
    Coarse,
    /// Only 401 and 403 end the session; 404 and 500 surface as ordinary
    /// request errors.
    Strict,
}

impl ExpiryPolicy {
    pub fn is_expiry(&self, status: StatusCode) -> bool {
        match self {
            ExpiryPolicy::Coarse => matches!(
                status,
                StatusCode::UNAUTHORIZED
                    | StatusCode::FORBIDDEN
                    | StatusCode::NOT_FOUND
                    | StatusCode::INTERNAL_SERVER_ERROR
            ),
            ExpiryPolicy::Strict => {
                matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
            }
        }
    }
}

/// Whether a failure body may report a lost completion race.
///
/// Only a quest finish can race another finish; on every other call an
/// expiry status ends the session whatever the body says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    Ordinary,
    MayRace,
}

/// The request gateway.
/// Clone is cheap - all state is shared behind Arcs.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Session,
    events: SessionEvents,
    expiry: ExpiryPolicy,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: Session, events: SessionEvents) -> Self {
        Self {
            transport,
            session,
            events,
            expiry: ExpiryPolicy::default(),
        }
    }

    pub fn with_expiry_policy(mut self, expiry: ExpiryPolicy) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Derived from the stored credential on every call.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    // ===== Session =====

    /// Log in or register. The credential is persisted only on success.
    pub async fn authenticate(&self, credentials: &Credentials, mode: AuthMode) -> ApiResult<()> {
        let request =
            HttpRequest::new(Method::POST, mode.path()).json(serde_json::to_value(credentials)?);

        let response = self.transport.send(request).await?;

        if !response.status.is_success() {
            warn!(
                username = %credentials.username,
                status = response.status.as_u16(),
                ?mode,
                "Authentication rejected"
            );
            return Err(match mode {
                AuthMode::Login => ApiError::InvalidCredentials,
                AuthMode::Register => ApiError::UsernameTaken,
            });
        }

        self.session
            .store(&credentials.authorization_header())
            .map_err(ApiError::Storage)?;

        info!(username = %credentials.username, ?mode, "Authenticated");
        Ok(())
    }

    /// Forget the session. No network call.
    pub fn logout(&self) {
        self.session.clear();
        info!("Logged out");
    }

    // ===== Request plumbing =====

    /// Send an authenticated request and return the raw success body.
    async fn execute(&self, request: HttpRequest, operation: &str) -> ApiResult<String> {
        self.execute_classified(request, operation, Completion::Ordinary)
            .await
    }

    /// `execute`, with the failure classification chosen by the caller.
    async fn execute_classified(
        &self,
        request: HttpRequest,
        operation: &str,
        completion: Completion,
    ) -> ApiResult<String> {
        let Some(credential) = self.session.credential() else {
            debug!(operation, "No credential stored, not sending request");
            return Err(ApiError::NoCredential);
        };

        let response = self
            .transport
            .send(request.authorization(credential))
            .await?;

        if response.status.is_success() {
            return Ok(response.body);
        }

        let status = response.status;

        if completion == Completion::MayRace && ApiError::reports_already_completed(&response.body)
        {
            debug!(operation, status = status.as_u16(), "Server reports quest already completed");
            return Err(ApiError::QuestAlreadyCompleted);
        }

        if self.expiry.is_expiry(status) {
            warn!(operation, status = status.as_u16(), "Session rejected, clearing credential");
            self.session.clear();
            self.events.emit_expired();
            return Err(ApiError::SessionExpired {
                status: status.as_u16(),
            });
        }

        warn!(operation, status = status.as_u16(), "Request failed");
        Err(ApiError::from_status(operation, status, &response.body))
    }

    async fn get_json<T: DeserializeOwned>(&self, request: HttpRequest, operation: &str) -> ApiResult<T> {
        let body = self.execute(request, operation).await?;
        Self::decode(&body, operation)
    }

    fn decode<T: DeserializeOwned>(body: &str, operation: &str) -> ApiResult<T> {
        serde_json::from_str(body)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", operation, e)))
    }

    async fn send_without_body(&self, request: HttpRequest, operation: &str) -> ApiResult<()> {
        self.execute(request, operation).await.map(|_| ())
    }

    fn with_body<B: Serialize>(request: HttpRequest, body: &B) -> ApiResult<HttpRequest> {
        Ok(request.json(serde_json::to_value(body)?))
    }

    // ===== Dashboard / profile =====

    pub async fn get_dashboard(&self) -> ApiResult<Dashboard> {
        self.get_json(HttpRequest::new(Method::GET, "/dashboard"), "fetch dashboard")
            .await
    }

    pub async fn update_status(&self, status: &str) -> ApiResult<String> {
        let request = Self::with_body(HttpRequest::new(Method::PUT, "/dashboard/status"), &status)?;
        let response: StatusResponse = self.get_json(request, "update status").await?;
        Ok(response.status)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<Dashboard> {
        let request = Self::with_body(HttpRequest::new(Method::PUT, "/dashboard/profile"), update)?;
        self.get_json(request, "update profile").await
    }

    // ===== Work log =====

    pub async fn get_work_sessions(&self) -> ApiResult<Vec<WorkSession>> {
        self.get_json(HttpRequest::new(Method::GET, "/work"), "fetch work sessions")
            .await
    }

    pub async fn log_work(&self, work: &WorkRequest) -> ApiResult<WorkSession> {
        let request = Self::with_body(HttpRequest::new(Method::POST, "/work"), work)?;
        self.get_json(request, "log work").await
    }

    // ===== Quests =====

    pub async fn get_quests(&self) -> ApiResult<Vec<Quest>> {
        self.get_json(HttpRequest::new(Method::GET, "/quests"), "fetch quests")
            .await
    }

    pub async fn create_quest(&self, quest: &NewQuest) -> ApiResult<Quest> {
        let request = Self::with_body(HttpRequest::new(Method::POST, "/quests"), quest)?;
        self.get_json(request, "create quest").await
    }

    /// Submit a completion with the worked duration in hours.
    pub async fn finish_quest(&self, quest_id: i64, hours: f64) -> ApiResult<Quest> {
        let request = HttpRequest::new(Method::POST, format!("/quests/{}/finish", quest_id))
            .query("hours", hours);
        let body = self
            .execute_classified(request, "finish quest", Completion::MayRace)
            .await?;
        Self::decode(&body, "finish quest")
    }

    pub async fn delete_quest(&self, quest_id: i64) -> ApiResult<()> {
        self.send_without_body(
            HttpRequest::new(Method::DELETE, format!("/quests/{}", quest_id)),
            "delete quest",
        )
        .await
    }

    // ===== Goals =====

    pub async fn get_goals(&self) -> ApiResult<Vec<Goal>> {
        self.get_json(HttpRequest::new(Method::GET, "/goals"), "fetch goals")
            .await
    }

    pub async fn create_goal(&self, goal: &NewGoal) -> ApiResult<Goal> {
        let request = Self::with_body(HttpRequest::new(Method::POST, "/goals"), goal)?;
        self.get_json(request, "create goal").await
    }

    pub async fn update_goal(&self, goal_id: i64, goal: &NewGoal) -> ApiResult<Goal> {
        let request = Self::with_body(
            HttpRequest::new(Method::PUT, format!("/goals/{}", goal_id)),
            goal,
        )?;
        self.get_json(request, "update goal").await
    }

    pub async fn delete_goal(&self, goal_id: i64) -> ApiResult<()> {
        self.send_without_body(
            HttpRequest::new(Method::DELETE, format!("/goals/{}", goal_id)),
            "delete goal",
        )
        .await
    }

    // ===== Achievements =====

    pub async fn get_achievements(&self) -> ApiResult<Achievements> {
        self.get_json(HttpRequest::new(Method::GET, "/achievements"), "fetch achievements")
            .await
    }

    // ===== Admin =====

    pub async fn get_admin_users(&self) -> ApiResult<Vec<AdminUser>> {
        self.get_json(HttpRequest::new(Method::GET, "/admin/users"), "fetch admin users")
            .await
    }

    pub async fn delete_user(&self, user_id: i64) -> ApiResult<()> {
        self.send_without_body(
            HttpRequest::new(Method::DELETE, format!("/admin/users/{}", user_id)),
            "delete user",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::mock::MockTransport;
    use crate::events::SessionEvent;
    use crate::storage::{KeyValueStore, MemoryStore, AUTH_HEADER_KEY};
    use tokio::sync::broadcast::error::TryRecvError;

    const DASHBOARD_JSON: &str = r#"{"trainerName":"ash","pokemonName":"Charmander","level":1,"currentXp":0,"totalXp":0,"evolutionStage":"Basic","role":"USER"}"#;

    fn client_with(transport: Arc<MockTransport>) -> (ApiClient, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let client = ApiClient::new(transport, Session::new(store.clone()), SessionEvents::new());
        (client, store)
    }

    fn logged_in(transport: Arc<MockTransport>) -> (ApiClient, Arc<MemoryStore>) {
        let (client, store) = client_with(transport);
        store.set(AUTH_HEADER_KEY, "Basic YXNoOnBpa2FjaHU=").unwrap();
        (client, store)
    }

    // -------------------------------------------------------------------------
    // authenticate / logout
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_login_stores_basic_credential() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(200, "\"dummy-jwt-token-xyz\"");
        let (client, _) = client_with(transport.clone());

        client
            .authenticate(&Credentials::new("ash", "pikachu"), AuthMode::Login)
            .await
            .unwrap();

        assert!(client.is_authenticated());
        assert_eq!(
            client.session().credential().as_deref(),
            Some("Basic YXNoOnBpa2FjaHU=")
        );

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/auth/login");
        assert!(requests[0].authorization.is_none());
        assert_eq!(
            requests[0].body,
            Some(serde_json::json!({"username": "ash", "password": "pikachu"}))
        );
    }

    #[tokio::test]
    async fn test_login_failure_stores_nothing() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(401, "");
        let (client, _) = client_with(transport);

        let err = client
            .authenticate(&Credentials::new("ash", "wrong"), AuthMode::Login)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::InvalidCredentials));
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_register_conflict_reports_username_taken() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(500, r#"{"message":"Username already exists"}"#);
        let (client, _) = client_with(transport.clone());
        let mut events = client.events().subscribe();

        let err = client
            .authenticate(&Credentials::new("ash", "pikachu"), AuthMode::Register)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::UsernameTaken));
        assert_eq!(transport.requests()[0].path, "/auth/register");
        // Auth failures are not session expiry.
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_logout_clears_without_network() {
        let transport = Arc::new(MockTransport::new());
        let (client, store) = logged_in(transport.clone());

        client.logout();

        assert!(!client.is_authenticated());
        assert!(!store.contains(AUTH_HEADER_KEY).unwrap());
        assert_eq!(transport.request_count(), 0);
    }

    // -------------------------------------------------------------------------
    // request
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_request_attaches_credential() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(200, DASHBOARD_JSON);
        let (client, _) = logged_in(transport.clone());

        let dashboard = client.get_dashboard().await.unwrap();

        assert_eq!(dashboard.trainer_name, "ash");
        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(requests[0].path, "/dashboard");
        assert_eq!(
            requests[0].authorization.as_deref(),
            Some("Basic YXNoOnBpa2FjaHU=")
        );
    }

    #[tokio::test]
    async fn test_no_credential_fails_without_network() {
        let transport = Arc::new(MockTransport::new());
        let (client, _) = client_with(transport.clone());

        let err = client.get_quests().await.unwrap_err();

        assert!(matches!(err, ApiError::NoCredential));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_expiry_statuses_clear_credential_and_emit_once() {
        for status in [401u16, 403, 404, 500] {
            let transport = Arc::new(MockTransport::new());
            transport.respond(status, "");
            let (client, store) = logged_in(transport);
            let mut events = client.events().subscribe();

            let err = client.get_goals().await.unwrap_err();

            assert!(
                matches!(err, ApiError::SessionExpired { status: s } if s == status),
                "status {status} gave {err:?}"
            );
            assert!(err.is_auth_error());
            assert!(!store.contains(AUTH_HEADER_KEY).unwrap());
            assert_eq!(events.try_recv().unwrap(), SessionEvent::Expired);
            assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
        }
    }

    #[tokio::test]
    async fn test_forbidden_then_fail_fast() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(403, "");
        let (client, _) = logged_in(transport.clone());

        let first = client.get_dashboard().await.unwrap_err();
        assert!(matches!(first, ApiError::SessionExpired { status: 403 }));
        assert!(!client.is_authenticated());

        let second = client.get_dashboard().await.unwrap_err();
        assert!(matches!(second, ApiError::NoCredential));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_other_failures_are_generic_request_errors() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(400, "difficulty must be set");
        let (client, store) = logged_in(transport);
        let mut events = client.events().subscribe();

        let err = client
            .create_quest(&NewQuest {
                title: "Refactor".to_string(),
                earned_xp: 0,
                difficulty: crate::models::Difficulty::Easy,
                goal: None,
            })
            .await
            .unwrap_err();

        match err {
            ApiError::Request { operation, status, .. } => {
                assert_eq!(operation, "create quest");
                assert_eq!(status, 400);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.contains(AUTH_HEADER_KEY).unwrap());
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_strict_policy_keeps_session_on_server_error() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(500, "boom").respond(404, "");
        let (client, _) = logged_in(transport);
        let client = client.with_expiry_policy(ExpiryPolicy::Strict);

        let err = client.get_achievements().await.unwrap_err();
        assert!(matches!(err, ApiError::Request { status: 500, .. }));
        let err = client.get_admin_users().await.unwrap_err();
        assert!(matches!(err, ApiError::Request { status: 404, .. }));
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn test_already_completed_is_not_expiry() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(500, r#"{"message":"Quest already completed"}"#);
        let (client, _) = logged_in(transport);
        let mut events = client.events().subscribe();

        let err = client.finish_quest(42, 0.5).await.unwrap_err();

        assert!(matches!(err, ApiError::QuestAlreadyCompleted));
        assert!(client.is_authenticated());
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_already_completed_body_on_other_calls_still_expires() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(500, r#"{"message":"Import already completed, cannot repeat"}"#);
        let (client, store) = logged_in(transport);
        let mut events = client.events().subscribe();

        let err = client.get_quests().await.unwrap_err();

        assert!(matches!(err, ApiError::SessionExpired { status: 500 }));
        assert!(!client.is_authenticated());
        assert!(!store.contains(AUTH_HEADER_KEY).unwrap());
        assert_eq!(events.try_recv().unwrap(), SessionEvent::Expired);
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_finish_quest_sends_hours_as_query() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            200,
            r#"{"id":42,"title":"Write docs","difficulty":"Easy","earnedXp":15,"completed":true}"#,
        );
        let (client, _) = logged_in(transport.clone());

        let quest = client.finish_quest(42, 1.5).await.unwrap();

        assert!(quest.completed);
        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/quests/42/finish");
        assert_eq!(request.query, vec![("hours".to_string(), "1.5".to_string())]);
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_body() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(204, "");
        let (client, _) = logged_in(transport.clone());

        client.delete_quest(9).await.unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.path, "/quests/9");
    }

    #[tokio::test]
    async fn test_update_status_sends_json_string() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(200, r#"{"status":"Focused"}"#);
        let (client, _) = logged_in(transport.clone());

        let status = client.update_status("Focused").await.unwrap();

        assert_eq!(status, "Focused");
        assert_eq!(
            transport.requests()[0].body,
            Some(serde_json::Value::String("Focused".to_string()))
        );
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_invalid_response() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(200, "<html>not json</html>");
        let (client, _) = logged_in(transport);

        let err = client.get_quests().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(ref msg) if msg.starts_with("fetch quests")));
        assert!(client.is_authenticated());
    }

    #[test]
    fn test_expiry_policy_statuses() {
        let coarse = ExpiryPolicy::Coarse;
        assert!(coarse.is_expiry(StatusCode::NOT_FOUND));
        assert!(coarse.is_expiry(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!coarse.is_expiry(StatusCode::BAD_GATEWAY));
        assert!(!coarse.is_expiry(StatusCode::BAD_REQUEST));

        let strict = ExpiryPolicy::Strict;
        assert!(strict.is_expiry(StatusCode::UNAUTHORIZED));
        assert!(strict.is_expiry(StatusCode::FORBIDDEN));
        assert!(!strict.is_expiry(StatusCode::NOT_FOUND));
    }
}
