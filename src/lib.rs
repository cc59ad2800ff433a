// lib.rs - Homeward Plots service: verified land listings for NRI buyers,
// an AI property guide, phone sign-in and lead capture.
pub mod assistant;
pub mod catalog;
pub mod chat_session;
pub mod config;
pub mod error;
pub mod filter;
pub mod gemini_client;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod sessions;
pub mod view;

use assistant::credentials::CredentialSource;
use assistant::PropertyAssistant;
use axum::{routing::get, Extension, Router};
use catalog::Catalog;
use config::AppConfig;
use gemini_client::GenerationBackend;
use middleware::rate_limit::RateLimiter;
use services::{LeadService, OtpSender, OtpService};
use sessions::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;

const RATE_WINDOW: Duration = Duration::from_secs(60);

// Shared state handed to every handler through an `Extension`
pub struct AppState {
    pub catalog: Catalog,
    pub sessions: SessionStore,
    pub assistant: PropertyAssistant,
    pub auth: OtpService,
    pub leads: LeadService,
    pub otp_limiter: RateLimiter,
    pub write_limiter: RateLimiter,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        backend: Arc<dyn GenerationBackend>,
        credentials: Arc<dyn CredentialSource>,
        otp_sender: Arc<dyn OtpSender>,
    ) -> Self {
        // `AppConfig` caps the TTL at a day, well inside chrono's range.
        let otp_ttl = chrono::Duration::from_std(config.otp_ttl)
            .unwrap_or_else(|_| chrono::Duration::seconds(crate::config::MAX_OTP_TTL_SECS as i64));
        Self {
            catalog: Catalog::seeded(),
            sessions: SessionStore::new(config.session_idle, config.max_sessions),
            assistant: PropertyAssistant::new(backend, credentials, config.gemini_model.clone()),
            auth: OtpService::new(otp_sender, config.jwt_secret.clone(), otp_ttl),
            leads: LeadService::new(config.max_leads),
            otp_limiter: RateLimiter::new(config.otp_rate_limit, RATE_WINDOW),
            write_limiter: RateLimiter::new(config.write_rate_limit, RATE_WINDOW),
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(handlers::catalog::catalog_routes())
        .merge(handlers::sessions::session_routes())
        .merge(handlers::assistant::assistant_routes())
        .merge(handlers::auth::auth_routes())
        .merge(handlers::leads::lead_routes())
        .route("/api/status", get(handlers::status::api_status))
        .layer(axum::middleware::from_fn(middleware::logging::request_logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::credentials::StaticCredentials;
    use crate::assistant::testing::FakeBackend;
    use crate::services::auth::AuthError;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct CapturingSender {
        codes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl OtpSender for CapturingSender {
        async fn send(&self, _phone: &str, code: &str) -> Result<(), AuthError> {
            self.codes.lock().unwrap().push(code.to_string());
            Ok(())
        }
    }

    struct Harness {
        router: Router,
        backend: Arc<FakeBackend>,
        sender: Arc<CapturingSender>,
    }

    fn harness(api_key: Option<&str>, otp_rate_limit: u32) -> Harness {
        harness_with(
            api_key,
            FakeBackend::replying("The coastal NOC is still pending."),
            |config| config.otp_rate_limit = otp_rate_limit,
        )
    }

    fn harness_with(api_key: Option<&str>, backend: FakeBackend, tune: impl FnOnce(&mut AppConfig)) -> Harness {
        let mut config = AppConfig::from_lookup(|_| None).unwrap();
        tune(&mut config);
        let backend = Arc::new(backend);
        let sender = Arc::new(CapturingSender::default());
        let state = AppState::new(
            &config,
            backend.clone(),
            Arc::new(StaticCredentials::new(api_key)),
            sender.clone(),
        );
        Harness {
            router: build_router(Arc::new(state)),
            backend,
            sender,
        }
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        call_with_token(router, method, uri, body, None).await
    }

    async fn call_with_token(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn new_session(router: &Router) -> String {
        let (status, body) = call(router, "POST", "/api/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_status_reports_demo_mode_without_key() {
        let h = harness(None, 10);
        let (status, body) = call(&h.router, "GET", "/api/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["assistant"]["mode"], "demo");
        assert_eq!(body["assistant"]["model"], "gemini-2.5-flash");
        assert_eq!(body["listings"], 3);
    }

    #[tokio::test]
    async fn test_property_search_and_detail() {
        let h = harness(None, 10);

        let (status, body) = call(&h.router, "GET", "/api/properties?state=Karnataka", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["properties"][0]["id"], "prop-101");

        let (status, body) = call(&h.router, "GET", "/api/properties?max_price=&min_area=", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 3);

        let (status, body) = call(&h.router, "GET", "/api/properties?max_price=cheap", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = call(&h.router, "GET", "/api/properties/prop-103", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["property"]["title"], "Sea View Estate - ECR");

        let (status, _) = call(&h.router, "GET", "/api/properties/prop-404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_states_and_service_packages() {
        let h = harness(None, 10);

        let (_, body) = call(&h.router, "GET", "/api/states", None).await;
        let states = body["states"].as_array().unwrap();
        assert_eq!(states.len(), 6);
        assert_eq!(states[0], json!({"name": "Karnataka", "listings": 1}));

        let (_, body) = call(&h.router, "GET", "/api/services", None).await;
        let packages = body["packages"].as_array().unwrap();
        assert_eq!(packages.len(), 3);
        assert_eq!(packages[1]["name"], "Legal Opinion");
        assert_eq!(packages[1]["recommended"], true);
    }

    #[tokio::test]
    async fn test_select_property_then_chat_live() {
        let h = harness(Some("test-key"), 10);
        let id = new_session(&h.router).await;

        let (status, body) = call(
            &h.router,
            "POST",
            &format!("/api/sessions/{}/events", id),
            Some(json!({"type": "select_property", "property_id": "prop-103"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"]["screen"], "listing_detail");
        assert_eq!(body["view"]["chat"].as_array().unwrap().len(), 1);

        let (status, body) = call(
            &h.router,
            "POST",
            &format!("/api/sessions/{}/chat", id),
            Some(json!({"message": "Is the coastal NOC done?"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"]["outcome"], "live");
        assert_eq!(body["appended"], true);
        let transcript = body["transcript"].as_array().unwrap();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1]["role"], "user");
        assert_eq!(transcript[2]["text"], "The coastal NOC is still pending.");
        assert_eq!(h.backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_abandoned_requests_still_release_their_tracks() {
        let h = harness_with(
            Some("test-key"),
            FakeBackend::slow("The coastal NOC is still pending.", Duration::from_millis(200)),
            |_| {},
        );
        let id = new_session(&h.router).await;
        call(
            &h.router,
            "POST",
            &format!("/api/sessions/{}/events", id),
            Some(json!({"type": "select_property", "property_id": "prop-103"})),
        )
        .await;

        // The client gives up while the assistant is still working.
        let chat = json_request("POST", &format!("/api/sessions/{}/chat", id), json!({"message": "NOC status?"}));
        let abandoned = tokio::time::timeout(Duration::from_millis(50), h.router.clone().oneshot(chat)).await;
        assert!(abandoned.is_err());
        let report = json_request("POST", &format!("/api/sessions/{}/report", id), json!({}));
        let abandoned = tokio::time::timeout(Duration::from_millis(50), h.router.clone().oneshot(report)).await;
        assert!(abandoned.is_err());

        let mut view = Value::Null;
        for _ in 0..40 {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let (_, body) = call(&h.router, "GET", &format!("/api/sessions/{}", id), None).await;
            view = body["view"].clone();
            if view["chat_state"] == "idle" && view["report_state"] == "idle" {
                break;
            }
        }
        assert_eq!(view["chat_state"], "idle");
        assert_eq!(view["report_state"], "idle");
        assert_eq!(view["chat"].as_array().unwrap().len(), 3);
        assert_eq!(view["report"]["outcome"], "live");

        let (status, body) = call(
            &h.router,
            "POST",
            &format!("/api/sessions/{}/chat", id),
            Some(json!({"message": "And the survey?"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transcript"].as_array().unwrap().len(), 5);
        assert_eq!(h.backend.call_count(), 3);
    }

    #[tokio::test]
    async fn test_offline_report_names_pending_document() {
        let h = harness(None, 10);
        let id = new_session(&h.router).await;
        call(
            &h.router,
            "POST",
            &format!("/api/sessions/{}/events", id),
            Some(json!({"type": "select_property", "property_id": "prop-103"})),
        )
        .await;

        let (status, body) = call(&h.router, "POST", &format!("/api/sessions/{}/report", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report"]["outcome"], "demo");
        assert!(body["report"]["text"]
            .as_str()
            .unwrap()
            .contains("Check specifically for: NOC from Coastal Authority"));
        assert_eq!(h.backend.call_count(), 0);

        let (_, view) = call(&h.router, "GET", &format!("/api/sessions/{}", id), None).await;
        assert_eq!(view["view"]["report"]["outcome"], "demo");
        assert_eq!(view["view"]["report_state"], "idle");
    }

    #[tokio::test]
    async fn test_chat_without_selection_is_rejected() {
        let h = harness(None, 10);
        let id = new_session(&h.router).await;

        let (status, body) = call(
            &h.router,
            "POST",
            &format!("/api/sessions/{}/chat", id),
            Some(json!({"message": "hello"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = call(
            &h.router,
            "POST",
            &format!("/api/sessions/{}/chat", uuid::Uuid::new_v4()),
            Some(json!({"message": "hello"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_clients_cannot_post_login_event() {
        let h = harness(None, 10);
        let id = new_session(&h.router).await;

        let (status, _) = call(
            &h.router,
            "POST",
            &format!("/api/sessions/{}/events", id),
            Some(json!({"type": "login_succeeded", "user": {"name": "Mallory", "phone": "12345"}})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_dashboard_login_flow() {
        let h = harness(None, 10);
        let id = new_session(&h.router).await;
        let events = format!("/api/sessions/{}/events", id);
        let dashboard = format!("/api/sessions/{}/dashboard", id);

        call(&h.router, "POST", &events, Some(json!({"type": "toggle_save", "property_id": "prop-102"}))).await;
        let (_, body) = call(&h.router, "POST", &events, Some(json!({"type": "navigate", "screen": "dashboard"}))).await;
        assert_eq!(body["view"]["rendered"], "login");

        let (status, _) = call(&h.router, "GET", &dashboard, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(&h.router, "POST", "/api/auth/otp", Some(json!({"phone": "+1 555 000 1111"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["destination"], "********1111");
        let code = h.sender.codes.lock().unwrap().last().unwrap().clone();

        let (status, body) = call(
            &h.router,
            "POST",
            "/api/auth/verify",
            Some(json!({"phone": "+15550001111", "code": code, "name": "Rahul J.", "session_id": id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["name"], "Rahul J.");
        assert_eq!(body["session_id"], id.as_str());
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = call(&h.router, "GET", &dashboard, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["saved_properties"][0]["id"], "prop-102");
        assert_eq!(body["active_transaction"]["id"], "HW-HYD-8821");

        let (status, body) = call_with_token(&h.router, "GET", "/api/auth/me", None, Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["phone"], "+15550001111");

        let (status, _) = call(&h.router, "GET", "/api/auth/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_code_is_unauthorized() {
        let h = harness(None, 10);
        call(&h.router, "POST", "/api/auth/otp", Some(json!({"phone": "9845012345"}))).await;
        let code = h.sender.codes.lock().unwrap().last().unwrap().clone();
        let wrong = format!("{:04}", (code.parse::<u32>().unwrap() + 1) % 10_000);

        let (status, body) = call(
            &h.router,
            "POST",
            "/api/auth/verify",
            Some(json!({"phone": "9845012345", "code": wrong})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Incorrect code");

        let (status, _) = call(&h.router, "POST", "/api/auth/otp", Some(json!({"phone": "12"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_otp_endpoints_are_rate_limited() {
        let h = harness(None, 2);
        for _ in 0..2 {
            let (status, _) = call(&h.router, "POST", "/api/auth/otp", Some(json!({"phone": "9845012345"}))).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, body) = call(&h.router, "POST", "/api/auth/otp", Some(json!({"phone": "9845012345"}))).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["success"], false);

        // Other endpoints are unaffected.
        let (status, _) = call(&h.router, "GET", "/api/status", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_lead_capture() {
        let h = harness(None, 10);
        let (status, body) = call(
            &h.router,
            "POST",
            "/api/leads",
            Some(json!({
                "title": "Site Visit & Report",
                "name": "Anita Rao",
                "email": "anita@example.com",
                "phone": "+91 98450 12345"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert!(body["lead_id"].is_string());

        let (status, body) = call(
            &h.router,
            "POST",
            "/api/leads",
            Some(json!({"title": "Legal Opinion", "name": "Anita", "email": "nope", "phone": "9845012345"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "A valid email address is required");

        let (status, body) = call(
            &h.router,
            "POST",
            "/api/leads",
            Some(json!({"title": "Legal Opinion", "name": "Anita", "email": "anita@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "A valid phone number is required");
    }

    #[tokio::test]
    async fn test_session_and_lead_creation_are_rate_limited() {
        let h = harness_with(None, FakeBackend::replying("unused"), |config| config.write_rate_limit = 3);
        new_session(&h.router).await;
        new_session(&h.router).await;

        let lead = json!({
            "title": "Legal Opinion",
            "name": "Anita",
            "email": "anita@example.com",
            "phone": "9845012345"
        });
        let (status, _) = call(&h.router, "POST", "/api/leads", Some(lead.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = call(&h.router, "POST", "/api/sessions", None).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["success"], false);
        let (status, _) = call(&h.router, "POST", "/api/leads", Some(lead)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        // Reads are not counted.
        let (status, body) = call(&h.router, "GET", "/api/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["active_sessions"], 2);
    }
}
