//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api`; `/health` and the `/ws`
//! upgrade live at the root.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the complete router with all REST endpoints and the WebSocket
/// upgrade, without state.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api", handlers::routes())
        .merge(handlers::system::routes())
        .route("/ws", get(ws_handler))
}

/// Builds the served application: routes, HTTP tracing, permissive CORS and,
/// with the `swagger-ui` feature, the interactive API docs.
pub fn build_app(state: AppState) -> Router {
    let app = build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        app.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    app
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::{Identity, JwtAuthenticator};
    use crate::domain::UserId;
    use crate::persistence::Stores;

    struct Harness {
        app: Router,
        auth: Arc<JwtAuthenticator>,
    }

    impl Harness {
        fn new() -> Self {
            let auth = Arc::new(JwtAuthenticator::new("router-test-secret"));
            let state = AppState::new(Stores::in_memory(), Arc::clone(&auth) as _);
            Self {
                app: build_app(state),
                auth,
            }
        }

        fn token(&self, user: UserId, verified: bool) -> String {
            let identity = Identity {
                user_id: user,
                contact: "someone@example.com".to_string(),
                verified,
            };
            let Ok(token) = self.auth.issue(&identity, chrono::Duration::hours(1)) else {
                panic!("signing failed");
            };
            token
        }

        async fn call(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let body = match body {
                Some(json) => {
                    builder = builder.header(header::CONTENT_TYPE, "application/json");
                    Body::from(json.to_string())
                }
                None => Body::empty(),
            };
            let Ok(request) = builder.body(body) else {
                panic!("bad request");
            };
            let Ok(response) = self.app.clone().oneshot(request).await else {
                panic!("router failed");
            };
            let status = response.status();
            let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
                panic!("body read failed");
            };
            let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, value)
        }
    }

    #[tokio::test]
    async fn health_needs_no_token() {
        let h = Harness::new();
        let (status, body) = h.call("GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("status"), Some(&json!("healthy")));
    }

    #[tokio::test]
    async fn api_rejects_missing_and_unverified_tokens() {
        let h = Harness::new();
        let (status, body) = h.call("GET", "/api/matches", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.get("success"), Some(&json!(false)));
        assert_eq!(body.get("code"), Some(&json!(4001)));

        let token = h.token(UserId::new(), false);
        let (status, _) = h.call("GET", "/api/matches", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn mutual_like_over_http_reports_match() {
        let h = Harness::new();
        let (u1, u2) = (UserId::new(), UserId::new());
        let (t1, t2) = (h.token(u1, true), h.token(u2, true));

        let (status, body) = h
            .call("POST", "/api/likes/send", Some(&t1), Some(json!({ "targetUserId": u2 })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("isMatch"), Some(&json!(false)));
        assert_eq!(body.get("match"), None);

        let (status, body) = h
            .call("POST", "/api/likes/super-like", Some(&t2), Some(json!({ "targetUserId": u1 })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("isMatch"), Some(&json!(true)));
        assert_eq!(body.get("isSuperLike"), Some(&json!(true)));
        assert_eq!(
            body.pointer("/match/user/userId"),
            Some(&json!(u1.to_string()))
        );

        let (_, listed) = h.call("GET", "/api/matches", Some(&t1), None).await;
        assert_eq!(listed.get("count"), Some(&json!(1)));
        let (_, rooms) = h.call("GET", "/api/messages/matches", Some(&t2), None).await;
        assert_eq!(rooms.pointer("/matches/0/isActive"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn swipe_validation_errors_are_bad_request() {
        let h = Harness::new();
        let (u1, u2) = (UserId::new(), UserId::new());
        let t1 = h.token(u1, true);

        let (status, _) = h
            .call("POST", "/api/likes/send", Some(&t1), Some(json!({})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = h
            .call("POST", "/api/likes/send", Some(&t1), Some(json!({ "targetUserId": u1 })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.get("code"), Some(&json!(1002)));

        let (status, _) = h
            .call("POST", "/api/likes/pass", Some(&t1), Some(json!({ "targetUserId": u2 })))
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = h
            .call("POST", "/api/likes/send", Some(&t1), Some(json!({ "targetUserId": u2 })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.get("code"), Some(&json!(2002)));
    }

    #[tokio::test]
    async fn likes_you_lists_incoming_likes() {
        let h = Harness::new();
        let (me, fan) = (UserId::new(), UserId::new());
        let (t_me, t_fan) = (h.token(me, true), h.token(fan, true));
        let _ = h
            .call("POST", "/api/likes/send", Some(&t_fan), Some(json!({ "targetUserId": me })))
            .await;

        let (status, body) = h.call("GET", "/api/likes/likes-you", Some(&t_me), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("count"), Some(&json!(1)));
        assert_eq!(body.pointer("/likes/0/userId"), Some(&json!(fan.to_string())));
        assert_eq!(body.pointer("/likes/0/action"), Some(&json!("like")));
    }

    #[tokio::test]
    async fn unmatch_and_history_access() {
        let h = Harness::new();
        let (u1, u2, outsider) = (UserId::new(), UserId::new(), UserId::new());
        let (t1, t2, t_out) = (h.token(u1, true), h.token(u2, true), h.token(outsider, true));
        let _ = h
            .call("POST", "/api/likes/send", Some(&t1), Some(json!({ "targetUserId": u2 })))
            .await;
        let (_, body) = h
            .call("POST", "/api/likes/send", Some(&t2), Some(json!({ "targetUserId": u1 })))
            .await;
        let Some(match_id) = body.pointer("/match/matchId").and_then(Value::as_str) else {
            panic!("expected a match id in {body}");
        };
        let history = format!("/api/messages/messages/{match_id}?limit=10");

        let (status, body) = h.call("GET", &history, Some(&t1), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("messages"), Some(&json!([])));
        let (status, _) = h.call("GET", &history, Some(&t_out), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let path = format!("/api/matches/{match_id}");
        let (status, _) = h.call("DELETE", &path, Some(&t_out), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = h.call("DELETE", &path, Some(&t2), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = h.call("GET", &history, Some(&t1), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let unknown = format!("/api/matches/{}", uuid::Uuid::new_v4());
        let (status, _) = h.call("DELETE", &unknown, Some(&t1), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_history_query_is_json_bad_request() {
        let h = Harness::new();
        let (u1, u2) = (UserId::new(), UserId::new());
        let (t1, t2) = (h.token(u1, true), h.token(u2, true));
        let _ = h
            .call("POST", "/api/likes/send", Some(&t1), Some(json!({ "targetUserId": u2 })))
            .await;
        let (_, body) = h
            .call("POST", "/api/likes/send", Some(&t2), Some(json!({ "targetUserId": u1 })))
            .await;
        let Some(match_id) = body.pointer("/match/matchId").and_then(Value::as_str) else {
            panic!("expected a match id in {body}");
        };

        let uri = format!("/api/messages/messages/{match_id}?limit=abc");
        let (status, body) = h.call("GET", &uri, Some(&t1), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.get("success"), Some(&json!(false)));
        assert_eq!(body.get("code"), Some(&json!(1001)));

        let (status, body) = h
            .call("GET", "/api/messages/messages/not-a-uuid", Some(&t1), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.get("code"), Some(&json!(1001)));
    }

    #[tokio::test]
    async fn malformed_unmatch_id_is_json_bad_request() {
        let h = Harness::new();
        let token = h.token(UserId::new(), true);
        let (status, body) = h
            .call("DELETE", "/api/matches/not-a-uuid", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.get("success"), Some(&json!(false)));
        assert_eq!(body.get("code"), Some(&json!(1001)));
        assert!(body.get("message").and_then(Value::as_str).is_some());
    }

    #[tokio::test]
    async fn ws_upgrade_requires_token() {
        let h = Harness::new();
        let (status, _) = h.call("GET", "/ws", None, None).await;
        assert_ne!(status, StatusCode::SWITCHING_PROTOCOLS);
    }
}
