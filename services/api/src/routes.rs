//! API service routes

use axum::{
    Json, Router, middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{middleware::auth_middleware, state::AppState};

pub mod activity;
pub mod auth;
pub mod chat;
pub mod health_records;
pub mod profile;

/// Create the router for the API service
///
/// Every route is served both at the root and under `/api`.
pub fn create_router(state: AppState) -> Router {
    let api = api_routes(&state);

    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route(
            "/settings",
            get(profile::get_settings).put(profile::update_settings),
        )
        .route(
            "/activity",
            get(activity::list_activity).post(activity::create_activity),
        )
        .route("/activity/summary", get(activity::activity_summary))
        .route(
            "/health-records",
            get(health_records::list_health_records).post(health_records::create_health_record),
        )
        .route(
            "/health-records/:id",
            delete(health_records::delete_health_record),
        )
        .route("/chat", post(chat::send_message))
        .route("/chat/history", get(chat::chat_history))
        .route("/chat/sessions", get(chat::chat_sessions))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/federated", post(auth::federated))
        .merge(protected_routes)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "health-harbor-api"
    }))
}

#[cfg(test)]
mod tests {
    use crate::testing::{TestApp, read_json};
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_health_is_public_at_both_mounts() {
        let app = TestApp::new();
        for path in ["/health", "/api/health"] {
            let response = app.send(Method::GET, path, None, None).await;
            assert_eq!(response.status(), StatusCode::OK);
            let body = read_json(response).await;
            assert_eq!(body["status"], "ok");
        }
    }

    #[tokio::test]
    async fn test_protected_routes_require_a_token() {
        let app = TestApp::new();
        let routes = [
            (Method::GET, "/profile"),
            (Method::PUT, "/settings"),
            (Method::GET, "/activity"),
            (Method::GET, "/activity/summary"),
            (Method::POST, "/health-records"),
            (Method::DELETE, "/health-records/abc"),
            (Method::POST, "/chat"),
            (Method::GET, "/api/chat/history"),
            (Method::GET, "/api/chat/sessions"),
        ];
        for (method, path) in routes {
            let response = app.send(method.clone(), path, None, None).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {path}");
            let body = read_json(response).await;
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_expired_and_tampered_tokens_are_rejected() {
        let app = TestApp::new();
        let (token, _) = app.register("ann@example.com").await;

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        parts[2] = parts[2].chars().rev().collect();
        let tampered = parts.join(".");

        let expired = app.expired_token("someone");

        for bad in [tampered.as_str(), expired.as_str(), "garbage"] {
            for path in ["/profile", "/chat/sessions", "/health-records"] {
                let response = app.send(Method::GET, path, Some(bad), None).await;
                assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            }
        }

        let response = app.send(Method::GET, "/profile", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
