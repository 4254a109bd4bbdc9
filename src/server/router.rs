use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::env;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{chat, health};
use crate::state::AppState;

/// Creates the application router with all routes and middleware.
///
/// This function sets up:
/// - CORS middleware
/// - Health check endpoint
/// - Deep-search chat endpoint
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state);
    Router::new()
        .route("/health", get(health::health))
        .route("/api/deep_searcher", post(chat::deep_searcher))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

enum Origins {
    Any,
    List(Vec<String>),
}

fn build_cors_layer(state: &Arc<AppState>) -> CorsLayer {
    let env_origins = env::var("DEEPSEARCH_ALLOWED_ORIGINS").ok();
    let allow_origin = match resolve_allowed_origins(
        &state.config.server.allowed_origins,
        env_origins.as_deref(),
    ) {
        Origins::Any => AllowOrigin::any(),
        Origins::List(origins) => AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok())
                .collect::<Vec<_>>(),
        ),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

/// Env var beats file config; a literal `*` anywhere opens the API up; an
/// empty result falls back to local dev origins.
fn resolve_allowed_origins(configured: &[String], env_value: Option<&str>) -> Origins {
    let mut origins: Vec<String> = configured
        .iter()
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect();

    if let Some(raw) = env_value {
        let from_env: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
        if !from_env.is_empty() {
            origins = from_env;
        }
    }

    if origins.iter().any(|origin| origin == "*") {
        return Origins::Any;
    }
    if origins.is_empty() {
        return Origins::List(default_local_origins());
    }
    Origins::List(origins)
}

fn default_local_origins() -> Vec<String> {
    vec![
        "http://localhost".to_string(),
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://localhost:8501".to_string(),
        "http://127.0.0.1".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
        "http://127.0.0.1:8501".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(origins: Origins) -> Vec<String> {
        match origins {
            Origins::List(origins) => origins,
            Origins::Any => panic!("expected a fixed origin list"),
        }
    }

    #[test]
    fn empty_config_falls_back_to_local_defaults() {
        let origins = list(resolve_allowed_origins(&[], None));
        assert!(origins.contains(&"http://localhost:8501".to_string()));
        assert!(origins.contains(&"http://127.0.0.1:3000".to_string()));
    }

    #[test]
    fn configured_origins_are_used_verbatim() {
        let configured = vec!["https://app.example.com".to_string()];
        let origins = list(resolve_allowed_origins(&configured, None));
        assert_eq!(origins, vec!["https://app.example.com".to_string()]);
    }

    #[test]
    fn env_value_overrides_config() {
        let configured = vec!["https://app.example.com".to_string()];
        let origins = list(resolve_allowed_origins(
            &configured,
            Some("https://a.example, https://b.example"),
        ));
        assert_eq!(
            origins,
            vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ]
        );
    }

    #[test]
    fn wildcard_allows_any_origin() {
        assert!(matches!(
            resolve_allowed_origins(&["*".to_string()], None),
            Origins::Any
        ));
        assert!(matches!(
            resolve_allowed_origins(&[], Some("*")),
            Origins::Any
        ));
    }

    #[test]
    fn blank_env_value_keeps_config() {
        let configured = vec!["https://app.example.com".to_string()];
        let origins = list(resolve_allowed_origins(&configured, Some("  ")));
        assert_eq!(origins, vec!["https://app.example.com".to_string()]);
    }
}
