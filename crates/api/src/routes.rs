//! Router and handlers.

use axum::extract::{Json, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use orchestrator::{TurnRequest, TurnResponse};
use serde::Serialize;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::error;

use crate::config::ConfigError;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct Status {
    message: String,
    status: String,
}

#[derive(Debug, Serialize)]
struct Health {
    status: String,
}

/// Build the application router with CORS for `cors_origin`.
pub fn router(state: AppState, cors_origin: &str) -> Result<Router, ConfigError> {
    let origin = HeaderValue::from_str(cors_origin)
        .map_err(|_| ConfigError::InvalidOrigin(cors_origin.to_string()))?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Ok(Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ask", post(ask))
        .layer(cors)
        .with_state(state))
}

async fn root() -> Json<Status> {
    Json(Status {
        message: "Economic data agent is running".to_string(),
        status: "healthy".to_string(),
    })
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}

async fn ask(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    authorize(&state, &headers)?;

    let user_id = request.user_id.clone();
    match state.orchestrator.process(request).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => {
            error!("Error processing query for user {}: {}", user_id, err);
            Ok(Json(TurnResponse::text(format!("Error: {}", err))))
        }
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.api_token.as_deref() else {
        return Ok(());
    };

    let Some(value) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Err(ApiError::Unauthorized);
    };

    let Ok(value) = value.to_str() else {
        return Err(ApiError::Unauthorized);
    };

    let token = value.strip_prefix("Bearer ").unwrap_or(value);
    if token != expected {
        return Err(ApiError::Unauthorized);
    }

    Ok(())
}
