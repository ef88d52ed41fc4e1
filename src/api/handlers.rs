use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::error::{CatalogError, Result};
use crate::logic::IntegrityChecker;
use crate::model::IntegrityReport;
use crate::store::traits::Store;

/// Router state: the injected storage handle plus auth settings
pub struct AppState<S> {
    pub store: Arc<S>,
    pub auth: Arc<AuthConfig>,
}

impl<S> AppState<S> {
    pub fn new(store: Arc<S>, auth: AuthConfig) -> Self {
        Self {
            store,
            auth: Arc::new(auth),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            auth: Arc::clone(&self.auth),
        }
    }
}

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn check_integrity<S: Store>(
    State(state): State<AppState<S>>,
) -> Result<Json<IntegrityReport>> {
    let report = IntegrityChecker::check(&*state.store).await?;
    Ok(Json(report))
}

/// Unwrap a JSON body, reporting unreadable bodies as Validation
pub(crate) fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| CatalogError::validation(rejection.body_text()))
}
