use std::sync::Arc;

use axum::{extract::State, routing, Json, Router};
use chrono::Utc;
use mailform_core_health_contracts::HealthFeatureService;

use crate::models::health::ApiHealthStatus;

pub fn router(service: Arc<impl HealthFeatureService>) -> Router<()> {
    Router::new()
        .route("/health", routing::get(health).fallback(super::not_found))
        .with_state(service)
}

async fn health(service: State<Arc<impl HealthFeatureService>>) -> Json<ApiHealthStatus> {
    let status = service.get_status().await;
    Json(ApiHealthStatus::new(status, Utc::now()))
}
