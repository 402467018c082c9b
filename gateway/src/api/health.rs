use crate::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: String,
}

#[derive(Serialize, Debug)]
pub struct ApiInfo {
    pub message: String,
    pub status: &'static str,
}

pub async fn health() -> Json<Health> {
    tracing::debug!("Health check");
    Json(Health {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn root(State(state): State<AppState>) -> Json<ApiInfo> {
    Json(ApiInfo {
        message: state.api.title.clone(),
        status: "running",
    })
}
