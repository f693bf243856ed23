//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use wishwall_core::view::LoadStatus;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether the last wall reload succeeded.
    pub wall: &'static str,
    pub timestamp: String,
}

/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let wall = state
        .sync
        .read(|view| match view.status() {
            LoadStatus::Loading => "loading",
            LoadStatus::Ready => "ready",
            LoadStatus::Failed(_) => "failed",
        })
        .await;

    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        wall,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
