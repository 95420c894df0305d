use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::config::Settings;
use crate::inventory::{AggregateResult, Inventory};

/// Shared application state
pub struct AppState {
    pub inventory: Inventory,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            inventory: Inventory::new(settings.clone()),
            settings,
        }
    }
}

// === Version ===

/// Version information
#[derive(Serialize, ToSchema)]
pub struct VersionInfo {
    pub version: String,
}

/// Get service version
#[utoipa::path(
    get,
    path = "/version",
    responses(
        (status = 200, description = "Service version", body = VersionInfo)
    ),
    tag = "system"
)]
pub async fn get_version() -> Json<VersionInfo> {
    Json(VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// === Images ===

/// List images from containerd and Harbor
///
/// Always answers 200. Failures of either source are reported in `errors`.
#[utoipa::path(
    get,
    path = "/images",
    responses(
        (status = 200, description = "Combined image inventory", body = AggregateResult)
    ),
    tag = "images"
)]
pub async fn get_images(State(state): State<Arc<AppState>>) -> Response {
    let result = state.inventory.collect().await;

    if !state.settings.app_config.pretty_json {
        return Json(result).into_response();
    }

    match serde_json::to_string_pretty(&result) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to serialize image inventory");
            Json(result).into_response()
        }
    }
}
