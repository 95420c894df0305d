use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{self, AppState};
use crate::crictl::ImageRecord;
use crate::inventory::{AggregateResult, HarborImageRecord, Source, SourceError};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Image API",
        version = "0.1.0",
        description = "Unified view of container images held by the local containerd runtime and the Harbor registry.",
        license(name = "MIT")
    ),
    tags(
        (name = "system", description = "System information"),
        (name = "images", description = "Image inventory")
    ),
    paths(handlers::get_version, handlers::get_images),
    components(schemas(
        handlers::VersionInfo,
        AggregateResult,
        ImageRecord,
        HarborImageRecord,
        SourceError,
        Source,
    ))
)]
pub struct ApiDoc;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/version", get(handlers::get_version))
        .route("/images", get(handlers::get_images))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
