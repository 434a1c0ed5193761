//! CORS Middleware Configuration

use axum::http::HeaderName;
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsSettings;
use crate::presentation::http::extractors::TOTAL_COUNT_HEADER;

/// Create CORS layer from settings
///
/// `X-Total-Count` is exposed so browsers can read list totals.
pub fn create_cors_layer(settings: &CorsSettings) -> CorsLayer {
    let origins: Vec<_> = settings
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    let exposed: [HeaderName; 1] = [TOTAL_COUNT_HEADER.clone()];

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(exposed)
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(exposed)
            .max_age(std::time::Duration::from_secs(3600)) // 1 hour default
    }
}

