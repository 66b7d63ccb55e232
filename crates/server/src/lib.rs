//! HTTP surface of the Gazette content backend.
//!
//! [`service`] builds the complete salvo [`Service`]: the `/api` routes, the
//! request logger, the body size cap, shared [`AppState`] and CORS.

use std::sync::Arc;

use gazette_core::{DocumentStore, Repositories};
use salvo::affix_state;
use salvo::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, Cors, CorsHandler};
use salvo::http::HeaderValue;
use salvo::http::request::SecureMaxSize;
use salvo::logging::Logger;
use salvo::prelude::*;

pub mod config;
mod error;
pub mod handlers;
pub mod media;

pub use self::config::{Config, ConfigError};
pub use self::error::{AppError, AppResult};
pub use self::media::MediaStore;

/// State shared by every request.
#[derive(Debug)]
pub struct AppState {
    /// Record access.
    pub repos: Repositories,
    /// Uploaded images.
    pub media: MediaStore,
}

impl AppState {
    /// Builds the state over an already connected store.
    pub fn new(store: Arc<dyn DocumentStore>, media: MediaStore) -> Self {
        Self {
            repos: Repositories::new(store),
            media,
        }
    }
}

/// Router with the `/api` tree and the shared state injected.
///
/// JSON and multipart bodies up to `max_body_bytes` are accepted.
pub fn router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .hoop(Logger::default())
        .hoop(SecureMaxSize(max_body_bytes))
        .hoop(affix_state::inject(state))
        .push(handlers::api_router())
}

/// CORS policy for the configured origins.
///
/// `*` allows any origin without credentials. An explicit list allows those
/// origins with credentials and mirrors the requested method and headers.
pub fn cors(origins: &[String]) -> CorsHandler {
    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return Cors::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .into_handler();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    Cors::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .into_handler()
}

/// The complete service: routes behind the CORS handler.
pub fn service(state: Arc<AppState>, config: &Config) -> Service {
    Service::new(router(state, config.max_body_bytes)).hoop(cors(&config.cors_origins))
}
