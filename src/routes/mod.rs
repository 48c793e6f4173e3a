// Route exports
pub mod accounts;
pub mod auth;
pub mod error;
pub mod matches;

use actix_web::web;
use std::sync::Arc;
use std::time::Duration;

use crate::core::SwipeService;
use crate::services::ProfileStore;

pub use auth::{AuthenticatedUser, SESSION_HEADER};
pub use error::{handle_json_payload_error, ApiError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    pub swipes: SwipeService,
    pub query_timeout: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn ProfileStore>, swipes: SwipeService) -> Self {
        Self {
            store,
            query_timeout: swipes.timeout(),
            swipes,
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
        .service(
            web::scope("/api/v1")
                .configure(accounts::configure)
                .configure(matches::configure),
        );
}
