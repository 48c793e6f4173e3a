use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::sort_by_distance;
use crate::models::{
    DiscoverFilters, DiscoverRequest, DiscoverResponse, HealthResponse, Location, MatchesResponse,
    SwipeRequest, SwipeResponse,
};
use crate::routes::{ApiError, AppState, AuthenticatedUser};
use crate::services::bounded;

/// Configure discovery, swipe and match routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/discover", web::post().to(discover))
        .route("/swipe", web::post().to(swipe))
        .route("/matches", web::get().to(list_matches));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = bounded(state.query_timeout, state.store.health_check())
        .await
        .unwrap_or(false);

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Discover candidates, nearest first
///
/// POST /api/v1/discover
///
/// Request body:
/// ```json
/// {
///   "minAge": 18,
///   "maxAge": 40,
///   "genders": ["female"],
///   "lat": 51.5,
///   "long": -0.1
/// }
/// ```
async fn discover(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<DiscoverRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let AuthenticatedUser(user_id) = user;
    let req = req.into_inner();
    let filters = DiscoverFilters {
        min_age: req.min_age.unwrap_or(0),
        max_age: req.max_age.unwrap_or(0),
        genders: req.genders,
    };

    let mut results = bounded(state.query_timeout, state.store.list_candidates(user_id, &filters)).await?;
    sort_by_distance(&mut results, &Location { lat: req.lat, long: req.long });

    tracing::info!("Returning {} candidates for user {}", results.len(), user_id);

    Ok(HttpResponse::Ok().json(DiscoverResponse { results }))
}

/// Like or pass on a profile
///
/// POST /api/v1/swipe
///
/// Request body:
/// ```json
/// { "user": 2, "liked": true }
/// ```
async fn swipe(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<SwipeRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let AuthenticatedUser(user_id) = user;
    let result = state.swipes.swipe(user_id, req.user_id, req.liked).await?;

    Ok(HttpResponse::Ok().json(SwipeResponse {
        matched: result.matched,
        match_id: result.match_id,
    }))
}

/// Matches of the logged-in user
///
/// GET /api/v1/matches
async fn list_matches(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let AuthenticatedUser(user_id) = user;
    let matches = bounded(state.query_timeout, state.store.matches_for(user_id)).await?;

    Ok(HttpResponse::Ok().json(MatchesResponse {
        user_id,
        count: matches.len(),
        matches,
    }))
}
