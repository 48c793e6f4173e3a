use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::models::{CreateProfileRequest, Location, LoginRequest, LoginResponse, NewProfile};
use crate::routes::{ApiError, AppState};
use crate::services::bounded;

/// Configure registration and login routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/user/create", web::post().to(create_user))
        .route("/login", web::post().to(login));
}

/// Register a profile
///
/// POST /api/v1/user/create
///
/// Request body:
/// ```json
/// {
///   "email": "string",
///   "password": "string",
///   "name": "string",
///   "age": 30,
///   "gender": "male|female|other",
///   "lat": 51.5,
///   "long": -0.1
/// }
/// ```
async fn create_user(
    state: web::Data<AppState>,
    req: web::Json<CreateProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let req = req.into_inner();
    let new_profile = NewProfile {
        email: req.email,
        password: req.password,
        name: req.name,
        age: req.age,
        gender: req.gender,
        location: Location { lat: req.lat, long: req.long },
    };

    let profile = bounded(state.query_timeout, state.store.create_profile(new_profile)).await?;

    tracing::info!("Registered profile {}", profile.id);

    Ok(HttpResponse::Ok().json(profile))
}

/// Log in and receive a session token
///
/// POST /api/v1/login
async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let token = bounded(state.query_timeout, state.store.login(&req.username, &req.password))
        .await
        .map_err(|e| {
            tracing::info!("Login failed: {}", e);
            e
        })?;

    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}
