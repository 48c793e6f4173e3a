use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use std::future::Future;
use std::pin::Pin;

use crate::models::ProfileId;
use crate::routes::error::ApiError;
use crate::routes::AppState;
use crate::services::{bounded, StoreError};

/// Header carrying the session token issued by `/login`
pub const SESSION_HEADER: &str = "session";

/// The user behind a valid session, resolved before the handler runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub ProfileId);

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let token = token.ok_or_else(|| ApiError::InvalidRequest("missing session header".to_string()))?;
            let state = state.ok_or_else(|| StoreError::Database("application state unavailable".to_string()))?;

            match bounded(state.query_timeout, state.store.resolve_session(&token)).await {
                Ok(user_id) => Ok(AuthenticatedUser(user_id)),
                Err(StoreError::NoValidSession) => Err(ApiError::MustBeLoggedIn),
                Err(e) => Err(e.into()),
            }
        })
    }
}
