// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    DiscoverFilters, DiscoverProfile, Location, Match, NewProfile, Profile, ProfileId, Session,
    SwipeLedger, SwipeResult, GENDERS,
};
pub use requests::{CreateProfileRequest, DiscoverRequest, LoginRequest, SwipeRequest};
pub use responses::{
    DiscoverResponse, ErrorResponse, HealthResponse, LoginResponse, MatchesResponse, SwipeResponse,
};
