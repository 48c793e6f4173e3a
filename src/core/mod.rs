// Core algorithm exports
pub mod distance;
pub mod ledger;
pub mod swipe;

pub use distance::{haversine_distance, sort_by_distance};
pub use ledger::{plan_swipe, split_pair, SwipeOutcome, SwipePlan};
pub use swipe::SwipeService;
