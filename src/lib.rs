//! Lume Swipe - swipe ledger and match service for Lume dating app
//!
//! Profiles keep a ledger of who they have swiped on and who is waiting for
//! them to like back. A swipe reads and locks both ledgers, decides between a
//! match, a pending like or a pass, and writes the result in one transaction.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{plan_swipe, SwipeOutcome, SwipeService};
pub use models::{Match, ProfileId, SwipeLedger, SwipeResult};
pub use services::{InMemoryStore, LedgerStore, PostgresStore, ProfileStore, StoreError};
