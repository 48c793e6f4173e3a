use crate::models::{DiscoverFilters, DiscoverProfile, Match, NewProfile, Profile, ProfileId, SwipeLedger};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the data stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to swipe on profile")]
    RequestInvalid,

    #[error("query timed out")]
    Timeout,

    #[error("could not access data store: {0}")]
    Database(String),

    #[error("could not log in")]
    LoginFailed,

    #[error("no valid session")]
    NoValidSession,

    #[error("email address is already registered")]
    EmailTaken,

    #[error("migration error: {0}")]
    Migration(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StoreError::Timeout,
            other => StoreError::Database(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Migration(err.to_string())
    }
}

/// Run a store operation under a deadline, failing with [`StoreError::Timeout`]
/// when it elapses. Dropping the operation drops any transaction it holds.
pub async fn bounded<T, F>(limit: Duration, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, operation)
        .await
        .map_err(|_| StoreError::Timeout)?
}

/// Source of swipe transactions
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Open a transaction. Dropping it without calling
    /// [`LedgerTransaction::commit`] rolls back every write made through it.
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, StoreError>;
}

/// Transaction-scoped ledger and match operations
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Load and lock the ledgers of both ids in one read.
    /// Unknown ids are simply absent from the result.
    async fn load_ledger_pair(
        &mut self,
        first: ProfileId,
        second: ProfileId,
    ) -> Result<Vec<SwipeLedger>, StoreError>;

    /// Overwrite both ledger sets of a profile
    async fn persist_ledger(&mut self, ledger: &SwipeLedger) -> Result<(), StoreError>;

    /// Insert the match for an unordered pair, or return the one already recorded
    async fn create_match(&mut self, first: ProfileId, second: ProfileId) -> Result<Match, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Profiles, sessions and read-only views over ledgers and matches
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, StoreError>;

    /// Check credentials and start a session, returning its token
    async fn login(&self, email: &str, password: &str) -> Result<String, StoreError>;

    /// Resolve a live session token to its user
    async fn resolve_session(&self, token: &str) -> Result<ProfileId, StoreError>;

    /// Profiles matching the filters that the user has not swiped on yet
    async fn list_candidates(
        &self,
        user_id: ProfileId,
        filters: &DiscoverFilters,
    ) -> Result<Vec<DiscoverProfile>, StoreError>;

    async fn get_ledger(&self, id: ProfileId) -> Result<Option<SwipeLedger>, StoreError>;

    async fn matches_for(&self, id: ProfileId) -> Result<Vec<Match>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
