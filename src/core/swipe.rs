use crate::core::ledger::{plan_swipe, split_pair};
use crate::models::{ProfileId, SwipeResult};
use crate::services::{bounded, LedgerStore, StoreError};
use std::sync::Arc;
use std::time::Duration;

/// Applies swipes as single transactions
///
/// Each call loads and locks both ledgers, decides the outcome, writes the
/// changed ledgers and the match row if any, then commits. Every error,
/// including the deadline elapsing, drops the transaction and leaves the
/// store unchanged.
#[derive(Clone)]
pub struct SwipeService {
    store: Arc<dyn LedgerStore>,
    timeout: Duration,
}

impl SwipeService {
    pub fn new(store: Arc<dyn LedgerStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Swipe under the configured deadline
    pub async fn swipe(
        &self,
        swiper_id: ProfileId,
        target_id: ProfileId,
        liked: bool,
    ) -> Result<SwipeResult, StoreError> {
        self.swipe_within(swiper_id, target_id, liked, self.timeout).await
    }

    /// Swipe under a caller-supplied deadline
    pub async fn swipe_within(
        &self,
        swiper_id: ProfileId,
        target_id: ProfileId,
        liked: bool,
        limit: Duration,
    ) -> Result<SwipeResult, StoreError> {
        tracing::info!(swiper = swiper_id, target = target_id, liked, "Swiping profile");

        let result = bounded(limit, self.apply(swiper_id, target_id, liked)).await;

        match &result {
            Ok(outcome) => tracing::info!(
                swiper = swiper_id,
                target = target_id,
                matched = outcome.matched,
                match_id = ?outcome.match_id,
                "Swiping profile complete"
            ),
            Err(e) => tracing::warn!(swiper = swiper_id, target = target_id, error = %e, "Swipe failed"),
        }

        result
    }

    async fn apply(
        &self,
        swiper_id: ProfileId,
        target_id: ProfileId,
        liked: bool,
    ) -> Result<SwipeResult, StoreError> {
        let mut tx = self.store.begin().await?;

        let rows = tx.load_ledger_pair(swiper_id, target_id).await?;
        let (swiper, target) = split_pair(rows, swiper_id, target_id)?;
        let plan = plan_swipe(swiper, target, liked);

        tracing::debug!(outcome = ?plan.outcome, "Swipe decided, writing ledgers");

        tx.persist_ledger(&plan.swiper).await?;
        if let Some(target) = &plan.target {
            tx.persist_ledger(target).await?;
        }

        let result = if plan.creates_match() {
            let created = tx.create_match(swiper_id, target_id).await?;
            SwipeResult::matched(created.id)
        } else {
            SwipeResult::no_match()
        };

        tx.commit().await?;
        Ok(result)
    }
}
