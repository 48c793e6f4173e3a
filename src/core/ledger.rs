use crate::models::{ProfileId, SwipeLedger};
use crate::services::StoreError;

/// What a swipe turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// Like on a profile that had already liked the swiper
    Matched,
    /// Like that now waits for the target to reciprocate
    PendingLike,
    Passed,
}

/// Ledger writes a swipe must apply, decided from the loaded ledgers
#[derive(Debug, Clone, PartialEq)]
pub struct SwipePlan {
    pub outcome: SwipeOutcome,
    /// Updated swiper ledger, always written
    pub swiper: SwipeLedger,
    /// Updated target ledger, present only when the target row changes
    pub target: Option<SwipeLedger>,
}

impl SwipePlan {
    pub fn creates_match(&self) -> bool {
        self.outcome == SwipeOutcome::Matched
    }
}

/// Pick the swiper and target ledgers out of a loaded pair.
///
/// Anything short of two distinct profiles (an unknown id, or a profile
/// swiping on itself) is an invalid request.
pub fn split_pair(
    rows: Vec<SwipeLedger>,
    swiper_id: ProfileId,
    target_id: ProfileId,
) -> Result<(SwipeLedger, SwipeLedger), StoreError> {
    if swiper_id == target_id {
        return Err(StoreError::RequestInvalid);
    }

    let mut swiper = None;
    let mut target = None;
    for ledger in rows {
        if ledger.id == swiper_id {
            swiper = Some(ledger);
        } else if ledger.id == target_id {
            target = Some(ledger);
        }
    }

    match (swiper, target) {
        (Some(swiper), Some(target)) => Ok((swiper, target)),
        _ => Err(StoreError::RequestInvalid),
    }
}

/// Decide the outcome of `swiper` swiping on `target` and compute the
/// resulting ledgers.
///
/// A match happens only on a like from a swiper whose `swiped_yes_by`
/// already holds the target. The target's pending like is consumed, and the
/// swiper's own like on the target, if one is still pending from an earlier
/// swipe, is cleared from the target's ledger too.
pub fn plan_swipe(mut swiper: SwipeLedger, mut target: SwipeLedger, liked: bool) -> SwipePlan {
    swiper.swiped_on.insert(target.id);

    if !liked {
        return SwipePlan {
            outcome: SwipeOutcome::Passed,
            swiper,
            target: None,
        };
    }

    if swiper.swiped_yes_by.remove(&target.id) {
        let target = target.swiped_yes_by.remove(&swiper.id).then_some(target);
        return SwipePlan {
            outcome: SwipeOutcome::Matched,
            swiper,
            target,
        };
    }

    target.swiped_yes_by.insert(swiper.id);
    SwipePlan {
        outcome: SwipeOutcome::PendingLike,
        swiper,
        target: Some(target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(id: ProfileId, swiped_on: &[ProfileId], swiped_yes_by: &[ProfileId]) -> SwipeLedger {
        SwipeLedger::from_columns(id, swiped_on.to_vec(), swiped_yes_by.to_vec())
    }

    #[test]
    fn test_like_after_target_liked_matches() {
        let plan = plan_swipe(ledger(1, &[], &[2]), ledger(2, &[1], &[]), true);

        assert_eq!(plan.outcome, SwipeOutcome::Matched);
        assert!(plan.creates_match());
        assert_eq!(plan.swiper, ledger(1, &[2], &[]));
        assert!(plan.target.is_none());
    }

    #[test]
    fn test_match_keeps_unrelated_pending_likes() {
        let plan = plan_swipe(ledger(1, &[5], &[2, 3]), ledger(2, &[1], &[]), true);

        assert_eq!(plan.swiper, ledger(1, &[2, 5], &[3]));
    }

    #[test]
    fn test_match_clears_stale_like_on_target() {
        // 1 liked 2 earlier, then 2 liked 1 back while 1's like was still recorded
        let plan = plan_swipe(ledger(1, &[2], &[2]), ledger(2, &[1], &[1]), true);

        assert_eq!(plan.outcome, SwipeOutcome::Matched);
        assert_eq!(plan.target, Some(ledger(2, &[1], &[])));
    }

    #[test]
    fn test_first_like_is_pending() {
        let plan = plan_swipe(ledger(1, &[], &[]), ledger(2, &[], &[]), true);

        assert_eq!(plan.outcome, SwipeOutcome::PendingLike);
        assert!(!plan.creates_match());
        assert_eq!(plan.swiper, ledger(1, &[2], &[]));
        assert_eq!(plan.target, Some(ledger(2, &[], &[1])));
    }

    #[test]
    fn test_pass_only_touches_swiper() {
        let plan = plan_swipe(ledger(1, &[], &[2]), ledger(2, &[], &[7]), false);

        assert_eq!(plan.outcome, SwipeOutcome::Passed);
        // A pass does not consume the target's pending like either
        assert_eq!(plan.swiper, ledger(1, &[2], &[2]));
        assert!(plan.target.is_none());
    }

    #[test]
    fn test_repeated_pass_is_idempotent() {
        let first = plan_swipe(ledger(1, &[], &[]), ledger(2, &[], &[]), false);
        let second = plan_swipe(first.swiper.clone(), ledger(2, &[], &[]), false);

        assert_eq!(second.swiper.swiped_on_column(), vec![2]);
    }

    #[test]
    fn test_split_pair_resolves_by_id() {
        let rows = vec![ledger(2, &[], &[]), ledger(9, &[], &[])];
        let (swiper, target) = split_pair(rows, 9, 2).unwrap();
        assert_eq!(swiper.id, 9);
        assert_eq!(target.id, 2);
    }

    #[test]
    fn test_split_pair_rejects_missing_and_self() {
        assert!(matches!(
            split_pair(vec![ledger(1, &[], &[])], 1, 2),
            Err(StoreError::RequestInvalid)
        ));
        assert!(matches!(
            split_pair(vec![ledger(1, &[], &[])], 1, 1),
            Err(StoreError::RequestInvalid)
        ));
    }
}
