//! Pure score functions.
//!
//! `base_score` is the sum of live vote powers and `score` is the ranking value
//! derived from it with a logarithmic time decay:
//!
//! ```text
//! score = sign(base) * log10(1 + |base|) - age_hours / decay_hours
//! ```
//!
//! The score is strictly increasing in `base` and non-increasing in the item's age.
use chrono::{DateTime, Duration, Utc};
use vote_ledger_shared::types::{ItemScores, ScoredItem, VoteRecord};

/// Default `decay_hours`: the age at which the penalty cancels a tenfold base score.
///
/// A ranking policy choice; deployments tune it through `VOTES_DECAY_HOURS`.
pub const DEFAULT_DECAY_HOURS: f64 = 12.5;

/// Parameters of the time-decay curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayPolicy {
    /// Must be strictly positive.
    pub decay_hours: f64,
}

impl Default for DecayPolicy {
    fn default() -> Self {
        Self {
            decay_hours: DEFAULT_DECAY_HOURS,
        }
    }
}

impl DecayPolicy {
    pub fn new(decay_hours: f64) -> Self {
        Self { decay_hours }
    }
}

fn live(records: &[VoteRecord]) -> impl Iterator<Item = &VoteRecord> {
    records.iter().filter(|r| r.is_live())
}

/// Sums the power of the live records.
pub fn compute_base_score(records: &[VoteRecord]) -> i64 {
    live(records).map(|r| r.power).sum()
}

/// Counts the live records.
pub fn compute_vote_count(records: &[VoteRecord]) -> i64 {
    live(records).count() as i64
}

/// Sums the power of every record, cancelled ones and unvotes included.
///
/// On a consistent ledger this equals `compute_base_score` over the same records.
pub fn compute_ledger_sum(records: &[VoteRecord]) -> i64 {
    records.iter().map(|r| r.power).sum()
}

/// Computes the decayed ranking score of an item.
///
/// Negative ages (items posted in the future) are treated as zero.
pub fn compute_rank_score(base_score: i64, item_age: Duration, policy: &DecayPolicy) -> f64 {
    let magnitude = (1.0 + base_score.unsigned_abs() as f64).log10();
    let votes_term = if base_score < 0 { -magnitude } else { magnitude };
    let age_hours = item_age.num_milliseconds().max(0) as f64 / 3_600_000.0;
    votes_term - age_hours / policy.decay_hours
}

/// Computes all derived fields of an item from its ledger records.
pub fn recalculate_scores(
    item: &ScoredItem,
    records: &[VoteRecord],
    now: DateTime<Utc>,
    policy: &DecayPolicy,
) -> ItemScores {
    let base_score = compute_base_score(records);
    ItemScores {
        base_score,
        score: compute_rank_score(base_score, now - item.posted_at, policy),
        vote_count: compute_vote_count(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use vote_ledger_shared::types::NewVote;

    fn record(power: i64) -> VoteRecord {
        NewVote::cast(Uuid::new_v4(), "posts", Uuid::new_v4(), "smallUpvote", power, Utc::now())
            .into_record(Uuid::new_v4())
    }

    #[test]
    fn test_base_score_and_count_ignore_retracted_votes() {
        let upvote = record(1);
        let mut downvote = record(-5);
        downvote.cancelled = true;
        let unvote = downvote.unvote(Utc::now()).into_record(Uuid::new_v4());
        let records = vec![upvote, downvote, unvote];

        assert_eq!(compute_base_score(&records), 1);
        assert_eq!(compute_vote_count(&records), 1);
        assert_eq!(compute_ledger_sum(&records), 1);
    }

    #[test]
    fn test_empty_ledger() {
        assert_eq!(compute_base_score(&[]), 0);
        assert_eq!(compute_vote_count(&[]), 0);
        assert_eq!(compute_rank_score(0, Duration::zero(), &DecayPolicy::default()), 0.0);
    }

    #[test]
    fn test_rank_score_strictly_increasing_in_base() {
        let policy = DecayPolicy::default();
        let age = Duration::hours(3);
        let scores: Vec<f64> = (-50..=50)
            .map(|base| compute_rank_score(base, age, &policy))
            .collect();
        assert!(scores.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_rank_score_non_increasing_in_age() {
        let policy = DecayPolicy::default();
        for base in [-20, -1, 0, 1, 20, 10_000] {
            let mut previous = f64::INFINITY;
            for hours in 0..200 {
                let score = compute_rank_score(base, Duration::hours(hours), &policy);
                assert!(score <= previous, "base={base} hours={hours}");
                previous = score;
            }
        }
    }

    #[test]
    fn test_negative_age_is_clamped() {
        let policy = DecayPolicy::new(24.0);
        assert_eq!(
            compute_rank_score(9, Duration::hours(-5), &policy),
            compute_rank_score(9, Duration::zero(), &policy)
        );
        assert_eq!(compute_rank_score(9, Duration::zero(), &policy), 1.0);
        assert_eq!(compute_rank_score(9, Duration::hours(24), &policy), 0.0);
    }

    #[test]
    fn test_recalculate_scores() {
        let now = Utc::now();
        let item = ScoredItem::new(Uuid::new_v4(), "posts", None, now - Duration::hours(25));
        let scores = recalculate_scores(&item, &[record(4), record(5)], now, &DecayPolicy::default());

        assert_eq!(scores.base_score, 9);
        assert_eq!(scores.vote_count, 2);
        assert!((scores.score - (1.0 - 2.0)).abs() < 1e-9);
    }
}
