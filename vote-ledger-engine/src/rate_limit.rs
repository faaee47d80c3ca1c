//! Voting rate limits.
//!
//! Rules are evaluated over the voter's live votes from the last 24 hours,
//! self-votes excluded. A rule is exceeded when the number of matching votes
//! already cast reaches its `vote_count`. Admins and votes on one's own content
//! are never limited.
use chrono::{DateTime, Duration, Utc};
use vote_ledger_shared::types::{ScoredItem, VoteRecord, Voter};

use crate::registry::VoteTypeRegistry;

/// Longest period a rule may span; the engine only loads this much history.
pub fn lookback() -> Duration {
    Duration::hours(24)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleVoteTypes {
    All,
    OnlyStrong,
    OnlyDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// Votes on anyone's content.
    AllUsers,
    /// Votes on content by the author of the item being voted on.
    SingleAuthor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitConsequence {
    Deny,
    FlagForModeration,
    WarningPopup,
}

#[derive(Debug, Clone)]
pub struct VotingRateLimit {
    pub vote_count: usize,
    pub period: Duration,
    pub types: RuleVoteTypes,
    pub scope: RuleScope,
    pub consequence: RateLimitConsequence,
    pub message: Option<&'static str>,
}

/// The combined result of every exceeded rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitVerdict {
    /// Message of the first exceeded rule, set when any exceeded rule denies the vote.
    pub denied: Option<String>,
    pub flag_for_moderation: bool,
    /// Set when a warning rule was exceeded and no flag was raised.
    pub warning: bool,
}

impl RateLimitVerdict {
    pub fn is_denied(&self) -> bool {
        self.denied.is_some()
    }
}

/// Evaluates a list of `VotingRateLimit` rules.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    rules: Vec<VotingRateLimit>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl RateLimiter {
    pub fn new(rules: Vec<VotingRateLimit>) -> Self {
        Self { rules }
    }

    /// The forum's rule set.
    pub fn with_defaults() -> Self {
        Self::new(vec![
            VotingRateLimit {
                vote_count: 200,
                period: Duration::hours(24),
                types: RuleVoteTypes::All,
                scope: RuleScope::AllUsers,
                consequence: RateLimitConsequence::Deny,
                message: Some("too many votes in one day"),
            },
            VotingRateLimit {
                vote_count: 100,
                period: Duration::hours(1),
                types: RuleVoteTypes::All,
                scope: RuleScope::AllUsers,
                consequence: RateLimitConsequence::Deny,
                message: Some("too many votes in one hour"),
            },
            VotingRateLimit {
                vote_count: 100,
                period: Duration::hours(24),
                types: RuleVoteTypes::All,
                scope: RuleScope::SingleAuthor,
                consequence: RateLimitConsequence::Deny,
                message: Some("too many votes today on content by this author"),
            },
            VotingRateLimit {
                vote_count: 9,
                period: Duration::minutes(2),
                types: RuleVoteTypes::OnlyDown,
                scope: RuleScope::SingleAuthor,
                consequence: RateLimitConsequence::FlagForModeration,
                message: Some("too many votes in short succession on content by this author"),
            },
            VotingRateLimit {
                vote_count: 10,
                period: Duration::minutes(3),
                types: RuleVoteTypes::All,
                scope: RuleScope::SingleAuthor,
                consequence: RateLimitConsequence::WarningPopup,
                message: None,
            },
        ])
    }

    pub fn rules(&self) -> &[VotingRateLimit] {
        &self.rules
    }

    /// Evaluates the rules for a vote about to be cast on `item`.
    ///
    /// # Arguments
    ///
    /// * `voter` - The user casting the vote
    /// * `item` - The item being voted on
    /// * `recent_votes` - The voter's live votes from the last 24 hours
    /// * `registry` - Used to classify past votes as strong or down
    /// * `now` - Evaluation instant
    pub fn evaluate(
        &self,
        voter: &Voter,
        item: &ScoredItem,
        recent_votes: &[VoteRecord],
        registry: &VoteTypeRegistry,
        now: DateTime<Utc>,
    ) -> RateLimitVerdict {
        if voter.is_admin || item.author_id == Some(voter.id) {
            return RateLimitVerdict::default();
        }

        let votes: Vec<&VoteRecord> = recent_votes
            .iter()
            .filter(|v| v.is_live() && !v.is_self_vote())
            .collect();

        let mut first_exceeded: Option<&VotingRateLimit> = None;
        let (mut deny, mut flag, mut warn) = (false, false, false);

        for rule in &self.rules {
            if votes.len() < rule.vote_count {
                continue;
            }
            let matching = votes
                .iter()
                .filter(|v| rule_matches(rule, v, item, registry, now))
                .count();
            if matching < rule.vote_count {
                continue;
            }
            if first_exceeded.is_none() {
                first_exceeded = Some(rule);
            }
            match rule.consequence {
                RateLimitConsequence::Deny => deny = true,
                RateLimitConsequence::FlagForModeration => flag = true,
                RateLimitConsequence::WarningPopup => warn = true,
            }
        }

        let denied = match first_exceeded {
            Some(rule) if deny => Some(rule.message.unwrap_or("rate limit reached").to_string()),
            _ => None,
        };
        RateLimitVerdict {
            denied,
            flag_for_moderation: flag,
            warning: warn && !flag,
        }
    }
}

fn rule_matches(
    rule: &VotingRateLimit,
    vote: &VoteRecord,
    item: &ScoredItem,
    registry: &VoteTypeRegistry,
    now: DateTime<Utc>,
) -> bool {
    if now - vote.voted_at > rule.period {
        return false;
    }
    if rule.scope == RuleScope::SingleAuthor {
        match item.author_id {
            Some(author) if vote.author_ids.contains(&author) => {}
            _ => return false,
        }
    }
    let definition = registry.get(&vote.kind);
    match rule.types {
        RuleVoteTypes::All => true,
        RuleVoteTypes::OnlyStrong => definition.is_some_and(|d| d.is_strong()),
        RuleVoteTypes::OnlyDown => definition.is_some_and(|d| d.is_down()),
    }
}
