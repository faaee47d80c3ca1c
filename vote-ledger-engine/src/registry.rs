//! The vote type registry.
//!
//! A lookup table from vote-kind names to their definitions. It is built once at
//! startup and shared immutably behind an `Arc` afterwards.
use std::collections::HashMap;

use vote_ledger_shared::types::{PowerScaling, VoteRecord, VoteTypeDefinition};

use crate::errors::EngineError;

/// Exclusivity group shared by the four strength-graded kinds and `neutral`.
pub const STRENGTH_GROUP: &str = "strength";

/// Maps vote-kind names to their `VoteTypeDefinition`.
#[derive(Debug, Clone, Default)]
pub struct VoteTypeRegistry {
    definitions: HashMap<String, VoteTypeDefinition>,
}

impl VoteTypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the registry of the default forum voting system.
    ///
    /// All five kinds share one exclusivity group, so a user holds at most one of
    /// them on an item at a time.
    pub fn with_defaults() -> Self {
        Self::new()
            .register(
                VoteTypeDefinition::new("smallUpvote", 1)
                    .in_group(STRENGTH_GROUP)
                    .with_scaling(PowerScaling::Small),
            )
            .register(
                VoteTypeDefinition::new("smallDownvote", -1)
                    .in_group(STRENGTH_GROUP)
                    .with_scaling(PowerScaling::Small),
            )
            .register(
                VoteTypeDefinition::new("bigUpvote", 1)
                    .in_group(STRENGTH_GROUP)
                    .with_scaling(PowerScaling::Strong),
            )
            .register(
                VoteTypeDefinition::new("bigDownvote", -1)
                    .in_group(STRENGTH_GROUP)
                    .with_scaling(PowerScaling::Strong),
            )
            .register(VoteTypeDefinition::new("neutral", 0).in_group(STRENGTH_GROUP))
    }

    /// Adds or replaces a definition. Meant to be chained before the registry is shared.
    pub fn register(mut self, definition: VoteTypeDefinition) -> Self {
        self.definitions.insert(definition.name.clone(), definition);
        self
    }

    /// Looks up a vote kind.
    ///
    /// # Arguments
    ///
    /// * `kind` - The vote kind name
    ///
    /// # Returns
    ///
    /// * `Ok(&VoteTypeDefinition)` - The registered definition
    /// * `Err(EngineError::UnknownVoteKind)` - No such kind
    pub fn lookup(&self, kind: &str) -> Result<&VoteTypeDefinition, EngineError> {
        self.definitions
            .get(kind)
            .ok_or_else(|| EngineError::UnknownVoteKind(kind.to_string()))
    }

    pub fn get(&self, kind: &str) -> Option<&VoteTypeDefinition> {
        self.definitions.get(kind)
    }

    /// Returns every registered kind name, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Returns the definitions belonging to an exclusivity group, sorted by name.
    pub fn in_group(&self, group: &str) -> Vec<&VoteTypeDefinition> {
        let mut members: Vec<&VoteTypeDefinition> = self
            .definitions
            .values()
            .filter(|d| d.exclusivity_group.as_deref() == Some(group))
            .collect();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        members
    }

    /// Returns whether a user may not hold live votes of both kinds on one item.
    pub fn conflicts(&self, a: &str, b: &str) -> Result<bool, EngineError> {
        Ok(self.lookup(a)?.conflicts_with(self.lookup(b)?))
    }

    /// Returns whether two ledger records belong to the same exclusivity slot.
    ///
    /// Records of kinds that are no longer registered only conflict with their own kind.
    pub fn records_conflict(&self, a: &VoteRecord, b: &VoteRecord) -> bool {
        if a.kind == b.kind {
            return true;
        }
        match (self.get(&a.kind), self.get(&b.kind)) {
            (Some(a), Some(b)) => a.conflicts_with(b),
            _ => false,
        }
    }
}
