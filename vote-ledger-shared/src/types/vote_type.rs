use serde::{Deserialize, Serialize};

/// How a vote kind's power reacts to the voter's karma.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PowerScaling {
    /// Power is always the base power.
    Fixed,
    /// Normal-strength vote; scales slowly with karma.
    Small,
    /// Strong vote; scales with the full karma table.
    Strong,
}

/// Describes one kind of vote a user can cast.
///
/// Kinds sharing an `exclusivity_group` are mutually exclusive: a user holds at most
/// one live vote per group on a given item. A kind without a group only excludes itself.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteTypeDefinition {
    pub name: String,
    pub base_power: i64,
    pub exclusivity_group: Option<String>,
    pub scaling: PowerScaling,
}

impl VoteTypeDefinition {
    pub fn new(name: impl Into<String>, base_power: i64) -> Self {
        Self {
            name: name.into(),
            base_power,
            exclusivity_group: None,
            scaling: PowerScaling::Fixed,
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.exclusivity_group = Some(group.into());
        self
    }

    pub fn with_scaling(mut self, scaling: PowerScaling) -> Self {
        self.scaling = scaling;
        self
    }

    /// Whether a live vote of `self` and one of `other` may not coexist.
    pub fn conflicts_with(&self, other: &VoteTypeDefinition) -> bool {
        if self.name == other.name {
            return true;
        }
        match (&self.exclusivity_group, &other.exclusivity_group) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn is_strong(&self) -> bool {
        self.scaling == PowerScaling::Strong
    }

    pub fn is_down(&self) -> bool {
        self.base_power < 0
    }
}
