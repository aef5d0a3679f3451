use serde::{Deserialize, Serialize};

use crate::core::StanceVector;

/// Static politician profile used as a comparison target
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateRecord {
    /// Politician name
    pub name: String,

    /// Party / affiliation label
    #[serde(default)]
    pub party: String,

    /// Free-text policy statement
    #[serde(default)]
    pub policy: String,

    /// Position on every issue
    pub stance: StanceVector,
}

impl CandidateRecord {
    /// Create a new record with required fields
    pub fn new(
        name: impl Into<String>,
        party: impl Into<String>,
        policy: impl Into<String>,
        stance: StanceVector,
    ) -> Self {
        Self {
            name: name.into(),
            party: party.into(),
            policy: policy.into(),
            stance,
        }
    }

    /// "Name (Party)", or just the name when no party is known
    pub fn display_name(&self) -> String {
        if self.party.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.party)
        }
    }

    /// First `max_chars` characters of the policy text followed by an ellipsis
    pub fn policy_excerpt(&self, max_chars: usize) -> String {
        let head: String = self.policy.chars().take(max_chars).collect();
        format!("{}…", head)
    }
}
