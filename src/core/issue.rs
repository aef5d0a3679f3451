use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{MatchError, Result};

/// A single political topic the quiz asks about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Stable identifier, also the CSV column name
    pub key: String,

    /// Question shown to the user
    pub prompt: String,
}

impl Issue {
    pub fn new(key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
        }
    }
}

/// Ordered, immutable collection of issues
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IssueSet {
    issues: Vec<Issue>,
}

impl IssueSet {
    /// Build an issue set; keys must be non-empty and unique
    pub fn new(issues: Vec<Issue>) -> Result<Self> {
        let mut seen = HashSet::new();
        for issue in &issues {
            if issue.key.trim().is_empty() {
                return Err(MatchError::InvalidIssue(issue.key.clone()));
            }
            if !seen.insert(issue.key.as_str()) {
                return Err(MatchError::DuplicateIssue(issue.key.clone()));
            }
        }
        Ok(Self { issues })
    }

    /// The seven issues the quiz ships with
    pub fn standard() -> Self {
        let issues = [
            ("tax_raise", "Do you support raising taxes?"),
            ("defense_spend", "Do you support increasing defense spending?"),
            ("same_sex", "Should same-sex marriage be recognized?"),
            ("nuclear_restart", "Do you support restarting nuclear plants?"),
            ("immigration", "Are you in favor of accepting more immigrants?"),
            ("carbon_tax", "Do you support introducing a carbon tax?"),
            ("child_budget", "Should the child-rearing budget be increased substantially?"),
        ]
        .into_iter()
        .map(|(key, prompt)| Issue::new(key, prompt))
        .collect();

        Self { issues }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().map(|i| i.key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&Issue> {
        self.issues.iter().find(|i| i.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl Default for IssueSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Discrete answer used by the button variant of the quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Yes,
    No,
    Undecided,
}

impl Choice {
    pub const ALL: [Choice; 3] = [Choice::Yes, Choice::No, Choice::Undecided];

    /// Stance value this choice encodes
    pub fn value(self) -> f64 {
        match self {
            Choice::Yes => 1.0,
            Choice::No => -1.0,
            Choice::Undecided => 0.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Choice::Yes => "Yes",
            Choice::No => "No",
            Choice::Undecided => "Can't say",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_set() {
        let issues = IssueSet::standard();
        assert_eq!(issues.len(), 7);
        assert_eq!(issues.keys().next(), Some("tax_raise"));
        assert!(issues.contains("child_budget"));
        assert!(!issues.contains("pension"));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let result = IssueSet::new(vec![Issue::new("x", "X?"), Issue::new("x", "Again?")]);
        assert!(matches!(result, Err(MatchError::DuplicateIssue(k)) if k == "x"));
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = IssueSet::new(vec![Issue::new("x", "X?"), Issue::new(" ", "Blank?")]);
        assert!(matches!(result, Err(MatchError::InvalidIssue(k)) if k == " "));
    }

    #[test]
    fn test_choice_values() {
        assert_eq!(Choice::Yes.value(), 1.0);
        assert_eq!(Choice::No.value(), -1.0);
        assert_eq!(Choice::Undecided.value(), 0.0);
    }
}
