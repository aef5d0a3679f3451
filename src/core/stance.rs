use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::IssueSet;
use crate::error::{MatchError, Result};

/// Position of a user or candidate across the issue set.
///
/// Values live in [-1.0, 1.0]: -1 is strong opposition, +1 strong support,
/// 0 neutral. A vector is only comparable once it covers every issue,
/// which [`StanceVector::validate`] checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StanceVector {
    values: BTreeMap<String, f64>,
}

impl StanceVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(key, value)` pairs, checking every value
    pub fn from_pairs<K, I>(pairs: I) -> Result<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut vector = Self::new();
        for (key, value) in pairs {
            vector.insert(key, value)?;
        }
        Ok(vector)
    }

    /// Set one issue, overwriting any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: f64) -> Result<()> {
        let key = key.into();
        check_value(&key, value)?;
        self.values.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Issue keys with no value yet, in issue-set order
    pub fn missing(&self, issues: &IssueSet) -> Vec<String> {
        issues
            .keys()
            .filter(|k| !self.values.contains_key(*k))
            .map(str::to_string)
            .collect()
    }

    pub fn is_complete(&self, issues: &IssueSet) -> bool {
        issues.keys().all(|k| self.values.contains_key(k))
    }

    /// Check the vector is fit for comparison against `issues`
    pub fn validate(&self, issues: &IssueSet) -> Result<()> {
        if let Some(unknown) = self.values.keys().find(|k| !issues.contains(k)) {
            return Err(MatchError::UnknownIssue(unknown.clone()));
        }
        for (key, value) in &self.values {
            check_value(key, *value)?;
        }
        let missing = self.missing(issues);
        if !missing.is_empty() {
            return Err(MatchError::IncompleteStance { missing });
        }
        Ok(())
    }

    /// Values in issue-set order; fails instead of defaulting missing keys
    pub fn ordered_values(&self, issues: &IssueSet) -> Result<Vec<f64>> {
        let missing = self.missing(issues);
        if !missing.is_empty() {
            return Err(MatchError::IncompleteStance { missing });
        }
        Ok(issues.keys().map(|k| self.values[k]).collect())
    }

    /// Diametrically opposed stance
    pub fn negated(&self) -> Self {
        Self {
            values: self.values.iter().map(|(k, v)| (k.clone(), -v)).collect(),
        }
    }
}

fn check_value(key: &str, value: f64) -> Result<()> {
    if value.is_finite() && (-1.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(MatchError::InvalidStanceValue {
            issue: key.to_string(),
            value,
        })
    }
}
