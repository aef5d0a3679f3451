pub mod csv_file;

use async_trait::async_trait;

use crate::core::{CandidateRecord, IssueSet};
use crate::error::Result;

pub use csv_file::CsvProfileSource;

/// Trait for candidate profile sources
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Load every candidate, each carrying a value for every issue
    async fn load(&self, issues: &IssueSet) -> Result<Vec<CandidateRecord>>;

    /// Get source name
    fn name(&self) -> &str;
}

/// Fixed list of candidates held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileSource {
    candidates: Vec<CandidateRecord>,
}

impl InMemoryProfileSource {
    pub fn new(candidates: Vec<CandidateRecord>) -> Self {
        Self { candidates }
    }
}

#[async_trait]
impl ProfileSource for InMemoryProfileSource {
    async fn load(&self, issues: &IssueSet) -> Result<Vec<CandidateRecord>> {
        for candidate in &self.candidates {
            candidate.stance.validate(issues)?;
        }
        Ok(self.candidates.clone())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StanceVector;
    use crate::error::MatchError;

    #[tokio::test]
    async fn test_in_memory_validates() {
        let issues = IssueSet::standard();
        let source = InMemoryProfileSource::new(vec![CandidateRecord::new(
            "Half Done",
            "",
            "",
            StanceVector::from_pairs([("tax_raise", 1.0)]).unwrap(),
        )]);

        let result = source.load(&issues).await;
        assert!(matches!(result, Err(MatchError::IncompleteStance { .. })));
    }
}
