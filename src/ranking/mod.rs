pub mod cosine;
pub mod llm;

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::core::{CandidateRecord, IssueSet, MatchResult, StanceVector};
use crate::error::Result;

pub use cosine::{normalize, rank, score, CosineRanker};
pub use llm::LlmRanker;

/// Number of results shown when the caller does not ask for a count
pub const DEFAULT_TOP_N: usize = 5;

/// Everything a ranker needs for one request
#[derive(Debug, Clone, Copy)]
pub struct RankRequest<'a> {
    pub user: &'a StanceVector,
    pub issues: &'a IssueSet,
    pub candidates: &'a [CandidateRecord],
    pub top_n: usize,
    /// Free-text remarks per issue key (slider variant)
    pub comments: &'a BTreeMap<String, String>,
}

/// Trait for ranking implementations
#[async_trait]
pub trait Ranker: Send + Sync {
    /// Rank candidates against the user's stance, sorted by score (highest first)
    async fn rank(&self, request: RankRequest<'_>) -> Result<Vec<MatchResult>>;

    /// Get ranker name for logging
    fn name(&self) -> &str;

    /// Most candidates one request compares; `None` means all of them
    fn candidate_limit(&self) -> Option<usize> {
        None
    }
}
