use serde::{Deserialize, Serialize};

use crate::core::CandidateRecord;

/// One ranked candidate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    /// The matched candidate
    pub candidate: CandidateRecord,

    /// Match score (0 - 100)
    pub score: u8,

    /// Ranker's unnormalized value (cosine in [-1, 1], model score in [0, 1])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<f64>,

    /// Free-text rationale, when the ranker provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl MatchResult {
    pub fn new(candidate: CandidateRecord, score: u8) -> Self {
        Self {
            candidate,
            score,
            raw: None,
            reason: None,
        }
    }

    pub fn with_raw(mut self, raw: f64) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Get display string for logging
    pub fn display(&self) -> String {
        format!("{} - {}%", self.candidate.display_name(), self.score)
    }
}

/// Ordered Top-N list with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    /// Results, best first
    pub results: Vec<MatchResult>,

    /// Ranking method used (cosine, llm)
    pub ranking_method: String,

    /// How many candidates were compared
    pub candidates_considered: usize,

    /// Ranking latency in milliseconds
    pub latency_ms: f64,
}

impl MatchResponse {
    /// Highest-scoring result, if any
    pub fn best(&self) -> Option<&MatchResult> {
        self.results.first()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Get display string for logging
    pub fn display(&self) -> String {
        match self.best() {
            Some(best) => format!(
                "{} [{}] {}/{} in {:.2}ms",
                best.display(),
                self.ranking_method,
                self.results.len(),
                self.candidates_considered,
                self.latency_ms
            ),
            None => format!("no matches [{}]", self.ranking_method),
        }
    }
}
