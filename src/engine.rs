use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::core::{CandidateRecord, IssueSet, MatchResponse, StanceVector};
use crate::error::{MatchError, Result};
use crate::profiles::ProfileSource;
use crate::ranking::{RankRequest, Ranker, DEFAULT_TOP_N};
use crate::session::QuizSession;
use crate::tally::{TallyEntry, TallyStore};

/// Main matching orchestrator
pub struct MatchEngine {
    issues: IssueSet,
    candidates: Vec<CandidateRecord>,
    ranker: Arc<dyn Ranker>,
    tally: Option<Arc<dyn TallyStore>>,
}

/// Match request parameters
#[derive(Debug, Clone)]
pub struct MatchQuery {
    pub top_n: usize,
    pub record_tally: bool,
    /// Free-text remarks per issue, forwarded to rankers that read them
    pub comments: BTreeMap<String, String>,
}

impl Default for MatchQuery {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            record_tally: true,
            comments: BTreeMap::new(),
        }
    }
}

impl MatchQuery {
    /// Query carrying a finished session's remarks
    pub fn from_session(session: &QuizSession) -> Self {
        Self {
            comments: session.comments().clone(),
            ..Self::default()
        }
    }
}

impl MatchEngine {
    /// Create engine over an already-loaded candidate list
    pub fn new(issues: IssueSet, candidates: Vec<CandidateRecord>, ranker: Arc<dyn Ranker>) -> Self {
        tracing::info!(
            "Match engine ready: {} candidates, {} issues, ranker={}",
            candidates.len(),
            issues.len(),
            ranker.name()
        );

        Self {
            issues,
            candidates,
            ranker,
            tally: None,
        }
    }

    /// Create engine loading candidates from a profile source
    pub async fn from_source(
        issues: IssueSet,
        source: &dyn ProfileSource,
        ranker: Arc<dyn Ranker>,
    ) -> Result<Self> {
        let candidates = source.load(&issues).await?;
        tracing::debug!("Source {} returned {} candidates", source.name(), candidates.len());
        Ok(Self::new(issues, candidates, ranker))
    }

    /// Attach a leaderboard store
    pub fn with_tally(mut self, tally: Arc<dyn TallyStore>) -> Self {
        self.tally = Some(tally);
        self
    }

    pub fn issues(&self) -> &IssueSet {
        &self.issues
    }

    pub fn candidates(&self) -> &[CandidateRecord] {
        &self.candidates
    }

    pub fn ranker_name(&self) -> &str {
        self.ranker.name()
    }

    /// Fresh quiz session over this engine's issues
    pub fn session(&self) -> QuizSession {
        QuizSession::new(self.issues.clone())
    }

    /// Rank candidates for a finished stance
    pub async fn run(&self, stance: &StanceVector, query: MatchQuery) -> Result<MatchResponse> {
        let start = Instant::now();

        stance.validate(&self.issues)?;

        if self.candidates.is_empty() {
            return Err(MatchError::NoCandidates);
        }

        let results = self
            .ranker
            .rank(RankRequest {
                user: stance,
                issues: &self.issues,
                candidates: &self.candidates,
                top_n: query.top_n,
                comments: &query.comments,
            })
            .await?;

        if query.record_tally {
            if let Some(tally) = &self.tally {
                if let Err(e) = tally.award(&results).await {
                    tracing::warn!("Failed to record tally: {}", e);
                }
            }
        }

        let considered = match self.ranker.candidate_limit() {
            Some(limit) => limit.min(self.candidates.len()),
            None => self.candidates.len(),
        };

        let response = MatchResponse {
            results,
            ranking_method: self.ranker.name().to_string(),
            candidates_considered: considered,
            latency_ms: start.elapsed().as_secs_f64() * 1000.0,
        };

        tracing::debug!("Match: {}", response.display());
        Ok(response)
    }

    /// Current leaderboard; empty when no tally store is attached
    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<TallyEntry>> {
        match &self.tally {
            Some(tally) => tally.leaderboard(limit).await,
            None => Ok(Vec::new()),
        }
    }
}
