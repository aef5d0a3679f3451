use async_trait::async_trait;

use crate::core::{CandidateRecord, IssueSet, MatchResult, StanceVector};
use crate::error::Result;
use crate::ranking::{RankRequest, Ranker};

/// Cosine similarity of two stances over the issue dimensions.
///
/// Returns 0 when either vector has zero norm. Both vectors must cover
/// every issue; a missing key is an error, never an implicit 0.
pub fn score(user: &StanceVector, candidate: &StanceVector, issues: &IssueSet) -> Result<f64> {
    let a = user.ordered_values(issues)?;
    let b = candidate.ordered_values(issues)?;
    Ok(cosine(&a, &b))
}

fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    let denom = norm_a * norm_b;
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

/// Map a similarity in [-1, 1] to a display score in [0, 100].
///
/// `round((raw + 1) / 2 * 100)`, halves rounded away from zero.
pub fn normalize(raw: f64) -> u8 {
    let raw = raw.clamp(-1.0, 1.0);
    ((raw + 1.0) / 2.0 * 100.0).round() as u8
}

/// Score every candidate and keep the best `top_n`.
///
/// Equal scores keep their input order.
pub fn rank(
    user: &StanceVector,
    candidates: &[CandidateRecord],
    issues: &IssueSet,
    top_n: usize,
) -> Result<Vec<MatchResult>> {
    let mut ranked = candidates
        .iter()
        .map(|candidate| {
            let raw = score(user, &candidate.stance, issues)?;
            Ok(MatchResult::new(candidate.clone(), normalize(raw)).with_raw(raw))
        })
        .collect::<Result<Vec<_>>>()?;

    // sort_by is stable
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(top_n);

    Ok(ranked)
}

/// Local ranker computing cosine similarity in-process
pub struct CosineRanker;

impl CosineRanker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CosineRanker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ranker for CosineRanker {
    async fn rank(&self, request: RankRequest<'_>) -> Result<Vec<MatchResult>> {
        rank(request.user, request.candidates, request.issues, request.top_n)
    }

    fn name(&self) -> &str {
        "cosine"
    }
}
