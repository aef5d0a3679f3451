pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::core::MatchResult;
use crate::error::Result;

pub use sqlite::SqliteTally;

/// Trait for cross-session leaderboard stores
#[async_trait]
pub trait TallyStore: Send + Sync {
    /// Add points for one finished Top-N list
    async fn award(&self, results: &[MatchResult]) -> Result<()>;

    /// Highest totals first, ties by name
    async fn leaderboard(&self, limit: usize) -> Result<Vec<TallyEntry>>;

    /// Points for one name (0 when never awarded)
    async fn points(&self, name: &str) -> Result<u64>;

    /// Drop every entry, returning how many were removed
    async fn reset(&self) -> Result<u64>;

    /// Get tally statistics
    async fn stats(&self) -> Result<TallyStats>;
}

/// Accumulated points for one candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TallyEntry {
    pub name: String,
    pub points: u64,
    pub updated_at: DateTime<Utc>,
}

/// Tally statistics
#[derive(Debug, Clone, Serialize)]
pub struct TallyStats {
    pub total_names: u64,
    pub total_points: u64,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Points per position: in a list of N, 1st earns N, last earns 1
pub fn points_for(results: &[MatchResult]) -> Vec<(&str, u64)> {
    let n = results.len() as u64;
    results
        .iter()
        .enumerate()
        .map(|(i, r)| (r.candidate.name.as_str(), n - i as u64))
        .collect()
}

/// Write entries as `name,points` CSV
pub fn write_csv<W: Write>(entries: &[TallyEntry], writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["name", "points"])?;
    for entry in entries {
        let points = entry.points.to_string();
        out.write_record([entry.name.as_str(), points.as_str()])?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CandidateRecord, StanceVector};

    fn result(name: &str, score: u8) -> MatchResult {
        MatchResult::new(CandidateRecord::new(name, "", "", StanceVector::new()), score)
    }

    #[test]
    fn test_points_by_position() {
        let results = vec![result("A", 90), result("B", 80), result("C", 70)];
        assert_eq!(points_for(&results), vec![("A", 3u64), ("B", 2), ("C", 1)]);
        assert!(points_for(&[]).is_empty());
    }

    #[test]
    fn test_write_csv() {
        let entries = vec![
            TallyEntry {
                name: "Sato, Jr.".to_string(),
                points: 12,
                updated_at: Utc::now(),
            },
            TallyEntry {
                name: "Ito".to_string(),
                points: 3,
                updated_at: Utc::now(),
            },
        ];

        let mut out = Vec::new();
        write_csv(&entries, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "name,points\n\"Sato, Jr.\",12\nIto,3\n");
    }
}
