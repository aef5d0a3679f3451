use async_trait::async_trait;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::PathBuf;

use crate::core::{CandidateRecord, IssueSet, StanceVector};
use crate::error::{MatchError, Result};
use crate::profiles::ProfileSource;

/// Candidate profiles from a flat CSV file.
///
/// Expected header: `name,party,policy,<one column per issue key>`.
/// Column order is free and extra columns are ignored.
pub struct CsvProfileSource {
    path: PathBuf,
    limit: Option<usize>,
}

impl CsvProfileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            limit: None,
        }
    }

    /// Keep only the first `limit` rows
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[async_trait]
impl ProfileSource for CsvProfileSource {
    async fn load(&self, issues: &IssueSet) -> Result<Vec<CandidateRecord>> {
        let bytes = tokio::fs::read(&self.path).await?;
        let candidates = parse_profiles(bytes.as_slice(), issues, self.limit)?;

        tracing::info!(
            "Loaded {} candidates from {}",
            candidates.len(),
            self.path.display()
        );

        Ok(candidates)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Column positions resolved from the header row
struct Columns {
    name: usize,
    party: usize,
    policy: usize,
    issues: Vec<(String, usize)>,
}

impl Columns {
    fn from_headers(headers: &StringRecord, issues: &IssueSet) -> Result<Self> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| MatchError::Profile {
                    line: 1,
                    message: format!("missing column '{}'", column),
                })
        };

        Ok(Self {
            name: find("name")?,
            party: find("party")?,
            policy: find("policy")?,
            issues: issues
                .keys()
                .map(|key| find(key).map(|idx| (key.to_string(), idx)))
                .collect::<Result<_>>()?,
        })
    }
}

/// Parse CSV profile rows
pub fn parse_profiles<R: Read>(
    reader: R,
    issues: &IssueSet,
    limit: Option<usize>,
) -> Result<Vec<CandidateRecord>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let columns = Columns::from_headers(reader.headers()?, issues)?;

    let mut candidates = Vec::new();
    for record in reader.records() {
        if limit.is_some_and(|limit| candidates.len() >= limit) {
            break;
        }

        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let name = field(columns.name);
        if name.is_empty() {
            return Err(MatchError::Profile {
                line,
                message: "empty name".to_string(),
            });
        }

        let mut stance = StanceVector::new();
        for (key, idx) in &columns.issues {
            let cell = field(*idx);
            let value = cell.parse::<f64>().map_err(|_| MatchError::Profile {
                line,
                message: format!("'{}' is not a number for '{}'", cell, key),
            })?;
            stance.insert(key.as_str(), value).map_err(|e| MatchError::Profile {
                line,
                message: e.to_string(),
            })?;
        }

        candidates.push(CandidateRecord::new(
            name,
            field(columns.party),
            field(columns.policy),
            stance,
        ));
    }

    Ok(candidates)
}
