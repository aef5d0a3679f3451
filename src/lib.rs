//! # Policy Match
//!
//! Stance quiz engine matching a user's answers against politician profiles:
//! - Fixed issue set, answered one question at a time (buttons or sliders)
//! - Local cosine-similarity ranking with a 0-100 match score
//! - Optional ranking delegated to a chat-completion model
//! - SQLite leaderboard aggregated across sessions
//! - Interfaces: Rust library, interactive CLI, HTTP API
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use policy_match::{
//!     Choice, CsvProfileSource, IssueSet, MatchEngine, MatchQuery,
//!     ranking::CosineRanker,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let source = CsvProfileSource::new("profiles.csv");
//!     let engine = MatchEngine::from_source(
//!         IssueSet::standard(),
//!         &source,
//!         Arc::new(CosineRanker::new()),
//!     )
//!     .await?;
//!
//!     let mut session = engine.session();
//!     while let Some(issue) = session.next_issue().cloned() {
//!         session.answer(&issue.key, Choice::Yes)?;
//!     }
//!
//!     let response = engine.run(&session.stance()?, MatchQuery::default()).await?;
//!     for m in &response.results {
//!         println!("{} - {}%", m.candidate.display_name(), m.score);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod links;
pub mod profiles;
pub mod ranking;
pub mod session;
pub mod tally;

// Re-export primary types
pub use config::Settings;
pub use crate::core::{CandidateRecord, Choice, Issue, IssueSet, MatchResponse, MatchResult, StanceVector};
pub use engine::{MatchEngine, MatchQuery};
pub use error::{MatchError, Result};
pub use profiles::{CsvProfileSource, ProfileSource};
pub use session::QuizSession;
pub use tally::{SqliteTally, TallyStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
