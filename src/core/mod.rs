pub mod candidate;
pub mod issue;
pub mod match_result;
pub mod stance;

pub use candidate::CandidateRecord;
pub use issue::{Choice, Issue, IssueSet};
pub use match_result::{MatchResponse, MatchResult};
pub use stance::StanceVector;
