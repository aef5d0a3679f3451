use thiserror::Error;

/// Main error type for the match engine
#[derive(Error, Debug)]
pub enum MatchError {
    /// Stance vector is missing one or more issue keys
    #[error("Stance is incomplete, missing: {}", missing.join(", "))]
    IncompleteStance { missing: Vec<String> },

    /// Issue key not present in the issue set
    #[error("Unknown issue: {0}")]
    UnknownIssue(String),

    /// Stance value outside [-1.0, 1.0] or not finite
    #[error("Invalid stance value for '{issue}': {value}")]
    InvalidStanceValue { issue: String, value: f64 },

    /// Issue declared with a blank key
    #[error("Invalid issue key: '{0}'")]
    InvalidIssue(String),

    /// Issue set declared the same key twice
    #[error("Duplicate issue key: {0}")]
    DuplicateIssue(String),

    /// Nothing to rank against
    #[error("No candidates loaded")]
    NoCandidates,

    /// Malformed profile row
    #[error("Profile error at line {line}: {message}")]
    Profile { line: u64, message: String },

    /// CSV errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// HTTP request errors
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Chat-completion API errors
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// Model reply did not match the expected schema
    #[error("Malformed LLM reply: {0}")]
    MalformedReply(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl MatchError {
    /// True for errors caused by caller input rather than the environment
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MatchError::IncompleteStance { .. }
                | MatchError::UnknownIssue(_)
                | MatchError::InvalidStanceValue { .. }
        )
    }
}

impl From<String> for MatchError {
    fn from(s: String) -> Self {
        MatchError::Other(s)
    }
}

impl From<&str> for MatchError {
    fn from(s: &str) -> Self {
        MatchError::Other(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, MatchError>;
