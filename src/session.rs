use std::collections::BTreeMap;

use crate::core::{Choice, Issue, IssueSet, StanceVector};
use crate::error::{MatchError, Result};

/// In-progress quiz state, one issue answered per interaction.
///
/// The question phase ends once [`QuizSession::is_complete`] holds;
/// [`QuizSession::stance`] is the gate into the ranking phase.
#[derive(Debug, Clone)]
pub struct QuizSession {
    issues: IssueSet,
    answers: StanceVector,
    comments: BTreeMap<String, String>,
}

impl QuizSession {
    pub fn new(issues: IssueSet) -> Self {
        Self {
            issues,
            answers: StanceVector::new(),
            comments: BTreeMap::new(),
        }
    }

    pub fn issues(&self) -> &IssueSet {
        &self.issues
    }

    /// First unanswered issue in set order
    pub fn next_issue(&self) -> Option<&Issue> {
        self.issues
            .iter()
            .find(|issue| self.answers.get(&issue.key).is_none())
    }

    pub fn answered(&self) -> usize {
        self.answers.len()
    }

    /// 1-based number of the question currently being asked
    pub fn question_number(&self) -> usize {
        self.answered() + 1
    }

    /// Record a button answer
    pub fn answer(&mut self, key: &str, choice: Choice) -> Result<()> {
        self.answer_value(key, choice.value())
    }

    /// Record a slider answer in [-1.0, 1.0]
    pub fn answer_value(&mut self, key: &str, value: f64) -> Result<()> {
        self.check_key(key)?;
        self.answers.insert(key, value)
    }

    /// Attach free text to an issue; blank text removes it
    pub fn set_comment(&mut self, key: &str, text: impl Into<String>) -> Result<()> {
        self.check_key(key)?;
        let text = text.into();
        if text.trim().is_empty() {
            self.comments.remove(key);
        } else {
            self.comments.insert(key.to_string(), text.trim().to_string());
        }
        Ok(())
    }

    pub fn comments(&self) -> &BTreeMap<String, String> {
        &self.comments
    }

    pub fn is_complete(&self) -> bool {
        self.answers.is_complete(&self.issues)
    }

    /// The finished stance, or the keys still missing
    pub fn stance(&self) -> Result<StanceVector> {
        self.answers.validate(&self.issues)?;
        Ok(self.answers.clone())
    }

    /// Start over
    pub fn reset(&mut self) {
        self.answers.clear();
        self.comments.clear();
    }

    fn check_key(&self, key: &str) -> Result<()> {
        if self.issues.contains(key) {
            Ok(())
        } else {
            Err(MatchError::UnknownIssue(key.to_string()))
        }
    }
}
