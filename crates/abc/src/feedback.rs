//! Non-fatal parser feedback.
//!
//! Note extraction never fails. Anything it has to guess at or throw away is
//! reported here instead, tagged with the line and column it came from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single observation made while reading a tune.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub level: FeedbackLevel,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl Feedback {
    pub fn warning(message: impl Into<String>, line: usize, column: usize) -> Self {
        Feedback {
            level: FeedbackLevel::Warning,
            message: message.into(),
            line,
            column,
        }
    }

    pub fn info(message: impl Into<String>, line: usize, column: usize) -> Self {
        Feedback {
            level: FeedbackLevel::Info,
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            FeedbackLevel::Warning => "warning",
            FeedbackLevel::Info => "info",
        };
        write!(f, "{}:{}: {}: {}", self.line, self.column, level, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackLevel {
    /// Read with an assumption the author may not have intended
    Warning,
    /// A construct was skipped
    Info,
}

/// Collects feedback while walking a tune line by line.
#[derive(Debug)]
pub struct FeedbackCollector {
    feedback: Vec<Feedback>,
    current_line: usize,
    current_column: usize,
}

impl Default for FeedbackCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackCollector {
    pub fn new() -> Self {
        FeedbackCollector {
            feedback: Vec::new(),
            current_line: 1,
            current_column: 1,
        }
    }

    /// Update position tracking (1-based line and column)
    pub fn set_position(&mut self, line: usize, column: usize) {
        self.current_line = line;
        self.current_column = column;
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.feedback.push(Feedback::warning(
            message,
            self.current_line,
            self.current_column,
        ));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.feedback
            .push(Feedback::info(message, self.current_line, self.current_column));
    }

    pub fn into_feedback(self) -> Vec<Feedback> {
        self.feedback
    }
}

/// A value plus everything noticed while producing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult<T> {
    pub value: T,
    pub feedback: Vec<Feedback>,
}

impl<T> ParseResult<T> {
    pub fn new(value: T, feedback: Vec<Feedback>) -> Self {
        ParseResult { value, feedback }
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Feedback> {
        self.feedback
            .iter()
            .filter(|f| f.level == FeedbackLevel::Warning)
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_tracks_position() {
        let mut collector = FeedbackCollector::new();

        collector.info("Skipped grace notes");
        collector.set_position(5, 10);
        collector.warning("Unrecognized key 'HP'");

        let feedback = collector.into_feedback();
        assert_eq!(feedback.len(), 2);
        assert_eq!(feedback[0].line, 1);
        assert_eq!(feedback[0].level, FeedbackLevel::Info);
        assert_eq!(feedback[1].line, 5);
        assert_eq!(feedback[1].column, 10);
    }

    #[test]
    fn test_warnings_filter() {
        let result = ParseResult::new(
            (),
            vec![
                Feedback::info("skipped", 1, 1),
                Feedback::warning("no key", 2, 1),
            ],
        );

        assert_eq!(result.warnings().count(), 1);
    }

    #[test]
    fn test_display() {
        let fb = Feedback::warning("Unrecognized key 'HP'", 3, 1);
        assert_eq!(fb.to_string(), "3:1: warning: Unrecognized key 'HP'");
    }
}
