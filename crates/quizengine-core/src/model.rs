//! Core data model for a quiz session.
//!
//! Questions and sessions are immutable once received from the generation
//! service. The correct option index is never part of a [`Question`]; it only
//! arrives with the authoritative [`ScoreResult`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque quiz identifier issued by the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionSetId(String);

impl QuestionSetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Requested quiz difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// What the caller asks for when starting a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRequest {
    /// Topic name, e.g. "Science - Biology".
    pub topic: String,
    pub difficulty: Difficulty,
    /// Number of questions to generate.
    pub question_count: u32,
    /// Time limit in minutes; 0 means untimed.
    pub time_limit_minutes: u32,
}

impl QuizRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            difficulty: Difficulty::default(),
            question_count: 10,
            time_limit_minutes: 0,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_question_count(mut self, count: u32) -> Self {
        self.question_count = count;
        self
    }

    pub fn with_time_limit_minutes(mut self, minutes: u32) -> Self {
        self.time_limit_minutes = minutes;
        self
    }
}

/// A single multiple-choice question as shown to the student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The question prompt.
    pub text: String,
    /// Option texts, in display order.
    pub options: Vec<String>,
    /// Zero-based position within the quiz.
    pub position: usize,
}

impl Question {
    /// Text of the option at `index`, if it exists.
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }
}

/// One generated quiz, owned by the session controller for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: QuestionSetId,
    pub topic: String,
    pub difficulty: Difficulty,
    pub questions: Vec<Question>,
    /// 0 means untimed.
    pub time_limit_seconds: u32,
    /// True when the service fell back to built-in sample questions.
    #[serde(default)]
    pub is_sample: bool,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_timed(&self) -> bool {
        self.time_limit_seconds > 0
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

/// Authoritative grading of a submitted answer set.
///
/// The client never recomputes `percentage`; it is displayed as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// 0.0 to 100.0.
    pub percentage: f64,
    pub correct_count: u32,
    pub total_questions: u32,
    /// Correct option index for each question, aligned with `Session::questions`.
    pub per_question_correct_index: Vec<usize>,
    pub feedback: String,
    #[serde(default)]
    pub weak_topics: BTreeSet<String>,
    #[serde(default)]
    pub recommended_review: Vec<String>,
}

/// A question the student answered incorrectly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub question: Question,
    pub correct_index: usize,
    /// Always `Some` for entries produced by [`derive_review`](crate::review::derive_review).
    pub user_answer: Option<usize>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub suggested_next_steps: Vec<String>,
}

impl ReviewEntry {
    pub fn position(&self) -> usize {
        self.question.position
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.question.option(self.correct_index)
    }

    pub fn user_option(&self) -> Option<&str> {
        self.user_answer.and_then(|i| self.question.option(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_display_and_parse() {
        assert_eq!(Difficulty::Hard.to_string(), "hard");
        assert_eq!("Easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!(" medium ".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn difficulty_serializes_lowercase() {
        let json = serde_json::to_string(&Difficulty::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }

    #[test]
    fn quiz_request_builder() {
        let req = QuizRequest::new("History")
            .with_difficulty(Difficulty::Hard)
            .with_question_count(5)
            .with_time_limit_minutes(2);
        assert_eq!(req.topic, "History");
        assert_eq!(req.difficulty, Difficulty::Hard);
        assert_eq!(req.question_count, 5);
        assert_eq!(req.time_limit_minutes, 2);
    }

    #[test]
    fn review_entry_option_texts() {
        let entry = ReviewEntry {
            question: Question {
                text: "2 + 2?".into(),
                options: vec!["3".into(), "4".into(), "5".into()],
                position: 4,
            },
            correct_index: 1,
            user_answer: Some(2),
            explanation: None,
            suggested_next_steps: vec![],
        };
        assert_eq!(entry.position(), 4);
        assert_eq!(entry.correct_option(), Some("4"));
        assert_eq!(entry.user_option(), Some("5"));
    }
}
