//! Collaborator contracts consumed by the session controller.
//!
//! Quiz generation and scoring live outside this crate. `quizengine-client`
//! provides HTTP, offline, and mock implementations of both traits.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::model::{Difficulty, Question, QuestionSetId, ScoreResult};

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Produces a question set for a topic.
#[async_trait]
pub trait QuizGenerator: Send + Sync {
    /// Human-readable backend name (e.g. "http").
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedQuiz, ServiceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub topic_name: String,
    pub difficulty: Difficulty,
    pub question_count: u32,
    pub time_limit_minutes: u32,
}

/// A question as delivered by the generation service, before positions are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub text: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQuiz {
    pub quiz_id: QuestionSetId,
    pub questions: Vec<QuestionDraft>,
    /// 0 means untimed.
    pub time_limit_seconds: u32,
    #[serde(default)]
    pub is_sample: bool,
}

impl GeneratedQuiz {
    /// Checks the response and assigns question positions.
    ///
    /// A quiz with no questions, or a question offering fewer than two
    /// options, cannot be played and is reported as malformed.
    pub fn into_questions(self) -> Result<(QuestionSetId, Vec<Question>, u32, bool), ServiceError> {
        if self.questions.is_empty() {
            return Err(ServiceError::MalformedResponse(
                "quiz contains no questions".into(),
            ));
        }
        let mut questions = Vec::with_capacity(self.questions.len());
        for (position, draft) in self.questions.into_iter().enumerate() {
            if draft.options.len() < 2 {
                return Err(ServiceError::MalformedResponse(format!(
                    "question {} has {} option(s)",
                    position + 1,
                    draft.options.len()
                )));
            }
            questions.push(Question {
                text: draft.text,
                options: draft.options,
                position,
            });
        }
        Ok((
            self.quiz_id,
            questions,
            self.time_limit_seconds,
            self.is_sample,
        ))
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Grades a submitted answer set.
#[async_trait]
pub trait QuizScorer: Send + Sync {
    async fn score(&self, request: &ScoreRequest) -> Result<ScoreResponse, ServiceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub quiz_id: QuestionSetId,
    /// Selected option per question; `None` for unanswered.
    pub answers: Vec<Option<usize>>,
    pub time_spent_seconds: u32,
    /// Echoed for stateless scoring backends; empty when echoing is disabled.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Per-question grading detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub suggested_next_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub percentage: f64,
    pub correct_count: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub weak_topics: BTreeSet<String>,
    #[serde(default)]
    pub recommended_review: Vec<String>,
    /// Aligned with the question list.
    pub answers: Vec<QuestionOutcome>,
}

impl ScoreResponse {
    /// Checks the response against the graded questions and splits it into the
    /// authoritative [`ScoreResult`] and the per-question outcomes.
    pub fn into_result(
        self,
        questions: &[Question],
    ) -> Result<(ScoreResult, Vec<QuestionOutcome>), ServiceError> {
        if self.answers.len() != questions.len() {
            return Err(ServiceError::MalformedResponse(format!(
                "expected {} graded answers, got {}",
                questions.len(),
                self.answers.len()
            )));
        }
        if !(0.0..=100.0).contains(&self.percentage) {
            return Err(ServiceError::MalformedResponse(format!(
                "percentage {} is outside 0..=100",
                self.percentage
            )));
        }
        for (question, outcome) in questions.iter().zip(&self.answers) {
            if outcome.correct_index >= question.options.len() {
                return Err(ServiceError::MalformedResponse(format!(
                    "correct index {} is out of range for question {}",
                    outcome.correct_index,
                    question.position + 1
                )));
            }
        }

        let result = ScoreResult {
            percentage: self.percentage,
            correct_count: self.correct_count,
            total_questions: self.total_questions,
            per_question_correct_index: self.answers.iter().map(|a| a.correct_index).collect(),
            feedback: self.feedback,
            weak_topics: self.weak_topics,
            recommended_review: self.recommended_review,
        };
        Ok((result, self.answers))
    }
}
