//! Mock quiz service for testing.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use quizengine_core::error::ServiceError;
use quizengine_core::model::QuestionSetId;
use quizengine_core::traits::{
    GenerateRequest, GeneratedQuiz, QuestionDraft, QuestionOutcome, QuizGenerator, QuizScorer,
    ScoreRequest, ScoreResponse,
};

/// Failure injected for the next `remaining` calls.
struct ScriptedFailure {
    remaining: u32,
    error: ServiceError,
}

/// A scriptable quiz service for exercising the session controller without
/// a backend.
///
/// By default it generates `question_count` four-option questions and grades
/// them against an answer key (all zeros unless configured).
pub struct MockQuizService {
    /// Fixed quiz to return instead of a generated one.
    quiz: Option<GeneratedQuiz>,
    /// Fixed score response to return instead of grading.
    score_response: Option<ScoreResponse>,
    /// Correct index per position, cycled when shorter than the quiz.
    answer_key: Vec<usize>,
    latency: Duration,
    generation_failure: Mutex<Option<ScriptedFailure>>,
    scoring_failure: Mutex<Option<ScriptedFailure>>,
    generate_calls: AtomicU32,
    score_calls: AtomicU32,
    last_generate_request: Mutex<Option<GenerateRequest>>,
    last_score_request: Mutex<Option<ScoreRequest>>,
}

impl Default for MockQuizService {
    fn default() -> Self {
        Self {
            quiz: None,
            score_response: None,
            answer_key: vec![0],
            latency: Duration::ZERO,
            generation_failure: Mutex::new(None),
            scoring_failure: Mutex::new(None),
            generate_calls: AtomicU32::new(0),
            score_calls: AtomicU32::new(0),
            last_generate_request: Mutex::new(None),
            last_score_request: Mutex::new(None),
        }
    }
}

impl MockQuizService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always return this quiz from `generate`.
    pub fn with_quiz(mut self, quiz: GeneratedQuiz) -> Self {
        self.quiz = Some(quiz);
        self
    }

    /// Always return this response from `score`.
    pub fn with_score_response(mut self, response: ScoreResponse) -> Self {
        self.score_response = Some(response);
        self
    }

    /// Grade against these correct indices.
    pub fn with_answer_key(mut self, key: Vec<usize>) -> Self {
        if !key.is_empty() {
            self.answer_key = key;
        }
        self
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fail the next `count` generation calls with `error`.
    pub fn fail_next_generations(&self, count: u32, error: ServiceError) {
        *lock(&self.generation_failure) = Some(ScriptedFailure {
            remaining: count,
            error,
        });
    }

    /// Fail the next `count` scoring calls with `error`.
    pub fn fail_next_scorings(&self, count: u32, error: ServiceError) {
        *lock(&self.scoring_failure) = Some(ScriptedFailure {
            remaining: count,
            error,
        });
    }

    pub fn generate_calls(&self) -> u32 {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn score_calls(&self) -> u32 {
        self.score_calls.load(Ordering::SeqCst)
    }

    pub fn last_generate_request(&self) -> Option<GenerateRequest> {
        lock(&self.last_generate_request).clone()
    }

    pub fn last_score_request(&self) -> Option<ScoreRequest> {
        lock(&self.last_score_request).clone()
    }

    fn correct_index(&self, position: usize) -> usize {
        self.answer_key[position % self.answer_key.len()]
    }

    fn grade(&self, request: &ScoreRequest) -> ScoreResponse {
        let answers: Vec<QuestionOutcome> = (0..request.answers.len())
            .map(|position| QuestionOutcome {
                correct_index: self.correct_index(position),
                explanation: Some(format!("Option {} is correct.", self.correct_index(position) + 1)),
                suggested_next_steps: Vec::new(),
            })
            .collect();
        let total = request.answers.len() as u32;
        let correct = request
            .answers
            .iter()
            .zip(&answers)
            .filter(|(answer, outcome)| **answer == Some(outcome.correct_index))
            .count() as u32;
        let percentage = if total == 0 {
            0.0
        } else {
            f64::from(correct) * 100.0 / f64::from(total)
        };

        ScoreResponse {
            percentage,
            correct_count: correct,
            total_questions: total,
            feedback: format!("You answered {correct} of {total} correctly."),
            weak_topics: BTreeSet::new(),
            recommended_review: Vec::new(),
            answers,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Consumes one scripted failure, if any remain.
fn take_failure(slot: &Mutex<Option<ScriptedFailure>>) -> Option<ServiceError> {
    let mut slot = lock(slot);
    let failure = slot.as_mut()?;
    let error = failure.error.clone();
    failure.remaining = failure.remaining.saturating_sub(1);
    if failure.remaining == 0 {
        *slot = None;
    }
    Some(error)
}

#[async_trait]
impl QuizGenerator for MockQuizService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedQuiz, ServiceError> {
        let call = self.generate_calls.fetch_add(1, Ordering::SeqCst) + 1;
        *lock(&self.last_generate_request) = Some(request.clone());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(error) = take_failure(&self.generation_failure) {
            return Err(error);
        }

        if let Some(quiz) = &self.quiz {
            return Ok(quiz.clone());
        }
        Ok(GeneratedQuiz {
            quiz_id: QuestionSetId::new(format!("mock_quiz_{call}")),
            questions: (0..request.question_count)
                .map(|i| QuestionDraft {
                    text: format!("{} question {}", request.topic_name, i + 1),
                    options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                })
                .collect(),
            time_limit_seconds: request.time_limit_minutes * 60,
            is_sample: false,
        })
    }
}

#[async_trait]
impl QuizScorer for MockQuizService {
    async fn score(&self, request: &ScoreRequest) -> Result<ScoreResponse, ServiceError> {
        self.score_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_score_request) = Some(request.clone());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(error) = take_failure(&self.scoring_failure) {
            return Err(error);
        }

        match &self.score_response {
            Some(response) => Ok(response.clone()),
            None => Ok(self.grade(request)),
        }
    }
}
