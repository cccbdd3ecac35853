//! HTTP quiz service speaking the quiz backend's JSON API.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use quizengine_core::error::ServiceError;
use quizengine_core::model::{Difficulty, Question, QuestionSetId};
use quizengine_core::traits::{
    GenerateRequest, GeneratedQuiz, QuestionDraft, QuestionOutcome, QuizGenerator, QuizScorer,
    ScoreRequest, ScoreResponse,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Quiz generation and scoring over HTTP.
pub struct HttpQuizService {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpQuizService {
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Result<Self, ServiceError> {
        let base = if base_url.trim().is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url.trim()
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ServiceError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base.trim_end_matches('/').to_string(),
            timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, R>(&self, endpoint: &str, body: &B) -> Result<R, ServiceError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{endpoint}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Api {
                status,
                message: error_message(&body, status),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;
        debug!(endpoint, bytes = text.len(), "received response");
        serde_json::from_str(&text).map_err(|e| {
            ServiceError::MalformedResponse(format!("failed to parse {endpoint} response: {e}"))
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout(self.timeout_secs)
        } else if err.is_connect() {
            ServiceError::Network(format!(
                "quiz service not reachable at {}: {err}",
                self.base_url
            ))
        } else if err.is_decode() {
            ServiceError::MalformedResponse(err.to_string())
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

/// Backend errors are plain text; fall back to the status when the body is empty.
fn error_message(body: &str, status: u16) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("request failed with status {status}")
    } else {
        trimmed.to_string()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct WireQuizRequest<'a> {
    topic_name: &'a str,
    difficulty: Difficulty,
    num_questions: u32,
    timed_minutes: u32,
}

#[derive(Serialize, Deserialize)]
struct WireQuestion {
    #[serde(default)]
    id: Option<String>,
    question: String,
    #[serde(default)]
    options: Vec<String>,
}

impl From<&Question> for WireQuestion {
    fn from(question: &Question) -> Self {
        Self {
            id: Some(format!("q_{}", question.position + 1)),
            question: question.text.clone(),
            options: question.options.clone(),
        }
    }
}

#[derive(Deserialize)]
struct WireQuizResponse {
    quiz_id: String,
    #[serde(default)]
    questions: Option<Vec<WireQuestion>>,
    /// Seconds; 0 means untimed.
    #[serde(default)]
    time_limit: u32,
    #[serde(default)]
    is_dev_fallback: bool,
}

#[derive(Serialize)]
struct WireSubmission<'a> {
    quiz_id: &'a str,
    answers: &'a [Option<usize>],
    time_spent: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    questions: Vec<WireQuestion>,
}

#[derive(Deserialize)]
struct WireQuizResult {
    percentage: f64,
    correct_count: u32,
    total_questions: u32,
    #[serde(default)]
    feedback: Option<String>,
    #[serde(default)]
    weak_topics: Option<Vec<String>>,
    #[serde(default)]
    recommended_review: Option<Vec<String>>,
    #[serde(default)]
    answers: Option<Vec<WireAnswer>>,
}

#[derive(Deserialize)]
struct WireAnswer {
    correct_answer: usize,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    suggested_next_steps: Option<Vec<String>>,
}

impl From<WireQuizResponse> for GeneratedQuiz {
    fn from(wire: WireQuizResponse) -> Self {
        Self {
            quiz_id: QuestionSetId::new(wire.quiz_id),
            questions: wire
                .questions
                .unwrap_or_default()
                .into_iter()
                .map(|q| QuestionDraft {
                    text: q.question,
                    options: q.options,
                })
                .collect(),
            time_limit_seconds: wire.time_limit,
            is_sample: wire.is_dev_fallback,
        }
    }
}

impl From<WireQuizResult> for ScoreResponse {
    fn from(wire: WireQuizResult) -> Self {
        Self {
            percentage: wire.percentage,
            correct_count: wire.correct_count,
            total_questions: wire.total_questions,
            feedback: wire.feedback.unwrap_or_default(),
            weak_topics: wire.weak_topics.unwrap_or_default().into_iter().collect(),
            recommended_review: wire.recommended_review.unwrap_or_default(),
            answers: wire
                .answers
                .unwrap_or_default()
                .into_iter()
                .map(|a| QuestionOutcome {
                    correct_index: a.correct_answer,
                    explanation: a.explanation.filter(|e| !e.trim().is_empty()),
                    suggested_next_steps: a.suggested_next_steps.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl QuizGenerator for HttpQuizService {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, request), fields(topic = %request.topic_name))]
    async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedQuiz, ServiceError> {
        let body = WireQuizRequest {
            topic_name: &request.topic_name,
            difficulty: request.difficulty,
            num_questions: request.question_count,
            timed_minutes: request.time_limit_minutes,
        };
        let response: WireQuizResponse = self.post_json("generate-quiz", &body).await?;
        Ok(response.into())
    }
}

#[async_trait]
impl QuizScorer for HttpQuizService {
    #[instrument(skip(self, request), fields(quiz_id = %request.quiz_id))]
    async fn score(&self, request: &ScoreRequest) -> Result<ScoreResponse, ServiceError> {
        let body = WireSubmission {
            quiz_id: request.quiz_id.as_str(),
            answers: &request.answers,
            time_spent: request.time_spent_seconds,
            questions: request.questions.iter().map(WireQuestion::from).collect(),
        };
        let response: WireQuizResult = self.post_json("submit-quiz", &body).await?;
        Ok(response.into())
    }
}
