//! Offline quiz service backed by a built-in sample bank.
//!
//! Used for demos and development when no quiz backend is running. Quizzes
//! are generated by cycling a small per-topic bank and are scored against the
//! answer key retained for each issued quiz id.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use quizengine_core::error::ServiceError;
use quizengine_core::model::QuestionSetId;
use quizengine_core::traits::{
    GenerateRequest, GeneratedQuiz, QuestionDraft, QuestionOutcome, QuizGenerator, QuizScorer,
    ScoreRequest, ScoreResponse,
};

/// Score below which the quiz topic is reported as weak.
pub const WEAK_TOPIC_THRESHOLD: f64 = 70.0;

/// Generic study suggestions attached to every missed question.
pub const GENERIC_NEXT_STEPS: [&str; 3] = [
    "Re-read the explanation and underline the key concept.",
    "Find 3 similar practice questions and solve them without looking at answers.",
    "Watch a short (5-10 min) concept video or read a concise article on this topic.",
];

struct SampleQuestion {
    text: &'static str,
    options: [&'static str; 4],
    correct: usize,
    explanation: &'static str,
}

const ALGEBRA: &[SampleQuestion] = &[
    SampleQuestion {
        text: "What is the solution to x + 5 = 12?",
        options: ["x = 7", "x = 17", "x = 6", "x = 2"],
        correct: 0,
        explanation: "Subtract 5 from both sides: x = 12 - 5 = 7",
    },
    SampleQuestion {
        text: "Simplify: 2x + 3x - 5",
        options: ["5x - 5", "6x - 5", "5x", "x - 5"],
        correct: 0,
        explanation: "Combine like terms: 2x + 3x = 5x, then subtract 5.",
    },
    SampleQuestion {
        text: "What is the value of y if 2y - 4 = 10?",
        options: ["y = 7", "y = 14", "y = 3", "y = 6"],
        correct: 0,
        explanation: "Add 4 to both sides: 2y = 14. Divide by 2: y = 7.",
    },
];

const BIOLOGY: &[SampleQuestion] = &[
    SampleQuestion {
        text: "What is the powerhouse of the cell?",
        options: ["Mitochondria", "Nucleus", "Ribosome", "Chloroplast"],
        correct: 0,
        explanation: "Mitochondria is responsible for energy production in cells.",
    },
    SampleQuestion {
        text: "Which organelle is responsible for protein synthesis?",
        options: ["Ribosome", "Golgi apparatus", "Lysosome", "Centrosome"],
        correct: 0,
        explanation: "Ribosomes read mRNA and synthesize proteins.",
    },
    SampleQuestion {
        text: "What is the basic unit of life?",
        options: ["Cell", "Atom", "Molecule", "Organ"],
        correct: 0,
        explanation: "The cell is the smallest unit of living matter.",
    },
];

const HISTORY: &[SampleQuestion] = &[
    SampleQuestion {
        text: "In which year did World War II end?",
        options: ["1945", "1941", "1939", "1944"],
        correct: 0,
        explanation: "World War II ended on September 2, 1945 with Japan's surrender.",
    },
    SampleQuestion {
        text: "Who was the first President of the United States?",
        options: [
            "George Washington",
            "Thomas Jefferson",
            "John Adams",
            "Benjamin Franklin",
        ],
        correct: 0,
        explanation: "George Washington served as the first U.S. President from 1789-1797.",
    },
    SampleQuestion {
        text: "What year did the American Revolution begin?",
        options: ["1776", "1775", "1781", "1783"],
        correct: 1,
        explanation:
            "The American Revolution began in 1775 with armed conflict at Lexington and Concord.",
    },
];

/// Bank for a topic; anything unrecognised gets the algebra bank.
fn bank_for(topic: &str) -> &'static [SampleQuestion] {
    let topic = topic.trim();
    if topic.eq_ignore_ascii_case("Science - Biology") {
        BIOLOGY
    } else if topic.eq_ignore_ascii_case("History") {
        HISTORY
    } else {
        ALGEBRA
    }
}

/// Answer key kept for an issued quiz.
struct IssuedQuiz {
    topic: String,
    questions: Vec<&'static SampleQuestion>,
}

/// Quiz service that never leaves the process.
#[derive(Default)]
pub struct OfflineQuizService {
    issued: Mutex<HashMap<String, IssuedQuiz>>,
}

impl OfflineQuizService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of quizzes generated so far.
    pub fn issued_count(&self) -> usize {
        self.issued().len()
    }

    fn issued(&self) -> MutexGuard<'_, HashMap<String, IssuedQuiz>> {
        self.issued.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn feedback_for(percentage: f64, topic: &str) -> String {
    if percentage >= 90.0 {
        format!("Excellent work! You have a strong grasp of {topic}.")
    } else if percentage >= WEAK_TOPIC_THRESHOLD {
        "Good job! Review the questions you missed to close the remaining gaps.".to_string()
    } else if percentage >= 50.0 {
        "You're getting there. Focus on the explanations for the questions you missed.".to_string()
    } else {
        format!("Keep practicing. Start with the fundamentals of {topic} and try again.")
    }
}

#[async_trait]
impl QuizGenerator for OfflineQuizService {
    fn name(&self) -> &str {
        "offline"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedQuiz, ServiceError> {
        let bank = bank_for(&request.topic_name);
        let questions: Vec<&'static SampleQuestion> = bank
            .iter()
            .cycle()
            .take(request.question_count as usize)
            .collect();

        let quiz_id = format!("quiz_{}", Uuid::new_v4().simple());
        let drafts = questions
            .iter()
            .map(|q| QuestionDraft {
                text: q.text.to_string(),
                options: q.options.iter().map(|o| o.to_string()).collect(),
            })
            .collect();

        info!(
            quiz_id = %quiz_id,
            topic = %request.topic_name,
            questions = questions.len(),
            "issued sample quiz"
        );
        self.issued().insert(
            quiz_id.clone(),
            IssuedQuiz {
                topic: request.topic_name.clone(),
                questions,
            },
        );

        Ok(GeneratedQuiz {
            quiz_id: QuestionSetId::new(quiz_id),
            questions: drafts,
            time_limit_seconds: request.time_limit_minutes.saturating_mul(60),
            is_sample: true,
        })
    }
}

#[async_trait]
impl QuizScorer for OfflineQuizService {
    async fn score(&self, request: &ScoreRequest) -> Result<ScoreResponse, ServiceError> {
        let issued = self.issued();
        let quiz = issued
            .get(request.quiz_id.as_str())
            .ok_or_else(|| ServiceError::Api {
                status: 404,
                message: format!("quiz {} not found", request.quiz_id),
            })?;

        if request.answers.len() != quiz.questions.len() {
            return Err(ServiceError::Api {
                status: 400,
                message: format!(
                    "answer count mismatch: expected {}, got {}",
                    quiz.questions.len(),
                    request.answers.len()
                ),
            });
        }

        let answers: Vec<QuestionOutcome> = quiz
            .questions
            .iter()
            .zip(&request.answers)
            .map(|(question, answer)| QuestionOutcome {
                correct_index: question.correct,
                explanation: Some(question.explanation.to_string()),
                suggested_next_steps: if *answer == Some(question.correct) {
                    Vec::new()
                } else {
                    GENERIC_NEXT_STEPS.iter().map(|s| s.to_string()).collect()
                },
            })
            .collect();

        let total = quiz.questions.len() as u32;
        let correct = answers
            .iter()
            .zip(&request.answers)
            .filter(|(outcome, answer)| **answer == Some(outcome.correct_index))
            .count() as u32;
        let percentage = if total == 0 {
            0.0
        } else {
            f64::from(correct) * 100.0 / f64::from(total)
        };

        let mut weak_topics = BTreeSet::new();
        if percentage < WEAK_TOPIC_THRESHOLD {
            weak_topics.insert(quiz.topic.clone());
        }
        let recommended_review = if correct < total {
            vec![
                format!("Review the key concepts of {}", quiz.topic),
                "Retake the quiz after reading the explanations for missed questions".to_string(),
            ]
        } else {
            Vec::new()
        };

        debug!(
            quiz_id = %request.quiz_id,
            correct,
            total,
            time_spent_seconds = request.time_spent_seconds,
            "scored sample quiz"
        );

        Ok(ScoreResponse {
            percentage,
            correct_count: correct,
            total_questions: total,
            feedback: feedback_for(percentage, &quiz.topic),
            weak_topics,
            recommended_review,
            answers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizengine_core::model::Difficulty;

    fn request(topic: &str, count: u32, minutes: u32) -> GenerateRequest {
        GenerateRequest {
            topic_name: topic.into(),
            difficulty: Difficulty::Medium,
            question_count: count,
            time_limit_minutes: minutes,
        }
    }

    fn submission(quiz: &GeneratedQuiz, answers: Vec<Option<usize>>) -> ScoreRequest {
        ScoreRequest {
            quiz_id: quiz.quiz_id.clone(),
            answers,
            time_spent_seconds: 30,
            questions: vec![],
        }
    }

    #[tokio::test]
    async fn cycles_the_bank_to_the_requested_count() {
        let service = OfflineQuizService::new();
        let quiz = service.generate(&request("History", 5, 2)).await.unwrap();

        assert_eq!(quiz.questions.len(), 5);
        assert_eq!(quiz.questions[3].text, quiz.questions[0].text);
        assert_eq!(quiz.time_limit_seconds, 120);
        assert!(quiz.is_sample);
        assert!(quiz.quiz_id.as_str().starts_with("quiz_"));
    }

    #[tokio::test]
    async fn unknown_topics_use_the_algebra_bank() {
        let service = OfflineQuizService::new();
        let quiz = service
            .generate(&request("Underwater Basket Weaving", 1, 0))
            .await
            .unwrap();
        assert_eq!(quiz.questions[0].text, "What is the solution to x + 5 = 12?");
        assert_eq!(quiz.time_limit_seconds, 0);
    }

    #[tokio::test]
    async fn scores_against_the_retained_key() {
        let service = OfflineQuizService::new();
        let quiz = service.generate(&request("History", 3, 0)).await.unwrap();

        let response = service
            .score(&submission(&quiz, vec![Some(0), Some(0), Some(0)]))
            .await
            .unwrap();

        assert_eq!(response.correct_count, 2);
        assert_eq!(response.total_questions, 3);
        assert!((response.percentage - 200.0 / 3.0).abs() < 1e-9);
        assert!(response.weak_topics.contains("History"));
        assert_eq!(response.answers[2].correct_index, 1);
        assert_eq!(response.answers[2].suggested_next_steps.len(), 3);
        assert!(response.answers[0].suggested_next_steps.is_empty());
        assert!(!response.recommended_review.is_empty());
    }

    #[tokio::test]
    async fn perfect_score_has_no_weak_topics() {
        let service = OfflineQuizService::new();
        let quiz = service
            .generate(&request("Science - Biology", 3, 0))
            .await
            .unwrap();

        let response = service
            .score(&submission(&quiz, vec![Some(0), Some(0), Some(0)]))
            .await
            .unwrap();
        assert_eq!(response.percentage, 100.0);
        assert!(response.weak_topics.is_empty());
        assert!(response.recommended_review.is_empty());
        assert!(response.feedback.starts_with("Excellent"));
    }

    #[tokio::test]
    async fn unanswered_questions_count_as_missed() {
        let service = OfflineQuizService::new();
        let quiz = service.generate(&request("Algebra", 2, 0)).await.unwrap();

        let response = service
            .score(&submission(&quiz, vec![None, Some(0)]))
            .await
            .unwrap();
        assert_eq!(response.correct_count, 1);
        assert_eq!(response.answers[0].suggested_next_steps.len(), 3);
    }

    #[tokio::test]
    async fn unknown_quiz_is_not_found() {
        let service = OfflineQuizService::new();
        let err = service
            .score(&ScoreRequest {
                quiz_id: QuestionSetId::new("quiz_missing"),
                answers: vec![Some(0)],
                time_spent_seconds: 1,
                questions: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn answer_count_mismatch_is_rejected() {
        let service = OfflineQuizService::new();
        let quiz = service.generate(&request("History", 3, 0)).await.unwrap();
        let err = service
            .score(&submission(&quiz, vec![Some(0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Api { status: 400, .. }));
        assert_eq!(service.issued_count(), 1);
    }
}
