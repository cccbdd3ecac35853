//! Quiz session controller.
//!
//! The controller is a tagged state machine:
//!
//! ```text
//! TopicSelection -> Generating -> InProgress -> Submitting -> Scored <-> Reviewing
//!                        |                          |
//!                        +--------> Error <---------+
//! ```
//!
//! Each state owns exactly the data that is meaningful in it, so a score can
//! never coexist with an in-progress quiz. `reset()` returns to
//! `TopicSelection` from anywhere.
//!
//! Two sources can trigger submission: the caller and the countdown timer.
//! Both go through the same check-and-set on the state under the controller
//! mutex, so at most one scoring call is made per session. Every async
//! completion (generation response, scoring response, timer expiry) carries
//! the session epoch it started under and is dropped if a reset or a new
//! generation has happened since.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::answers::{Answer, AnswerTracker};
use crate::error::{EngineError, FailedOperation, Operation, ServiceError, ValidationError};
use crate::model::{Question, QuestionSetId, QuizRequest, ReviewEntry, ScoreResult, Session};
use crate::progress::QuizProgress;
use crate::review::{derive_review, ReviewNavigator};
use crate::timer::CountdownTimer;
use crate::traits::{GenerateRequest, QuizGenerator, QuizScorer, ScoreRequest};

/// Limits and wire behaviour for the controller.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Largest question count accepted by `request_generation`.
    pub max_questions: u32,
    /// Largest time limit accepted by `request_generation`.
    pub max_time_limit_minutes: u32,
    /// Send the question list along with answers for stateless scorers.
    pub echo_questions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_questions: 20,
            max_time_limit_minutes: 120,
            echo_questions: true,
        }
    }
}

/// Public state tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    TopicSelection,
    Generating,
    InProgress,
    Submitting,
    Scored,
    Reviewing,
    Error,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::TopicSelection => "topic_selection",
            SessionState::Generating => "generating",
            SessionState::InProgress => "in_progress",
            SessionState::Submitting => "submitting",
            SessionState::Scored => "scored",
            SessionState::Reviewing => "reviewing",
            SessionState::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// What submission was triggered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual,
    Expiry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The quiz is ready and the session is `InProgress`.
    Started {
        quiz_id: QuestionSetId,
        question_count: usize,
        timed: bool,
    },
    /// The session was reset while the request was in flight.
    Discarded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Scored { percentage: f64 },
    /// Another trigger already submitted this session.
    AlreadySubmitted,
    /// The session was reset while scoring was in flight.
    Discarded,
}

// ---------------------------------------------------------------------------
// State payloads
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct ActiveQuiz {
    session: Session,
    answers: AnswerTracker,
    cursor: usize,
    timer: Option<CountdownTimer>,
    started_at: Instant,
    frozen_elapsed: Option<u32>,
}

impl ActiveQuiz {
    fn remaining_seconds(&self) -> Option<u32> {
        self.timer.as_ref().map(CountdownTimer::remaining_seconds)
    }

    /// Stops the clock on first call; later calls return the same value so a
    /// resubmission reports the original time spent.
    fn freeze_elapsed(&mut self) -> u32 {
        if let Some(elapsed) = self.frozen_elapsed {
            return elapsed;
        }
        let elapsed = match self.timer.as_mut() {
            Some(timer) => timer.limit_seconds() - timer.stop(),
            None => u32::try_from(self.started_at.elapsed().as_secs()).unwrap_or(u32::MAX),
        };
        self.frozen_elapsed = Some(elapsed);
        elapsed
    }

    fn progress(&self) -> QuizProgress {
        QuizProgress::new(
            self.cursor,
            self.session.question_count(),
            self.answers.answered_count(),
            self.remaining_seconds(),
        )
    }
}

#[derive(Debug)]
struct ScoredQuiz {
    session: Session,
    answers: Vec<Option<usize>>,
    time_spent_seconds: u32,
    score: ScoreResult,
    review: Vec<ReviewEntry>,
}

#[derive(Debug)]
enum Failure {
    Generation {
        request: QuizRequest,
        error: ServiceError,
    },
    Scoring {
        quiz: Box<ActiveQuiz>,
        error: ServiceError,
    },
}

#[derive(Debug)]
enum Phase {
    TopicSelection,
    Generating { request: QuizRequest },
    InProgress(Box<ActiveQuiz>),
    Submitting(Box<ActiveQuiz>),
    Scored(Box<ScoredQuiz>),
    Reviewing(Box<ScoredQuiz>, ReviewNavigator),
    Failed(Failure),
}

impl Phase {
    fn state(&self) -> SessionState {
        match self {
            Phase::TopicSelection => SessionState::TopicSelection,
            Phase::Generating { .. } => SessionState::Generating,
            Phase::InProgress(_) => SessionState::InProgress,
            Phase::Submitting(_) => SessionState::Submitting,
            Phase::Scored(_) => SessionState::Scored,
            Phase::Reviewing(..) => SessionState::Reviewing,
            Phase::Failed(_) => SessionState::Error,
        }
    }

    fn active(&self) -> Option<&ActiveQuiz> {
        match self {
            Phase::InProgress(quiz)
            | Phase::Submitting(quiz)
            | Phase::Failed(Failure::Scoring { quiz, .. }) => Some(quiz),
            _ => None,
        }
    }

    fn scored(&self) -> Option<&ScoredQuiz> {
        match self {
            Phase::Scored(scored) | Phase::Reviewing(scored, _) => Some(scored),
            _ => None,
        }
    }
}

struct Inner {
    phase: Phase,
    /// Bumped on every reset and every new generation request.
    epoch: u64,
}

struct Shared {
    generator: Arc<dyn QuizGenerator>,
    scorer: Arc<dyn QuizScorer>,
    config: EngineConfig,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<SessionState>,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Drives one quiz at a time from topic selection to review.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
}

impl SessionController {
    pub fn new(
        generator: Arc<dyn QuizGenerator>,
        scorer: Arc<dyn QuizScorer>,
        config: EngineConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(SessionState::TopicSelection);
        Self {
            shared: Arc::new(Shared {
                generator,
                scorer,
                config,
                inner: Mutex::new(Inner {
                    phase: Phase::TopicSelection,
                    epoch: 0,
                }),
                state_tx,
            }),
        }
    }

    /// Builds a controller over a single service that both generates and scores.
    pub fn with_service<S>(service: Arc<S>, config: EngineConfig) -> Self
    where
        S: QuizGenerator + QuizScorer + 'static,
    {
        Self::new(service.clone(), service, config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    // -- transitions --------------------------------------------------------

    /// Requests a new quiz. Legal from `TopicSelection` and `Error`.
    ///
    /// Validation failures leave the state untouched. A service failure moves
    /// the session to `Error` and is also returned as [`EngineError::Service`].
    pub async fn request_generation(
        &self,
        request: QuizRequest,
    ) -> Result<GenerationOutcome, EngineError> {
        let (epoch, service_request) = {
            let mut inner = self.lock();
            let state = inner.phase.state();
            if !matches!(state, SessionState::TopicSelection | SessionState::Error) {
                return Err(protocol_violation(Operation::RequestGeneration, state));
            }
            let request = self.validate(request)?;
            let service_request = GenerateRequest {
                topic_name: request.topic.clone(),
                difficulty: request.difficulty,
                question_count: request.question_count,
                time_limit_minutes: request.time_limit_minutes,
            };
            inner.epoch += 1;
            let epoch = inner.epoch;
            self.set_phase(&mut inner, Phase::Generating { request });
            (epoch, service_request)
        };

        info!(
            topic = %service_request.topic_name,
            difficulty = %service_request.difficulty,
            questions = service_request.question_count,
            time_limit_minutes = service_request.time_limit_minutes,
            generator = self.shared.generator.name(),
            "requesting quiz"
        );
        let result = self
            .shared
            .generator
            .generate(&service_request)
            .await
            .and_then(|quiz| quiz.into_questions());

        let mut inner = self.lock();
        let request = match &inner.phase {
            Phase::Generating { request } if inner.epoch == epoch => request.clone(),
            _ => {
                warn!(
                    topic = %service_request.topic_name,
                    "discarding quiz generated for a session that is no longer active"
                );
                return Ok(GenerationOutcome::Discarded);
            }
        };

        match result {
            Ok((quiz_id, questions, time_limit_seconds, is_sample)) => {
                let question_count = questions.len();
                let session = Session {
                    id: quiz_id.clone(),
                    topic: request.topic,
                    difficulty: request.difficulty,
                    questions,
                    time_limit_seconds,
                    is_sample,
                    created_at: Utc::now(),
                };
                let timer = self.start_timer(epoch, time_limit_seconds);
                let quiz = ActiveQuiz {
                    answers: AnswerTracker::new(question_count),
                    cursor: 0,
                    timer,
                    started_at: Instant::now(),
                    frozen_elapsed: None,
                    session,
                };
                info!(
                    quiz_id = %quiz_id,
                    questions = question_count,
                    time_limit_seconds,
                    is_sample,
                    "quiz started"
                );
                self.set_phase(&mut inner, Phase::InProgress(Box::new(quiz)));
                Ok(GenerationOutcome::Started {
                    quiz_id,
                    question_count,
                    timed: time_limit_seconds > 0,
                })
            }
            Err(error) => {
                warn!(%error, "quiz generation failed");
                self.set_phase(
                    &mut inner,
                    Phase::Failed(Failure::Generation {
                        request,
                        error: error.clone(),
                    }),
                );
                Err(EngineError::Service {
                    operation: FailedOperation::Generation,
                    source: error,
                })
            }
        }
    }

    /// Records `option` for the question at `position`, replacing any prior
    /// choice. Returns the number of answered questions.
    pub fn select_answer(&self, position: usize, option: usize) -> Result<usize, EngineError> {
        let mut inner = self.lock();
        let state = inner.phase.state();
        let Phase::InProgress(quiz) = &mut inner.phase else {
            return Err(protocol_violation(Operation::SelectAnswer, state));
        };

        let len = quiz.session.question_count();
        let option_count = quiz
            .session
            .questions
            .get(position)
            .map(|q| q.options.len())
            .ok_or(EngineError::QuestionOutOfRange { position, len })?;
        if option >= option_count {
            return Err(EngineError::OptionOutOfRange {
                position,
                option,
                len: option_count,
            });
        }

        quiz.answers.set(position, option);
        Ok(quiz.answers.answered_count())
    }

    /// Answers the question under the cursor.
    pub fn select_current(&self, option: usize) -> Result<usize, EngineError> {
        let position = {
            let inner = self.lock();
            match &inner.phase {
                Phase::InProgress(quiz) => quiz.cursor,
                other => return Err(protocol_violation(Operation::SelectAnswer, other.state())),
            }
        };
        self.select_answer(position, option)
    }

    /// Moves the question cursor, clamped to the quiz bounds.
    pub fn navigate(&self, direction: Direction) -> Result<usize, EngineError> {
        let mut inner = self.lock();
        let state = inner.phase.state();
        let Phase::InProgress(quiz) = &mut inner.phase else {
            return Err(protocol_violation(Operation::Navigate, state));
        };
        let last = quiz.session.question_count().saturating_sub(1);
        quiz.cursor = match direction {
            Direction::Next => (quiz.cursor + 1).min(last),
            Direction::Previous => quiz.cursor.saturating_sub(1),
        };
        Ok(quiz.cursor)
    }

    /// Submits the answers for scoring.
    ///
    /// Legal from `InProgress`, and from `Error` when scoring failed (the
    /// held answers are resubmitted). A call while `Submitting`, `Scored` or
    /// `Reviewing` is a no-op reported as [`SubmitOutcome::AlreadySubmitted`].
    /// Timer expiry never resubmits from `Error`.
    pub async fn submit(&self) -> Result<SubmitOutcome, EngineError> {
        self.submit_as(SubmitTrigger::Manual, None).await
    }

    async fn submit_as(
        &self,
        trigger: SubmitTrigger,
        expected_epoch: Option<u64>,
    ) -> Result<SubmitOutcome, EngineError> {
        let (epoch, request) = {
            let mut inner = self.lock();
            if expected_epoch.is_some_and(|expected| expected != inner.epoch) {
                debug!(?trigger, "ignoring submission for a discarded session");
                return Ok(SubmitOutcome::Discarded);
            }

            let from = inner.phase.state();
            let mut quiz = match std::mem::replace(&mut inner.phase, Phase::TopicSelection) {
                Phase::InProgress(quiz) => quiz,
                // Only the caller may resubmit after a scoring failure; an
                // expiry queued before the failure must not retry it.
                Phase::Failed(Failure::Scoring { quiz, .. }) if trigger == SubmitTrigger::Manual => {
                    quiz
                }
                other @ (Phase::Submitting(_)
                | Phase::Scored(_)
                | Phase::Reviewing(..)
                | Phase::Failed(Failure::Scoring { .. })) => {
                    inner.phase = other;
                    debug!(?trigger, state = %from, "submission already made, ignoring");
                    return Ok(SubmitOutcome::AlreadySubmitted);
                }
                other => {
                    inner.phase = other;
                    return Err(protocol_violation(Operation::Submit, from));
                }
            };

            let time_spent_seconds = quiz.freeze_elapsed();
            let request = ScoreRequest {
                quiz_id: quiz.session.id.clone(),
                answers: quiz.answers.snapshot(),
                time_spent_seconds,
                questions: if self.shared.config.echo_questions {
                    quiz.session.questions.clone()
                } else {
                    Vec::new()
                },
            };
            inner.phase = Phase::Submitting(quiz);
            self.notify(from, SessionState::Submitting);
            (inner.epoch, request)
        };

        info!(
            quiz_id = %request.quiz_id,
            ?trigger,
            answered = request.answers.iter().filter(|a| a.is_some()).count(),
            time_spent_seconds = request.time_spent_seconds,
            "submitting quiz"
        );
        let response = self.shared.scorer.score(&request).await;

        let mut inner = self.lock();
        if inner.epoch != epoch {
            warn!(quiz_id = %request.quiz_id, "discarding score for a session that is no longer active");
            return Ok(SubmitOutcome::Discarded);
        }
        let quiz = match std::mem::replace(&mut inner.phase, Phase::TopicSelection) {
            Phase::Submitting(quiz) => quiz,
            other => {
                inner.phase = other;
                return Ok(SubmitOutcome::Discarded);
            }
        };

        match response.and_then(|r| r.into_result(&quiz.session.questions)) {
            Ok((score, outcomes)) => {
                let answers = request.answers;
                let review = derive_review(&quiz.session.questions, &outcomes, &answers);
                let percentage = score.percentage;
                info!(
                    quiz_id = %request.quiz_id,
                    percentage,
                    correct = score.correct_count,
                    total = score.total_questions,
                    missed = review.len(),
                    "quiz scored"
                );
                let scored = ScoredQuiz {
                    session: quiz.session,
                    answers,
                    time_spent_seconds: request.time_spent_seconds,
                    score,
                    review,
                };
                inner.phase = Phase::Scored(Box::new(scored));
                self.notify(SessionState::Submitting, SessionState::Scored);
                Ok(SubmitOutcome::Scored { percentage })
            }
            Err(error) => {
                warn!(quiz_id = %request.quiz_id, %error, "quiz scoring failed");
                inner.phase = Phase::Failed(Failure::Scoring {
                    quiz,
                    error: error.clone(),
                });
                self.notify(SessionState::Submitting, SessionState::Error);
                Err(EngineError::Service {
                    operation: FailedOperation::Scoring,
                    source: error,
                })
            }
        }
    }

    /// Enters review mode. Returns `false` (and stays `Scored`) when no
    /// answered question was wrong.
    pub fn begin_review(&self) -> Result<bool, EngineError> {
        let mut inner = self.lock();
        let from = inner.phase.state();
        match std::mem::replace(&mut inner.phase, Phase::TopicSelection) {
            Phase::Scored(scored) => match ReviewNavigator::new(scored.review.len()) {
                Some(navigator) => {
                    inner.phase = Phase::Reviewing(scored, navigator);
                    self.notify(from, SessionState::Reviewing);
                    Ok(true)
                }
                None => {
                    inner.phase = Phase::Scored(scored);
                    debug!("nothing to review");
                    Ok(false)
                }
            },
            other => {
                inner.phase = other;
                Err(protocol_violation(Operation::BeginReview, from))
            }
        }
    }

    /// Moves the review cursor and returns the entry under it.
    pub fn review_navigate(&self, direction: Direction) -> Result<ReviewEntry, EngineError> {
        let mut inner = self.lock();
        let state = inner.phase.state();
        let Phase::Reviewing(scored, navigator) = &mut inner.phase else {
            return Err(protocol_violation(Operation::ReviewNavigate, state));
        };
        let index = match direction {
            Direction::Next => navigator.next(),
            Direction::Previous => navigator.previous(),
        };
        Ok(scored.review[index].clone())
    }

    /// Leaves review mode, keeping the score.
    pub fn back_to_results(&self) -> Result<(), EngineError> {
        let mut inner = self.lock();
        let from = inner.phase.state();
        match std::mem::replace(&mut inner.phase, Phase::TopicSelection) {
            Phase::Reviewing(scored, _) => {
                inner.phase = Phase::Scored(scored);
                self.notify(from, SessionState::Scored);
                Ok(())
            }
            other => {
                inner.phase = other;
                Err(protocol_violation(Operation::BackToResults, from))
            }
        }
    }

    /// Discards everything and returns to `TopicSelection`.
    ///
    /// Stops the countdown and invalidates any in-flight generation, scoring,
    /// or timer expiry belonging to the discarded session.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.epoch += 1;
        let from = inner.phase.state();
        let discarded = std::mem::replace(&mut inner.phase, Phase::TopicSelection);
        drop(discarded);
        if from != SessionState::TopicSelection {
            info!(from = %from, "session reset");
        }
        self.notify(from, SessionState::TopicSelection);
    }

    // -- views ---------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.lock().phase.state()
    }

    /// Receives every state tag change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state_tx.subscribe()
    }

    /// The held session, while one exists.
    pub fn session(&self) -> Option<Session> {
        let inner = self.lock();
        inner
            .phase
            .active()
            .map(|quiz| quiz.session.clone())
            .or_else(|| inner.phase.scored().map(|scored| scored.session.clone()))
    }

    /// The question under the cursor, while a quiz is in progress.
    pub fn current_question(&self) -> Option<Question> {
        let inner = self.lock();
        inner
            .phase
            .active()
            .and_then(|quiz| quiz.session.questions.get(quiz.cursor).cloned())
    }

    pub fn current_position(&self) -> Option<usize> {
        self.lock().phase.active().map(|quiz| quiz.cursor)
    }

    /// Read view of the answer slots.
    pub fn answers(&self) -> Option<Vec<Answer>> {
        self.lock()
            .phase
            .active()
            .map(|quiz| quiz.answers.as_slice().to_vec())
    }

    pub fn answered_count(&self) -> usize {
        self.lock()
            .phase
            .active()
            .map_or(0, |quiz| quiz.answers.answered_count())
    }

    /// Seconds left on the countdown; `None` when untimed or no quiz is held.
    pub fn remaining_seconds(&self) -> Option<u32> {
        self.lock()
            .phase
            .active()
            .and_then(ActiveQuiz::remaining_seconds)
    }

    /// Per-second countdown updates for a running timed quiz.
    pub fn subscribe_countdown(&self) -> Option<watch::Receiver<u32>> {
        self.lock()
            .phase
            .active()
            .and_then(|quiz| quiz.timer.as_ref().map(CountdownTimer::subscribe))
    }

    pub fn progress(&self) -> Option<QuizProgress> {
        self.lock().phase.active().map(ActiveQuiz::progress)
    }

    pub fn score(&self) -> Option<ScoreResult> {
        self.lock()
            .phase
            .scored()
            .map(|scored| scored.score.clone())
    }

    pub fn time_spent_seconds(&self) -> Option<u32> {
        let inner = self.lock();
        inner
            .phase
            .scored()
            .map(|scored| scored.time_spent_seconds)
            .or_else(|| inner.phase.active().and_then(|quiz| quiz.frozen_elapsed))
    }

    /// Submitted answers, once scored.
    pub fn submitted_answers(&self) -> Option<Vec<Option<usize>>> {
        self.lock()
            .phase
            .scored()
            .map(|scored| scored.answers.clone())
    }

    /// Missed questions in question order, once scored.
    pub fn review_entries(&self) -> Option<Vec<ReviewEntry>> {
        self.lock()
            .phase
            .scored()
            .map(|scored| scored.review.clone())
    }

    /// The entry under the review cursor with its index and the list length.
    pub fn current_review(&self) -> Option<(usize, usize, ReviewEntry)> {
        let inner = self.lock();
        match &inner.phase {
            Phase::Reviewing(scored, navigator) => {
                let index = navigator.position();
                Some((index, navigator.total(), scored.review[index].clone()))
            }
            _ => None,
        }
    }

    /// The failed operation and its cause while in `Error`.
    pub fn last_error(&self) -> Option<(FailedOperation, ServiceError)> {
        match &self.lock().phase {
            Phase::Failed(Failure::Generation { error, .. }) => {
                Some((FailedOperation::Generation, error.clone()))
            }
            Phase::Failed(Failure::Scoring { error, .. }) => {
                Some((FailedOperation::Scoring, error.clone()))
            }
            _ => None,
        }
    }

    /// The request whose generation failed, for a targeted retry.
    pub fn failed_request(&self) -> Option<QuizRequest> {
        match &self.lock().phase {
            Phase::Failed(Failure::Generation { request, .. }) => Some(request.clone()),
            _ => None,
        }
    }

    // -- internals -----------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn validate(&self, mut request: QuizRequest) -> Result<QuizRequest, ValidationError> {
        let config = &self.shared.config;
        request.topic = request.topic.trim().to_string();
        if request.topic.is_empty() {
            return Err(ValidationError::EmptyTopic);
        }
        if request.question_count == 0 || request.question_count > config.max_questions {
            return Err(ValidationError::QuestionCount {
                requested: request.question_count,
                max: config.max_questions,
            });
        }
        if request.time_limit_minutes > config.max_time_limit_minutes {
            return Err(ValidationError::TimeLimit {
                requested: request.time_limit_minutes,
                max: config.max_time_limit_minutes,
            });
        }
        Ok(request)
    }

    fn start_timer(&self, epoch: u64, limit_seconds: u32) -> Option<CountdownTimer> {
        let shared = Arc::downgrade(&self.shared);
        CountdownTimer::start(limit_seconds, move || async move {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let controller = SessionController { shared };
            info!("time is up, submitting");
            if let Err(error) = controller
                .submit_as(SubmitTrigger::Expiry, Some(epoch))
                .await
            {
                warn!(%error, "automatic submission failed");
            }
        })
    }

    fn set_phase(&self, inner: &mut Inner, phase: Phase) {
        let from = inner.phase.state();
        inner.phase = phase;
        self.notify(from, inner.phase.state());
    }

    fn notify(&self, from: SessionState, to: SessionState) {
        if from != to {
            debug!(from = %from, to = %to, "session state changed");
            self.shared.state_tx.send_replace(to);
        }
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state())
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

fn protocol_violation(operation: Operation, state: SessionState) -> EngineError {
    EngineError::ProtocolViolation { operation, state }
}
