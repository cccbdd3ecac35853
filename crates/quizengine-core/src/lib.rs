//! quizengine-core: quiz session state machine and its building blocks.
//!
//! This crate owns the rules of a quiz session: request validation, answer
//! tracking, the countdown timer, submission exclusivity, and review
//! derivation. Question generation and scoring are reached through the
//! [`traits::QuizGenerator`] and [`traits::QuizScorer`] collaborators.

pub mod answers;
pub mod error;
pub mod model;
pub mod progress;
pub mod review;
pub mod session;
pub mod timer;
pub mod traits;

pub use error::{EngineError, ServiceError, ValidationError};
pub use session::{
    Direction, EngineConfig, GenerationOutcome, SessionController, SessionState, SubmitOutcome,
};
