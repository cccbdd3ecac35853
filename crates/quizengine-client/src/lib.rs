//! quizengine-client: quiz service implementations and configuration.
//!
//! Implements the `QuizGenerator` and `QuizScorer` collaborators for an HTTP
//! quiz backend, a built-in offline sample bank, and a scriptable mock, plus
//! config file loading and a service factory.

pub mod config;
pub mod http;
pub mod mock;
pub mod offline;

pub use config::{
    create_service, load_config, load_config_from, QuizEngineConfig, QuizServices, ServiceConfig,
};
pub use http::HttpQuizService;
pub use mock::MockQuizService;
pub use offline::OfflineQuizService;
