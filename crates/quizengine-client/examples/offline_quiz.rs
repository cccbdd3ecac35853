//! Offline quiz example: drive a session programmatically with the built-in
//! sample questions.
//!
//! ```bash
//! cargo run -p quizengine-client --example offline_quiz
//! ```

use std::sync::Arc;

use quizengine_client::OfflineQuizService;
use quizengine_core::model::{Difficulty, QuizRequest};
use quizengine_core::session::{Direction, EngineConfig, SessionController};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let controller =
        SessionController::with_service(Arc::new(OfflineQuizService::new()), EngineConfig::default());

    let request = QuizRequest::new("History")
        .with_difficulty(Difficulty::Easy)
        .with_question_count(3);
    controller.request_generation(request).await?;

    // Always pick the first option.
    while let Some(question) = controller.current_question() {
        println!("{}. {}", question.position + 1, question.text);
        controller.select_current(0)?;
        if controller.progress().is_some_and(|p| p.is_last_question()) {
            break;
        }
        controller.navigate(Direction::Next)?;
    }

    controller.submit().await?;
    if let Some(score) = controller.score() {
        println!(
            "\nScore: {:.1}% ({} of {} correct)",
            score.percentage, score.correct_count, score.total_questions
        );
        println!("{}", score.feedback);
    }

    for entry in controller.review_entries().unwrap_or_default() {
        println!(
            "Missed question {}: you chose {:?}, correct was {:?}",
            entry.position() + 1,
            entry.user_option().unwrap_or("-"),
            entry.correct_option().unwrap_or("-")
        );
    }

    Ok(())
}
