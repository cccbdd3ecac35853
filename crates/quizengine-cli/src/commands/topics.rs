//! The `quizengine topics` command.

use anyhow::Result;

/// Topics offered as quick picks.
pub const POPULAR_TOPICS: [&str; 7] = [
    "Mathematics - Algebra",
    "Mathematics - Geometry",
    "Science - Biology",
    "Science - Chemistry",
    "Science - Physics",
    "History",
    "English Literature",
];

pub fn execute() -> Result<()> {
    println!("Popular topics:");
    for topic in POPULAR_TOPICS {
        println!("  {topic}");
    }
    println!("\nAny other topic works too: quizengine play --topic \"Your topic\"");
    Ok(())
}
