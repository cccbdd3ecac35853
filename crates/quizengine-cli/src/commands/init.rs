//! The `quizengine init` command.

use std::path::Path;

use anyhow::{Context, Result};

use quizengine_client::config::{CONFIG_FILE_NAME, STARTER_CONFIG};

pub fn execute() -> Result<()> {
    if Path::new(CONFIG_FILE_NAME).exists() {
        println!("{CONFIG_FILE_NAME} already exists, skipping.");
    } else {
        std::fs::write(CONFIG_FILE_NAME, STARTER_CONFIG)
            .with_context(|| format!("failed to write {CONFIG_FILE_NAME}"))?;
        println!("Created {CONFIG_FILE_NAME}");
    }

    println!("\nNext steps:");
    println!("  1. Point [service] base_url at your quiz backend, or set type = \"offline\"");
    println!("  2. Run: quizengine topics");
    println!("  3. Run: quizengine play --topic \"History\"");

    Ok(())
}
