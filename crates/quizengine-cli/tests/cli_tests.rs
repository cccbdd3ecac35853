//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn quizengine(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("quizengine").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("QUIZENGINE_BASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn topics_lists_suggestions() {
    let dir = TempDir::new().unwrap();
    quizengine(&dir)
        .arg("topics")
        .assert()
        .success()
        .stdout(predicate::str::contains("Popular topics"))
        .stdout(predicate::str::contains("Mathematics - Algebra"))
        .stdout(predicate::str::contains("History"));
}

#[test]
fn init_writes_starter_config_once() {
    let dir = TempDir::new().unwrap();

    quizengine(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quizengine.toml"));
    let written = std::fs::read_to_string(dir.path().join("quizengine.toml")).unwrap();
    assert!(written.contains("[service]"));

    quizengine(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn offline_quiz_is_scored() {
    let dir = TempDir::new().unwrap();
    quizengine(&dir)
        .args(["play", "--offline", "--topic", "History", "--questions", "3"])
        .write_stdin("1\nn\n1\nn\n1\ns\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Using built-in sample questions"))
        .stdout(predicate::str::contains("Question 3 of 3"))
        .stdout(predicate::str::contains("2 out of 3 correct"));
}

#[test]
fn offline_review_shows_the_missed_answer() {
    let dir = TempDir::new().unwrap();
    quizengine(&dir)
        .args(["play", "--offline", "--topic", "History", "--questions", "3"])
        .write_stdin("1\nn\n1\nn\n1\ns\nr\nb\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Missed question 1 of 1 (question 3)"))
        .stdout(predicate::str::contains("Correct answer: 1775"))
        .stdout(predicate::str::contains("Your answer:    1776"));
}

#[test]
fn unanswered_quiz_has_nothing_to_review() {
    let dir = TempDir::new().unwrap();
    quizengine(&dir)
        .args(["play", "--offline", "--topic", "History", "--questions", "2"])
        .write_stdin("s\nr\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 out of 2 correct"))
        .stdout(predicate::str::contains("Nothing to review"));
}

#[test]
fn topic_can_be_picked_by_number() {
    let dir = TempDir::new().unwrap();
    quizengine(&dir)
        .args(["play", "--offline", "--questions", "1"])
        .write_stdin("1\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("on \"Mathematics - Algebra\""));
}

#[test]
fn quitting_mid_quiz_exits_cleanly() {
    let dir = TempDir::new().unwrap();
    quizengine(&dir)
        .args(["play", "--offline", "--topic", "History"])
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Question 1 of 10"));
}

#[test]
fn zero_questions_is_rejected() {
    let dir = TempDir::new().unwrap();
    quizengine(&dir)
        .args(["play", "--offline", "--topic", "History", "--questions", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("question"));
}

#[test]
fn time_limit_above_maximum_is_rejected() {
    let dir = TempDir::new().unwrap();
    quizengine(&dir)
        .args(["play", "--offline", "--topic", "History", "--time-limit", "121"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    quizengine(&dir)
        .args(["play", "--config", "nope.toml", "--topic", "History"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn offline_service_from_config_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("quizengine.toml"),
        "[service]\ntype = \"offline\"\n\n[defaults]\nquestion_count = 2\n",
    )
    .unwrap();
    quizengine(&dir)
        .args(["play", "--topic", "History"])
        .write_stdin("s\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 out of 2 correct"));
}

#[test]
fn unknown_difficulty_is_rejected_by_the_parser() {
    let dir = TempDir::new().unwrap();
    quizengine(&dir)
        .args(["play", "--offline", "--difficulty", "extreme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown difficulty"));
}
