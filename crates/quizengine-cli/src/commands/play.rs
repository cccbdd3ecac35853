//! The `quizengine play` command.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use comfy_table::{Cell, Table};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;

use quizengine_client::config::{create_service, load_config_from, ServiceConfig};
use quizengine_core::error::EngineError;
use quizengine_core::model::{Difficulty, Question, QuizRequest, ReviewEntry, ScoreResult};
use quizengine_core::progress::{format_clock, QuizProgress, LOW_TIME_THRESHOLD_SECS};
use quizengine_core::session::{
    Direction, GenerationOutcome, SessionController, SessionState, SubmitOutcome,
};

use super::topics::POPULAR_TOPICS;

pub struct PlayOptions {
    pub topic: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub questions: Option<u32>,
    pub time_limit: Option<u32>,
    pub config: Option<PathBuf>,
    pub offline: bool,
}

pub async fn execute(options: PlayOptions) -> Result<()> {
    let config = load_config_from(options.config.as_deref())?;
    let service_config = if options.offline {
        ServiceConfig::Offline
    } else {
        config.service.clone()
    };
    let services = create_service(&service_config)?;
    let controller = SessionController::new(
        services.generator,
        services.scorer,
        config.engine_config(),
    );

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let topic = match options.topic {
        Some(topic) => topic,
        None => prompt_topic(&mut input).await?,
    };

    let mut request = config.default_request(topic);
    if let Some(difficulty) = options.difficulty {
        request.difficulty = difficulty;
    }
    if let Some(count) = options.questions {
        request.question_count = count;
    }
    if let Some(minutes) = options.time_limit {
        request.time_limit_minutes = minutes;
    }

    Player {
        controller,
        input,
        request,
    }
    .run()
    .await
}

type Input = Lines<BufReader<Stdin>>;

async fn prompt_topic(input: &mut Input) -> Result<String> {
    println!("Pick a topic by number, or type your own:");
    for (i, topic) in POPULAR_TOPICS.iter().enumerate() {
        println!("  {}) {topic}", i + 1);
    }
    loop {
        let Some(line) = input.next_line().await.context("failed to read topic")? else {
            bail!("no topic given");
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let picked = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| POPULAR_TOPICS.get(i));
        return Ok(picked.map_or_else(|| line.to_string(), |t| t.to_string()));
    }
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Zero-based option index.
    Select(usize),
    Next,
    Previous,
    Submit,
    Review,
    Back,
    Another,
    Retry,
    Quit,
    Help,
    Empty,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let input = line.trim().to_lowercase();
    if input.is_empty() {
        return Command::Empty;
    }
    if let Ok(n) = input.parse::<usize>() {
        return match n.checked_sub(1) {
            Some(index) => Command::Select(index),
            None => Command::Unknown(input),
        };
    }
    match input.as_str() {
        "n" | "next" => Command::Next,
        "p" | "prev" | "previous" => Command::Previous,
        "s" | "submit" => Command::Submit,
        "r" | "review" => Command::Review,
        "b" | "back" => Command::Back,
        "a" | "another" => Command::Another,
        "retry" | "y" | "yes" => Command::Retry,
        "q" | "quit" | "exit" => Command::Quit,
        "h" | "help" | "?" => Command::Help,
        _ => Command::Unknown(input),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Another,
    Quit,
}

struct Player {
    controller: SessionController,
    input: Input,
    request: QuizRequest,
}

impl Player {
    async fn run(mut self) -> Result<()> {
        loop {
            if !self.start_quiz().await? {
                return Ok(());
            }
            if self.play_quiz().await? == Flow::Quit {
                return Ok(());
            }
            match self.show_results().await? {
                Flow::Another => self.controller.reset(),
                Flow::Continue | Flow::Quit => return Ok(()),
            }
        }
    }

    async fn read_command(&mut self) -> Result<Option<Command>> {
        let line = self
            .input
            .next_line()
            .await
            .context("failed to read input")?;
        Ok(line.map(|l| parse_command(&l)))
    }

    async fn confirm_retry(&mut self) -> Result<bool> {
        loop {
            println!("Type `retry` to try again or `q` to quit.");
            match self.read_command().await? {
                Some(Command::Retry) => return Ok(true),
                Some(Command::Quit) | None => return Ok(false),
                Some(_) => {}
            }
        }
    }

    /// Returns `false` when the user gave up.
    async fn start_quiz(&mut self) -> Result<bool> {
        loop {
            println!(
                "Generating {} {} question(s) on \"{}\"...",
                self.request.question_count,
                self.request.difficulty,
                self.request.topic.trim()
            );
            match self.controller.request_generation(self.request.clone()).await {
                Ok(GenerationOutcome::Started { .. }) => {
                    if let Some(session) = self.controller.session() {
                        if session.is_sample {
                            println!("Using built-in sample questions.");
                        }
                        if session.is_timed() {
                            println!("Time limit: {}", format_clock(session.time_limit_seconds));
                        }
                    }
                    return Ok(true);
                }
                Ok(GenerationOutcome::Discarded) => return Ok(false),
                Err(err @ EngineError::Service { .. }) => {
                    println!("{err}");
                    if !self.confirm_retry().await? {
                        return Ok(false);
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn play_quiz(&mut self) -> Result<Flow> {
        let mut states = self.controller.subscribe();
        states.borrow_and_update();
        let mut countdown = self.controller.subscribe_countdown();
        self.show_question();

        loop {
            tokio::select! {
                line = self.input.next_line() => {
                    let Some(line) = line.context("failed to read input")? else {
                        return Ok(Flow::Quit);
                    };
                    let result = match parse_command(&line) {
                        Command::Select(option) => self.controller.select_current(option).map(drop),
                        Command::Next => self.controller.navigate(Direction::Next).map(drop),
                        Command::Previous => self.controller.navigate(Direction::Previous).map(drop),
                        Command::Submit => return self.settle(SessionState::InProgress).await,
                        Command::Quit => return Ok(Flow::Quit),
                        Command::Empty => Ok(()),
                        _ => {
                            print_quiz_help();
                            Ok(())
                        }
                    };
                    match result {
                        Ok(()) => self.show_question(),
                        Err(EngineError::OptionOutOfRange { len, .. }) => {
                            println!("Choose an option between 1 and {len}.");
                        }
                        // The countdown ran out while the user was typing.
                        Err(EngineError::ProtocolViolation { state, .. }) => {
                            return self.settle(state).await;
                        }
                        Err(err) => return Err(err.into()),
                    }
                }
                Some(remaining) = next_tick(&mut countdown) => {
                    if is_clock_warning(remaining) {
                        println!("\n{} left!", format_clock(remaining));
                    }
                }
                changed = states.changed() => {
                    if changed.is_err() {
                        return Ok(Flow::Quit);
                    }
                    let state = *states.borrow_and_update();
                    if state != SessionState::InProgress {
                        println!("\nTime is up! Submitting your answers...");
                        return self.settle(state).await;
                    }
                }
            }
        }
    }

    /// Drives submission until the quiz is scored or the user gives up.
    async fn settle(&mut self, mut state: SessionState) -> Result<Flow> {
        loop {
            state = match state {
                SessionState::Scored => return Ok(Flow::Continue),
                SessionState::InProgress => {
                    if let Some(progress) = self.controller.progress() {
                        println!(
                            "Submitting {} of {} answers...",
                            progress.answered, progress.total
                        );
                    }
                    self.submit_once().await?
                }
                SessionState::Submitting => settled_state(&self.controller).await,
                SessionState::Error => {
                    if let Some((operation, cause)) = self.controller.last_error() {
                        println!("{operation} failed: {cause}");
                    }
                    if !self.confirm_retry().await? {
                        return Ok(Flow::Quit);
                    }
                    self.submit_once().await?
                }
                _ => return Ok(Flow::Quit),
            };
        }
    }

    async fn submit_once(&self) -> Result<SessionState> {
        match self.controller.submit().await {
            Ok(SubmitOutcome::Scored { .. }) => Ok(SessionState::Scored),
            Ok(SubmitOutcome::AlreadySubmitted) => Ok(settled_state(&self.controller).await),
            Ok(SubmitOutcome::Discarded) => Ok(SessionState::TopicSelection),
            Err(EngineError::Service { .. }) => Ok(SessionState::Error),
            Err(err) => Err(err.into()),
        }
    }

    async fn show_results(&mut self) -> Result<Flow> {
        self.print_score_card();
        loop {
            println!("\n[r]eview missed questions  [a]nother quiz  [q]uit");
            match self.read_command().await? {
                Some(Command::Review) => {
                    if !self.controller.begin_review()? {
                        println!("Nothing to review: every answered question was correct.");
                        continue;
                    }
                    if self.review().await? == Flow::Quit {
                        return Ok(Flow::Quit);
                    }
                    self.print_score_card();
                }
                Some(Command::Another) => return Ok(Flow::Another),
                Some(Command::Quit) | None => return Ok(Flow::Quit),
                Some(_) => {}
            }
        }
    }

    async fn review(&mut self) -> Result<Flow> {
        self.show_review_entry();
        loop {
            let moved = match self.read_command().await? {
                Some(Command::Next) => self.controller.review_navigate(Direction::Next),
                Some(Command::Previous) => self.controller.review_navigate(Direction::Previous),
                Some(Command::Back) => {
                    self.controller.back_to_results()?;
                    return Ok(Flow::Continue);
                }
                Some(Command::Quit) | None => return Ok(Flow::Quit),
                Some(_) => {
                    println!("[n]ext  [p]revious  [b]ack to results  [q]uit");
                    continue;
                }
            };
            moved?;
            self.show_review_entry();
        }
    }

    fn show_question(&self) {
        let (Some(question), Some(progress)) =
            (self.controller.current_question(), self.controller.progress())
        else {
            return;
        };
        let selected = self
            .controller
            .answers()
            .and_then(|answers| answers.get(progress.position).and_then(|a| a.selected()));
        println!("{}", format_question(&question, selected, &progress));
    }

    fn show_review_entry(&self) {
        if let Some((index, len, entry)) = self.controller.current_review() {
            println!("{}", format_review(index, len, &entry));
        }
    }

    fn print_score_card(&self) {
        let Some(score) = self.controller.score() else {
            return;
        };
        println!(
            "\nYou got {} out of {} correct.",
            score.correct_count, score.total_questions
        );
        println!("{}", score_table(&score, self.controller.time_spent_seconds()));
    }
}

/// Waits until a submission in flight has an outcome.
async fn settled_state(controller: &SessionController) -> SessionState {
    let mut states = controller.subscribe();
    loop {
        let state = *states.borrow_and_update();
        if state != SessionState::Submitting {
            return state;
        }
        if states.changed().await.is_err() {
            return controller.state();
        }
    }
}

/// Next countdown value; `None` when untimed or once the countdown ends.
async fn next_tick(countdown: &mut Option<watch::Receiver<u32>>) -> Option<u32> {
    let rx = countdown.as_mut()?;
    rx.changed().await.ok()?;
    let remaining = *rx.borrow_and_update();
    Some(remaining)
}

fn is_clock_warning(remaining: u32) -> bool {
    remaining > 0 && (remaining == LOW_TIME_THRESHOLD_SECS || remaining == 60 || remaining == 10)
}

fn print_quiz_help() {
    println!("Commands: 1-9 choose an option, n next, p previous, s submit, q quit");
}

fn format_question(question: &Question, selected: Option<usize>, progress: &QuizProgress) -> String {
    let mut out = format!(
        "\nQuestion {} of {}  |  {} answered",
        progress.position + 1,
        progress.total,
        progress.answered
    );
    if let Some(remaining) = progress.remaining_seconds {
        out.push_str(&format!("  |  time left {}", format_clock(remaining)));
        if progress.low_time {
            out.push_str(" (hurry!)");
        }
    }
    out.push('\n');
    out.push_str(&question.text);
    out.push('\n');
    for (i, option) in question.options.iter().enumerate() {
        let marker = if selected == Some(i) { '*' } else { ' ' };
        out.push_str(&format!(" {marker} {}) {option}\n", i + 1));
    }
    out.push_str("[1-9] choose  [n]ext  [p]revious  [s]ubmit  [q]uit");
    out
}

fn format_review(index: usize, len: usize, entry: &ReviewEntry) -> String {
    let mut out = format!(
        "\nMissed question {} of {} (question {})\n{}\n",
        index + 1,
        len,
        entry.position() + 1,
        entry.question.text
    );
    out.push_str(&format!(
        "Your answer:    {}\n",
        entry.user_option().unwrap_or("-")
    ));
    out.push_str(&format!(
        "Correct answer: {}\n",
        entry.correct_option().unwrap_or("-")
    ));
    if let Some(explanation) = &entry.explanation {
        out.push_str(&format!("Why: {explanation}\n"));
    }
    if !entry.suggested_next_steps.is_empty() {
        out.push_str("Next steps:\n");
        for step in &entry.suggested_next_steps {
            out.push_str(&format!("  - {step}\n"));
        }
    }
    out.push_str("[n]ext  [p]revious  [b]ack to results  [q]uit");
    out
}

fn score_table(score: &ScoreResult, time_spent: Option<u32>) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Result", ""]);
    table.add_row(vec![
        Cell::new("Score"),
        Cell::new(format!("{:.1}%", score.percentage)),
    ]);
    table.add_row(vec![
        Cell::new("Correct"),
        Cell::new(format!(
            "{} out of {} correct",
            score.correct_count, score.total_questions
        )),
    ]);
    if let Some(seconds) = time_spent {
        table.add_row(vec![Cell::new("Time spent"), Cell::new(format_clock(seconds))]);
    }
    if !score.feedback.is_empty() {
        table.add_row(vec![Cell::new("Feedback"), Cell::new(&score.feedback)]);
    }
    if !score.weak_topics.is_empty() {
        let topics: Vec<&str> = score.weak_topics.iter().map(String::as_str).collect();
        table.add_row(vec![Cell::new("Weak topics"), Cell::new(topics.join(", "))]);
    }
    if !score.recommended_review.is_empty() {
        table.add_row(vec![
            Cell::new("Recommended review"),
            Cell::new(score.recommended_review.join("\n")),
        ]);
    }
    table
}
