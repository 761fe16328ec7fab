use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
};
use std::io::{self, Write};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use wiki_quiz::config::AppConfig;
use wiki_quiz::generator::QuizGenerator;
use wiki_quiz::history::{format_created, load_history};
use wiki_quiz::store::KeyValueStore;
use wiki_quiz::{
    AnswerStatus, GenerateControl, Mode, QuizData, QuizRepository, QuizSession, Source,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StoreArg {
    Rest,
    File,
    Memory,
}

impl StoreArg {
    fn name(self) -> &'static str {
        match self {
            StoreArg::Rest => "rest",
            StoreArg::File => "file",
            StoreArg::Memory => "memory",
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Generate and take quizzes about Wikipedia articles", long_about = None)]
#[command(after_help = "ENVIRONMENT VARIABLES:
    WIKI_QUIZ_BACKEND_URL           Quiz generation service (placeholder quizzes if unset)
    WIKI_QUIZ_BACKEND_TIMEOUT_SECS  Generation request timeout [default: 30]
    WIKI_QUIZ_STORE                 rest | file | memory
    WIKI_QUIZ_STORE_URL             REST endpoint of the key/value table
    WIKI_QUIZ_STORE_KEY             API key for the REST store
    WIKI_QUIZ_STORE_TABLE           Table name [default: kv_store]
    WIKI_QUIZ_DATA_FILE             File store path [default: .wiki_quiz/quizzes.json]
    WIKI_QUIZ_KEY_PREFIX            Record key prefix [default: wiki_quiz_]
    RUST_LOG                        Log filter [default: info]

EXAMPLES:
    wiki-quiz generate en.wikipedia.org/wiki/Alan_Turing
    wiki-quiz generate https://en.wikipedia.org/wiki/Bletchley_Park --take
    wiki-quiz history
    wiki-quiz show 1718000000000 --take")]
struct Args {
    /// Override the configured store backend
    #[arg(long, value_enum, global = true)]
    store: Option<StoreArg>,

    /// Override the quiz generation service URL
    #[arg(long, global = true)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate (or load from cache) a quiz for a Wikipedia article
    Generate {
        url: String,
        /// Take the quiz interactively instead of showing the answers
        #[arg(long)]
        take: bool,
    },
    /// List previously generated quizzes, newest first
    History,
    /// Show a saved quiz
    Show {
        id: i64,
        #[arg(long)]
        take: bool,
    },
    /// Print the JSON schema expected from the generation service
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Schema => {
            let schema = schemars::schema_for!(wiki_quiz::QuizContent);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Command::Generate { url, take } => {
            let repo = open_repository(args.store, args.backend)?;
            let control = GenerateControl::new();
            println!("Generating...");
            let outcome = control.submit(&repo, &url).await?;
            match outcome.source {
                Source::Cache => println!("This quiz was loaded from cache. The URL has been processed before.\n"),
                Source::Unsaved => println!("Note: the quiz could not be saved and will not appear in history.\n"),
                Source::Generated => {}
            }
            present(&outcome.quiz, take)?;
        }
        Command::History => print_history(&open_repository(args.store, args.backend)?).await,
        Command::Show { id, take } => {
            let repo = open_repository(args.store, args.backend)?;
            match repo.get_quiz_by_id(id).await {
                Some(quiz) => present(&quiz, take)?,
                None => bail!("No quiz with id {id}"),
            }
        }
    }

    Ok(())
}

type Repository = QuizRepository<Box<dyn KeyValueStore>, Box<dyn QuizGenerator>>;

/// Load the environment configuration, apply command-line overrides and open
/// the store.
fn open_repository(store: Option<StoreArg>, backend: Option<String>) -> Result<Repository> {
    let mut config = AppConfig::from_env().context("Invalid configuration")?;
    if let Some(store) = store {
        config
            .select_store(store.name())
            .with_context(|| format!("Cannot use --store {}", store.name()))?;
    }
    if let Some(backend) = backend {
        config.backend_url = Some(backend);
    }

    let store = config.build_store().context("Failed to open quiz store")?;
    Ok(QuizRepository::new(store, config.build_generator()).with_prefix(config.key_prefix.clone()))
}

async fn print_history<S: KeyValueStore, G: QuizGenerator>(repo: &QuizRepository<S, G>) {
    let rows = load_history(repo).await;
    if rows.is_empty() {
        println!("No quizzes generated yet.");
        println!("Run `wiki-quiz generate <URL>` to create your first quiz.");
        return;
    }

    println!("{:<15} {:<32} {:>9}  {:<24} URL", "ID", "TITLE", "QUESTIONS", "CREATED");
    for row in rows {
        println!(
            "{:<15} {:<32} {:>9}  {:<24} {}",
            row.id,
            truncate(&row.title, 32),
            row.question_count,
            row.created,
            row.url_label
        );
        println!("{:<15} {}", "", row.summary_preview);
    }
}

fn present(quiz: &QuizData, take: bool) -> Result<()> {
    let mut session = QuizSession::new(quiz);
    if !take {
        render(&session);
        return Ok(());
    }

    session.set_mode(Mode::Take);
    loop {
        render_header(quiz);
        for (index, question) in quiz.questions().iter().enumerate() {
            println!("\nQuestion {} [{}]\n{}", index + 1, question.difficulty, question.question);
            for (i, option) in question.options.iter().enumerate() {
                println!("  {}) {}", letter(i), option);
            }
            if question.options.is_empty() {
                bail!("Question {} has no options to choose from", index + 1);
            }
            let choice = read_choice(question.options.len())?;
            session.select_answer(index, question.options[choice].clone())?;
        }

        let score = session.submit()?;
        render(&session);
        println!(
            "\nQuiz Complete! You scored {} out of {} ({}%)",
            score.correct,
            score.total,
            score.percentage()
        );

        if !confirm("Try again? (y/N): ")? {
            return Ok(());
        }
        session.reset()?;
    }
}

fn render_header(quiz: &QuizData) {
    println!("{}\n{}\n", quiz.title(), quiz.url());
    println!("{}\n", quiz.content.summary);
}

fn render(session: &QuizSession<'_>) {
    let quiz = session.quiz();
    render_header(quiz);
    if quiz.is_saved() {
        println!("Created: {}", format_created(quiz.created_at));
    }

    let entities = &quiz.content.key_entities;
    println!("People:        {}", entities.people.join(", "));
    println!("Organizations: {}", entities.organizations.join(", "));
    println!("Locations:     {}", entities.locations.join(", "));
    println!("Sections:      {}", quiz.content.sections.join(" | "));

    for (index, question) in quiz.questions().iter().enumerate() {
        println!("\nQuestion {} [{}]\n{}", index + 1, question.difficulty, question.question);
        for (i, option) in question.options.iter().enumerate() {
            let marker = match session.option_status(index, option) {
                AnswerStatus::Correct => "✓",
                AnswerStatus::IncorrectSelected => "✗",
                AnswerStatus::Neutral if session.answer_for(index) == Some(option.as_str()) => "•",
                AnswerStatus::Neutral => " ",
            };
            let canonical = if session.shows_canonical_answer() && *option == question.answer {
                "  (correct answer)"
            } else {
                ""
            };
            println!("  {marker} {}) {option}{canonical}", letter(i));
        }
        if session.shows_explanations() {
            println!("  Explanation: {}", question.explanation);
        }
    }

    println!("\nRelated topics: {}", quiz.content.related_topics.join(", "));
}

fn letter(index: usize) -> char {
    (b'a' + (index % 26) as u8) as char
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}

enum Key {
    Char(char),
    Interrupt,
    Other,
}

/// Read an option letter, trying single keystrokes first and falling back to
/// line input when the terminal cannot enter raw mode.
fn read_choice(option_count: usize) -> Result<usize> {
    loop {
        print!("Your answer: ");
        io::stdout().flush()?;

        let input = match read_single_key() {
            Ok(Key::Char(c)) => {
                println!("{c}");
                c.to_string()
            }
            Ok(Key::Interrupt) => bail!("Quiz aborted"),
            Ok(Key::Other) => continue,
            Err(_) => {
                let mut line = String::new();
                if io::stdin().read_line(&mut line)? == 0 {
                    bail!("Input closed before the quiz was finished");
                }
                line.trim().to_string()
            }
        };

        if let Some(choice) = parse_choice(&input, option_count) {
            return Ok(choice);
        }
        println!("Please pick one of a-{}.", letter(option_count.saturating_sub(1)));
    }
}

fn parse_choice(input: &str, option_count: usize) -> Option<usize> {
    let c = input.chars().next()?.to_ascii_lowercase();
    let index = match c {
        'a'..='z' => (c as u8 - b'a') as usize,
        '1'..='9' => (c as u8 - b'1') as usize,
        _ => return None,
    };
    (index < option_count).then_some(index)
}

fn read_single_key() -> io::Result<Key> {
    terminal::enable_raw_mode()?;

    let result = match event::poll(Duration::from_secs(300)) {
        Ok(true) => event::read().map(|event| match event {
            Event::Key(KeyEvent { code: KeyCode::Char('c'), modifiers, .. })
                if modifiers.contains(KeyModifiers::CONTROL) =>
            {
                Key::Interrupt
            }
            Event::Key(KeyEvent { code: KeyCode::Esc, .. }) => Key::Interrupt,
            Event::Key(KeyEvent { code: KeyCode::Char(c), kind: KeyEventKind::Press, .. }) => Key::Char(c),
            _ => Key::Other,
        }),
        Ok(false) => Ok(Key::Other),
        Err(e) => Err(e),
    };

    terminal::disable_raw_mode()?;
    result
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;

    if let Ok(key) = read_single_key() {
        let yes = matches!(key, Key::Char('y' | 'Y'));
        println!("{}", if yes { "y" } else { "n" });
        return Ok(yes);
    }

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_accept_letters_and_digits() {
        assert_eq!(parse_choice("b", 4), Some(1));
        assert_eq!(parse_choice("D", 4), Some(3));
        assert_eq!(parse_choice("1", 4), Some(0));
        assert_eq!(parse_choice("e", 4), None);
        assert_eq!(parse_choice("", 4), None);
    }

    #[test]
    fn store_flag_names_resolve_against_loaded_settings() {
        let mut config = AppConfig::from_lookup(|name| match name {
            "WIKI_QUIZ_STORE_URL" => Some("http://db".to_string()),
            "WIKI_QUIZ_DATA_FILE" => Some("/x.json".to_string()),
            _ => None,
        })
        .unwrap();
        for arg in StoreArg::value_variants() {
            config.select_store(arg.name()).unwrap();
        }
        config.select_store(StoreArg::File.name()).unwrap();
        assert_eq!(config.store.to_string(), "file (/x.json)");
    }

    #[test]
    fn schema_needs_no_store_flags() {
        let args = Args::try_parse_from(["wiki-quiz", "schema"]).unwrap();
        assert!(matches!(args.command, Command::Schema));
        assert!(args.store.is_none());

        let args = Args::try_parse_from(["wiki-quiz", "history", "--store", "memory"]).unwrap();
        assert!(matches!(args.store, Some(StoreArg::Memory)));
    }

    #[test]
    fn long_titles_are_truncated() {
        assert_eq!(truncate("Alan Turing", 32), "Alan Turing");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }
}
