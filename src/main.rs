//! quill-tokenize - Tokenizes a file and prints the tokens as JSON.
//!
//! Usage: quill-tokenize [OPTIONS] <FILE> [LANGUAGE]
//!
//! Options:
//!   --version, -v        Show version
//!   --stats              Print cache statistics instead of tokens
//!   --commands <FILE>    Replay editing commands (one JSON object per line)
//!                        over the document before the final tokenize
//!
//! The language defaults to the file extension, then to the `language`
//! setting in ~/.quillrc. Use `-` as FILE to read stdin.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use quill::clock::SystemClock;
use quill::config::Config;
use quill::editor::EditSession;
use quill::editor::command::Command;
use quill::logging;
use quill::syntax::{Language, TokenizeResponse, TokenizeScheduler, TokenizeWorker};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "Usage: quill-tokenize [--stats] [--commands <FILE>] <FILE> [LANGUAGE]";

struct Args {
    stats_only: bool,
    commands: Option<String>,
    positional: Vec<String>,
}

fn parse_args(raw: &[String]) -> Option<Args> {
    let mut args = Args {
        stats_only: false,
        commands: None,
        positional: Vec::new(),
    };
    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--stats" => args.stats_only = true,
            "--commands" => args.commands = Some(iter.next()?.clone()),
            _ => args.positional.push(arg.clone()),
        }
    }
    Some(args)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let raw: Vec<String> = env::args().skip(1).collect();

    if raw.iter().any(|a| a == "--version" || a == "-v") {
        println!("quill-tokenize v{}", VERSION);
        return Ok(());
    }
    let Some(args) = parse_args(&raw) else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };
    let Some(file) = args.positional.first() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: could not load config: {}", e);
        Config::default()
    });
    if let Err(e) = logging::init(&config.log_config) {
        eprintln!("Warning: could not initialize logging: {}", e);
    }

    let content = if file.as_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(file)?
    };
    let commands = match &args.commands {
        Some(path) => read_commands(Path::new(path))?,
        None => Vec::new(),
    };
    let language = resolve_language(args.positional.get(1).map(String::as_str), file, &config);
    tracing::info!(file = %file, %language, commands = commands.len(), "tokenizing");

    let Some(response) = run(&config, &content, language, commands).await? else {
        eprintln!("Error: tokenize worker stopped unexpectedly");
        std::process::exit(1);
    };

    if args.stats_only {
        println!("{}", serde_json::to_string_pretty(&response.stats)?);
    } else {
        for token in &response.tokens {
            println!("{}", serde_json::to_string(token)?);
        }
    }
    Ok(())
}

/// Replays `commands` over a session while feeding edits through the
/// debounce scheduler, then waits for the response to the latest request.
async fn run(
    config: &Config,
    content: &str,
    language: Language,
    commands: Vec<Command>,
) -> Result<Option<TokenizeResponse>, Box<dyn std::error::Error>> {
    let clock = Arc::new(SystemClock);
    let mut session = EditSession::with_options(content, clock.clone(), config.session_options());
    let mut scheduler = TokenizeScheduler::new(config.tokenize_debounce(), clock);
    let mut worker = TokenizeWorker::spawn(language);

    worker.submit(scheduler.force(session.content(), language)).await?;
    for command in commands {
        let mutation = command.is_mutation();
        session.execute_command(command);
        if !mutation {
            continue;
        }
        if let Some(request) = scheduler.request(session.content(), language) {
            worker.submit(request).await?;
        }
    }

    if let Some(due) = scheduler.next_due() {
        tokio::time::sleep_until(tokio::time::Instant::from_std(due)).await;
        let request = match scheduler.poll() {
            Some(request) => request,
            None => scheduler.force(session.content(), language),
        };
        worker.submit(request).await?;
    }

    let mut latest = None;
    while let Some(response) = worker.recv().await {
        if let Some(response) = scheduler.accept(response) {
            latest = Some(response);
            break;
        }
    }
    tracing::debug!(id = scheduler.current_id(), version = session.version(), "replay done");
    worker.shutdown().await;
    Ok(latest)
}

fn read_commands(path: &Path) -> Result<Vec<Command>, Box<dyn std::error::Error>> {
    let mut commands = Vec::new();
    for line in fs::read_to_string(path)?.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        commands.push(serde_json::from_str(line)?);
    }
    Ok(commands)
}

fn resolve_language(explicit: Option<&str>, file: &str, config: &Config) -> Language {
    if let Some(id) = explicit {
        return Language::from_id(id);
    }
    Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(Language::from_extension)
        .filter(|&language| language != Language::PlainText)
        .unwrap_or(config.language)
}
