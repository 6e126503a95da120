//! mostrador CLI entry point: an interactive store assistant in the terminal.
//!
//! Usage:
//!   mostrador                          # Chat using ~/.config/mostrador/config.toml
//!   mostrador --rules                  # Rule-based tool detection
//!   mostrador --catalog items.csv      # Use another catalog
//!
//! Logs go to stderr and respect `RUST_LOG` (default `warn`).

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use mostrador_application::{ChatSession, SessionOptions, TurnOutcome};
use mostrador_core::catalog::Catalog;
use mostrador_infrastructure::config::normalize_host;
use mostrador_infrastructure::{AppConfig, DetectionMode, load_catalog};
use mostrador_interaction::OllamaApiAgent;

const EXIT_COMMAND: &str = "salir";

#[derive(Parser, Debug)]
#[command(name = "mostrador")]
#[command(about = "Asistente de tienda de ropa en la terminal")]
struct Args {
    /// Product catalog (CSV)
    #[arg(long, env = "MOSTRADOR_CATALOG")]
    catalog: Option<PathBuf>,

    /// Model name served by Ollama
    #[arg(long, env = "MODELO")]
    model: Option<String>,

    /// Ollama base URL
    #[arg(long, env = "OLLAMA_HOST")]
    host: Option<String>,

    /// Tool-call detection: model or rules
    #[arg(long, value_parser = parse_detection, conflicts_with = "rules")]
    detection: Option<DetectionMode>,

    /// Shortcut for --detection rules
    #[arg(long)]
    rules: bool,

    /// Config file (defaults to ~/.config/mostrador/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not print tool-call traces
    #[arg(long)]
    quiet: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_detection(value: &str) -> Result<DetectionMode, String> {
    value.parse().map_err(|e: mostrador_core::MostradorError| e.to_string())
}

impl Args {
    /// Command-line values take precedence over env, file and defaults.
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(catalog) = &self.catalog {
            config.catalog_path = catalog.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(host) = &self.host {
            config.ollama_host = normalize_host(host);
        }
        if let Some(detection) = self.detection {
            config.detection = detection;
        }
        if self.rules {
            config.detection = DetectionMode::Rules;
        }
        if self.quiet {
            config.show_tool_calls = false;
        }
    }
}

/// CLI helper for rustyline that completes and hints the exit command.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: vec![EXIT_COMMAND.to_string()],
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if line.is_empty() {
            return Ok((0, vec![]));
        }
        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.trim().eq_ignore_ascii_case(EXIT_COMMAND) {
            Owned(line.bright_yellow().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.len() < 2 {
            return None;
        }
        self.commands
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for CliHelper {}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", format!("Error: {e:?}").red());
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    // ===== Configuration =====
    let mut config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_to(&mut config);

    let catalog = match load_catalog(&config.catalog_path) {
        Ok(catalog) => catalog,
        Err(e) if config.allow_empty_catalog => {
            warn!(error = %e, "Starting with an empty catalog");
            Catalog::empty()
        }
        Err(e) => {
            eprintln!(
                "{}",
                format!(
                    "No se pudo cargar el catálogo {}: {}",
                    config.catalog_path.display(),
                    e
                )
                .red()
            );
            return Ok(ExitCode::FAILURE);
        }
    };

    // ===== Backend Initialization =====
    let mut agent = OllamaApiAgent::new(config.ollama_host.clone(), config.model.clone());
    if let Some(secs) = config.request_timeout_secs {
        agent = agent.with_timeout(Duration::from_secs(secs))?;
    }
    info!(host = agent.host(), model = %config.model, "Using Ollama backend");

    let mut session = ChatSession::new(
        Arc::new(catalog),
        Arc::new(agent),
        config.store.clone(),
        SessionOptions::from(&config),
    )?;

    // ===== REPL Setup =====
    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Mostrador ===".bright_magenta().bold());
    println!(
        "{}",
        format!("Iniciando chat. Escribí '{}' para terminar.", EXIT_COMMAND).bright_black()
    );
    println!();

    // ===== Main REPL Loop =====
    loop {
        match rl.readline("Tú: ") {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed.eq_ignore_ascii_case(EXIT_COMMAND) {
                    println!("{}", "¡Hasta luego!".bright_green());
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let outcome = session.process_turn(trimmed).await;
                print_outcome(&outcome, config.show_tool_calls);
            }
            Err(ReadlineError::Interrupted) => {
                println!(
                    "{}",
                    format!("CTRL-C detectado. Escribí '{}' para terminar.", EXIT_COMMAND).yellow()
                );
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "¡Hasta luego!".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_outcome(outcome: &TurnOutcome, show_tool_calls: bool) {
    if show_tool_calls {
        for call in &outcome.tool_calls {
            println!("{}", format!("🛠️ Tool: {}", call.summary()).bright_black());
        }
    }
    let mut lines = outcome.reply.lines();
    if let Some(first) = lines.next() {
        println!("{} {}", "Bot:".bright_blue().bold(), first);
    }
    for line in lines {
        println!("     {}", line);
    }
}
