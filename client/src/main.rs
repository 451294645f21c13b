//! wordgrid - build a word grid one suggestion at a time.
//!
//! Usage:
//!   wordgrid init-config wordgrid.toml
//!   FIREWORKS_API_KEY=... wordgrid run --config wordgrid.toml --output grid.csv
//!   wordgrid run --offline --output -

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use wordgrid::{logging, render_grid, render_status, ClientConfig, FireworksProvider, GridSubmitter};
use wordgrid_core::{FetchOutcome, SessionController, SessionError, SessionState, StaticProvider, SuggestionProvider};

#[derive(Parser, Debug)]
#[command(name = "wordgrid", version)]
#[command(about = "Write a word grid with a language model suggesting the next word")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start an interactive session
    Run(RunArgs),

    /// Write a default configuration file
    InitConfig {
        /// Destination TOML file
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// TOML configuration (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the built-in word list instead of the remote model; never submits
    #[arg(long)]
    offline: bool,

    /// CSV destination, `-` for stdout
    #[arg(short, long, default_value = "wordgrid.csv")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose).context("failed to install logger")?;

    match cli.command {
        Command::Run(args) => run(args),
        Command::InitConfig { path, force } => init_config(&path, force),
    }
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    ClientConfig::default()
        .save_toml(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ClientConfig> {
    match path {
        Some(path) => ClientConfig::load_toml(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ClientConfig::default()),
    }
}

fn build_provider(config: &ClientConfig, offline: bool) -> anyhow::Result<Box<dyn SuggestionProvider>> {
    if offline {
        info!("offline mode: using built-in word list");
        return Ok(Box::new(StaticProvider::default()));
    }
    let provider = FireworksProvider::from_config(config).context("failed to build HTTP client")?;
    if !provider.has_api_key() {
        anyhow::bail!(
            "environment variable {} is not set (or run with --offline)",
            config.api_key_env
        );
    }
    Ok(Box::new(provider))
}

enum Input {
    Finish,
    Save,
    Retry,
    Choose(usize),
    Word(String),
    Unknown(String),
}

fn parse_input(line: &str, state: SessionState) -> Input {
    let input = line.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("q") {
        return Input::Finish;
    }
    if state == SessionState::Empty {
        return Input::Word(input.to_string());
    }
    match input {
        "s" | "S" => Input::Save,
        "r" | "R" => Input::Retry,
        _ => match input.parse::<usize>() {
            Ok(n @ 1..=3) => Input::Choose(n - 1),
            _ => Input::Unknown(input.to_string()),
        },
    }
}

fn is_stdout(output: &Path) -> bool {
    output == Path::new("-")
}

/// Grid, prompts and messages go to stderr when the CSV itself is streamed to stdout.
fn ui_writer(output: &Path) -> Box<dyn Write> {
    if is_stdout(output) {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    }
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let provider = build_provider(&config, args.offline)?;
    let mut session = SessionController::new(&config.session).context("invalid session settings")?;
    let mut ui = ui_writer(&args.output);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let view = session.view();
        writeln!(ui, "\n{}{}", render_grid(&view), render_status(&view))?;
        write!(ui, "> ")?;
        ui.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read input")?;

        let ticket = match parse_input(&line, session.state()) {
            Input::Finish => break,
            Input::Save => {
                save(&session, &args.output, ui.as_mut())?;
                continue;
            }
            Input::Unknown(text) => {
                writeln!(ui, "Unknown command '{}'. Use 1, 2, 3, r, s or q.", text)?;
                continue;
            }
            Input::Word(word) => session.submit_first_word(&word),
            Input::Retry => session.retry(),
            Input::Choose(rank) => session.choose_index(rank),
        };

        let result = ticket.and_then(|ticket| session.resolve(&ticket, provider.as_ref()));
        report(result, ui.as_mut())?;
    }

    finish(&session, &config, &args, ui.as_mut())
}

/// Print recoverable errors; a broken grid invariant ends the program.
fn report(result: Result<FetchOutcome, SessionError>, ui: &mut dyn Write) -> anyhow::Result<()> {
    match result {
        Ok(FetchOutcome::Applied { .. }) => {}
        Ok(FetchOutcome::Discarded) => writeln!(ui, "A late response was ignored.")?,
        Err(SessionError::InvariantViolation(err)) => {
            return Err(anyhow::Error::new(err).context("grid invariant violated"));
        }
        Err(err) if err.is_retryable() => writeln!(ui, "{}. Press r to retry.", err)?,
        Err(err) => writeln!(ui, "{}", err)?,
    }
    Ok(())
}

fn save(session: &SessionController, output: &Path, ui: &mut dyn Write) -> anyhow::Result<()> {
    let bytes = match session.finalize() {
        Ok(bytes) => bytes,
        Err(SessionError::InvalidInput(msg)) => {
            writeln!(ui, "{}", msg)?;
            return Ok(());
        }
        Err(err) => return Err(err).context("failed to export grid"),
    };

    if is_stdout(output) {
        let mut stdout = io::stdout().lock();
        stdout.write_all(&bytes)?;
        stdout.flush()?;
    } else {
        fs::write(output, &bytes).with_context(|| format!("failed to write {}", output.display()))?;
        info!(path = %output.display(), bytes = bytes.len(), "grid exported");
        writeln!(ui, "Saved grid to {}", output.display())?;
    }
    Ok(())
}

fn finish(
    session: &SessionController,
    config: &ClientConfig,
    args: &RunArgs,
    ui: &mut dyn Write,
) -> anyhow::Result<()> {
    if session.state() == SessionState::Empty {
        writeln!(ui, "Nothing placed; no grid written.")?;
        return Ok(());
    }
    save(session, &args.output, ui)?;

    if args.offline {
        return Ok(());
    }
    let Some(submitter) = GridSubmitter::from_config(config).context("failed to build HTTP client")? else {
        return Ok(());
    };
    match submitter.submit(&session.payload()) {
        Ok(()) => writeln!(ui, "Submitted grid to {}", submitter.url())?,
        // The CSV is already written
        Err(err) => warn!(error = %err, "grid submission failed"),
    }
    Ok(())
}
