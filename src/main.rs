use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use clap::{ArgAction, Args, Parser, Subcommand};
use serde_json::Value;
use sortvision::leaderboard::{self, BrowserNavigator, Difficulty, LeaderboardError, LeaderboardRow};
use sortvision::llm::config::DEFAULT_BASE_URL;
use sortvision::llm::{AssistantConfig, AssistantError, ContextSnapshot, ProxyClient};
use sortvision::services::chat::{ChatPanel, SendOutcome};
use sortvision::services::history::{HistoryError, HistoryRecord, HistoryStore, JsonlHistory, MemoryHistory};
use sortvision::services::reveal::{RevealConfig, RevealOutcome, RevealSink, Revealer, TypingSound};
use sortvision::services::session::{AssistantSession, ContextAccessor};
use sortvision::state::{ChatState, DisplayRole};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("assistant setup failed: {0}")]
    Assistant(#[from] AssistantError),
    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error("io failed: {0}")]
    Io(#[from] io::Error),
    #[error("invalid --open value '{0}' (expected RANK:DIFFICULTY, e.g. 1:beginner)")]
    InvalidOpen(String),
    #[error("rank {0} is not on the leaderboard")]
    RankOutOfRange(usize),
    #[error("invalid array element '{0}' (expected integers separated by commas)")]
    InvalidArray(String),
    #[error("invalid step '{0}'")]
    InvalidStep(String),
}

#[derive(Parser, Debug)]
#[command(name = "sortvision", about = "SortVision sorting assistant and contributor leaderboard")]
struct Cli {
    #[arg(long, env = "ASSISTANT_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chat with the sorting assistant.
    Chat(ChatArgs),
    /// Render contributor leaderboard rows.
    Leaderboard(LeaderboardArgs),
}

#[derive(Args, Debug)]
struct ChatArgs {
    #[arg(long)]
    algorithm: Option<String>,

    #[arg(long)]
    step: Option<u64>,

    /// Current array, e.g. `5,3,8`.
    #[arg(long)]
    array: Option<String>,

    /// Append completed exchanges to this JSON lines file.
    #[arg(long, env = "SORTVISION_HISTORY")]
    history: Option<PathBuf>,

    /// Ring the terminal bell while replies are revealed.
    #[arg(long, env = "REVEAL_AUDIO")]
    audio: bool,
}

#[derive(Args, Debug)]
struct LeaderboardArgs {
    /// JSON array of participants.
    file: PathBuf,

    /// Emit HTML table rows instead of a text table.
    #[arg(long)]
    html: bool,

    /// Open one issue search, e.g. `1:advanced`.
    #[arg(long)]
    open: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Chat(args) => run_chat(&cli.base_url, args).await,
        Command::Leaderboard(args) => run_leaderboard(args),
    }
}

// =============================================================================
// CHAT
// =============================================================================

/// Prints each revealed unit while keeping the display state current.
struct TerminalSink {
    state: ChatState,
}

impl RevealSink for TerminalSink {
    fn on_unit(&self, unit: &str) {
        self.state.on_unit(unit);
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(unit.as_bytes());
        let _ = stdout.flush();
    }
}

struct TerminalBell;

impl TypingSound for TerminalBell {
    fn play(&self) {
        let mut stderr = io::stderr().lock();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}

enum HistoryBackend {
    Memory(Arc<MemoryHistory>),
    File(Arc<JsonlHistory>),
}

impl HistoryBackend {
    fn store(&self) -> Arc<dyn HistoryStore> {
        match self {
            Self::Memory(h) => Arc::clone(h) as Arc<dyn HistoryStore>,
            Self::File(h) => Arc::clone(h) as Arc<dyn HistoryStore>,
        }
    }

    fn records(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        match self {
            Self::Memory(h) => Ok(h.records()),
            Self::File(h) => h.load(),
        }
    }
}

async fn run_chat(base_url: &str, args: ChatArgs) -> Result<(), CliError> {
    let config = AssistantConfig {
        base_url: base_url.trim_end_matches('/').to_string(),
        ..AssistantConfig::from_env()?
    };
    let client = Arc::new(ProxyClient::new(&config)?);
    tracing::info!(endpoint = client.endpoint(), "assistant client initialized");

    let host_context = Arc::new(Mutex::new(ContextSnapshot {
        algorithm: args.algorithm,
        step: args.step.map(Value::from),
        array: args.array.as_deref().map(parse_array).transpose()?.map(Value::from),
    }));
    let accessor: ContextAccessor = {
        let host_context = Arc::clone(&host_context);
        Arc::new(move || host_context.lock().unwrap_or_else(PoisonError::into_inner).clone())
    };

    let history = match args.history {
        Some(path) => HistoryBackend::File(Arc::new(JsonlHistory::new(path))),
        None => HistoryBackend::Memory(Arc::new(MemoryHistory::new())),
    };

    let mut reveal_config = RevealConfig::from_env();
    reveal_config.audio_enabled |= args.audio;

    let state = ChatState::new();
    let revealer = Revealer::new(
        reveal_config,
        Arc::new(TerminalSink { state: state.clone() }),
        Arc::new(TerminalBell),
        history.store(),
    );
    let session = Arc::new(AssistantSession::new(client, Some(accessor)));
    let panel = ChatPanel::new(session, revealer, state);

    println!("SortBot: ask me anything about sorting algorithms. /help for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        if let Some(command) = line.strip_prefix('/') {
            match run_command(command, &host_context, &history) {
                Ok(true) => continue,
                Ok(false) => break,
                Err(e) => {
                    println!("{}: {e}", DisplayRole::Error.label());
                    continue;
                }
            }
        }

        let outcome = panel.handle_send(line).await;
        if let Some(label) = reply_label(&outcome) {
            print!("{label}: ");
            io::stdout().flush()?;
        }
        match outcome {
            SendOutcome::Ignored => {}
            SendOutcome::Revealing(handle) => {
                tokio::select! {
                    outcome = handle.finished() => {
                        if outcome == RevealOutcome::Cancelled {
                            print!(" [interrupted]");
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        panel.close();
                        print!(" [interrupted]");
                    }
                }
                println!();
            }
            SendOutcome::Failed(kind) => {
                tracing::debug!(%kind, "chat: send failed");
                let message = panel.state().last().map(|m| m.content).unwrap_or_default();
                println!("{}: {message}", DisplayRole::Error.label());
            }
        }
    }

    panel.close();
    Ok(())
}

/// Label printed ahead of revealed text; failures and blank input get none.
fn reply_label(outcome: &SendOutcome) -> Option<&'static str> {
    match outcome {
        SendOutcome::Revealing(_) => Some(DisplayRole::Model.label()),
        SendOutcome::Ignored | SendOutcome::Failed(_) => None,
    }
}

/// Returns `Ok(false)` when the chat should end.
fn run_command(command: &str, host_context: &Mutex<ContextSnapshot>, history: &HistoryBackend) -> Result<bool, CliError> {
    let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
    let rest = rest.trim();
    let mut ctx = host_context.lock().unwrap_or_else(PoisonError::into_inner);

    match name {
        "quit" | "exit" => return Ok(false),
        "algorithm" => ctx.algorithm = (!rest.is_empty()).then(|| rest.to_string()),
        "step" => {
            ctx.step = if rest.is_empty() {
                None
            } else {
                Some(Value::from(rest.parse::<u64>().map_err(|_| CliError::InvalidStep(rest.to_string()))?))
            };
        }
        "array" => ctx.array = if rest.is_empty() { None } else { Some(Value::from(parse_array(rest)?)) },
        "context" => {
            println!("Algorithm: {}", ctx.algorithm_text());
            println!("Step: {}", ctx.step_text());
            println!("Array: [{}]", ctx.array_text());
        }
        "history" => {
            for record in history.records()? {
                println!("{}: {}", DisplayRole::User.label(), record.question);
                println!("{}: {}", DisplayRole::Model.label(), record.answer);
            }
        }
        _ => {
            println!("/algorithm NAME  /step N  /array a,b,c  /context  /history  /quit");
        }
    }
    Ok(true)
}

fn parse_array(raw: &str) -> Result<Vec<i64>, CliError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().map_err(|_| CliError::InvalidArray(s.to_string())))
        .collect()
}

// =============================================================================
// LEADERBOARD
// =============================================================================

fn run_leaderboard(args: LeaderboardArgs) -> Result<(), CliError> {
    let json = std::fs::read_to_string(&args.file)?;
    let participants = leaderboard::parse_participants(&json)?;
    let rows = leaderboard::rows(&participants);

    if args.html {
        for row in &rows {
            println!("{}", row.render_html());
        }
    } else {
        print!("{}", leaderboard::render_text(&rows));
    }

    if let Some(target) = args.open {
        let (rank, difficulty) = parse_open(&target)?;
        let row: &LeaderboardRow<'_> = rank
            .checked_sub(1)
            .and_then(|index| rows.get(index))
            .ok_or(CliError::RankOutOfRange(rank))?;
        row.click(difficulty, &BrowserNavigator)?;
        println!("opened {}", row.issue_url(difficulty));
    }
    Ok(())
}

fn parse_open(target: &str) -> Result<(usize, Difficulty), CliError> {
    let invalid = || CliError::InvalidOpen(target.to_string());
    let (rank, difficulty) = target.split_once(':').ok_or_else(invalid)?;
    let rank = rank.trim().parse::<usize>().map_err(|_| invalid())?;
    let difficulty = difficulty.trim().parse::<Difficulty>().map_err(|_| invalid())?;
    Ok((rank, difficulty))
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
