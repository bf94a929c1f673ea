//! Coinflip CLI
//!
//! Usage:
//!   coinflip                                  # Interactive coin (type 'help')
//!   coinflip --flip                           # One flip, print result
//!   coinflip --flip --mode custom --label-a Pizza --label-b Sushi
//!   coinflip --history                        # Last 10 flips
//!   coinflip --clear-history
//!   coinflip --motion-script shake.csv        # Replay accelerometer samples

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use coinflip::core::{
    CoinConfig, FileStore, FlipCoordinator, FlipResult, Haptics, HistoryLog, IntentParser,
    IntentResponse, KeyValueStore, MemoryStore, MotionListener, MotionSource, NoHaptics,
    ScriptedMotion, TerminalBell, UnavailableMotion, HELP,
};
use coinflip::types::{CoinMode, DisplayState, Dispatch, FlipState, HistoryEntry, Side};
use coinflip::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "coinflip",
    version = VERSION,
    about = "Coinflip - a virtual coin to settle small decisions",
    long_about = "Coinflip flips a virtual coin.\n\n\
                  Faces:\n  \
                  standard  Heads / Tails\n  \
                  custom    your own labels for side A and side B\n\n\
                  Every flip takes 3.2 seconds; taps during a flip are ignored.\n\
                  The last 10 results are kept in the data directory."
)]
struct Args {
    /// Flip once, print the result and exit
    #[arg(short, long)]
    flip: bool,

    /// Print flip history and exit
    #[arg(long)]
    history: bool,

    /// Clear flip history
    #[arg(long)]
    clear_history: bool,

    /// Coin faces: standard or custom
    #[arg(short, long)]
    mode: Option<CoinMode>,

    /// Custom label for side A
    #[arg(long)]
    label_a: Option<String>,

    /// Custom label for side B
    #[arg(long)]
    label_b: Option<String>,

    /// Directory for the history file (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep history in memory only
    #[arg(long)]
    memory: bool,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replay accelerometer samples from a file (CSV x,y,z or JSON lines)
    #[arg(long)]
    motion_script: Option<PathBuf>,

    /// Ring the terminal bell when a flip settles
    #[arg(long)]
    bell: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.no_color {
        colored::control::set_override(false);
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let coordinator = build_coordinator(&args, &config);

    if args.clear_history {
        let ok = coordinator.clear_history();
        print_response(&IntentResponse::HistoryCleared { ok }, &args);
        if !args.flip && !args.history {
            return;
        }
    }

    if args.history {
        print_history(&coordinator.open_history(), &args);
    } else if args.flip {
        run_single(&coordinator, &args).await;
    } else {
        run_interactive(coordinator, &config, &args).await;
    }
}

/// Logs go to stderr; RUST_LOG wins over --verbose
fn init_logging(verbose: bool) {
    let default = if verbose { "coinflip=debug" } else { "coinflip=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(args: &Args) -> Result<CoinConfig, coinflip::types::ConfigError> {
    let mut config = match &args.config {
        Some(path) => CoinConfig::load(path)?,
        None => CoinConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.history.data_dir = dir.clone();
    }
    Ok(config)
}

fn build_coordinator(args: &Args, config: &CoinConfig) -> FlipCoordinator {
    let store: Arc<dyn KeyValueStore> = if args.memory {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(FileStore::new(&config.history.data_dir))
    };
    let haptics: Arc<dyn Haptics> = if args.bell {
        Arc::new(TerminalBell)
    } else {
        Arc::new(NoHaptics)
    };

    let mut builder = FlipCoordinator::builder(HistoryLog::new(store))
        .haptics(haptics)
        .timing(config.flip);
    if let Some(mode) = args.mode {
        builder = builder.mode(mode);
    }
    if let Some(text) = &args.label_a {
        builder = builder.label(Side::A, text);
    }
    if let Some(text) = &args.label_b {
        builder = builder.label(Side::B, text);
    }
    builder.build()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}

/// Flip once and print the result
async fn run_single(coordinator: &FlipCoordinator, args: &Args) {
    if !args.json {
        println!("{}", "flipping...".yellow());
    }
    let result = coordinator.flip().await;

    if args.json {
        println!("{}", to_json(&result));
        return;
    }
    match result {
        FlipResult::Settled(record) => {
            println!("{}", record.entry.label.green().bold());
            if !record.saved {
                println!("{}", "  (not saved to history)".dimmed());
            }
        }
        FlipResult::Ignored => println!("{}", "flip already in progress".dimmed()),
        FlipResult::FailSafe => println!("{}", "flip failed, try again".red()),
    }
}

/// Interactive surface: stdin intents in, state changes out
async fn run_interactive(coordinator: FlipCoordinator, config: &CoinConfig, args: &Args) {
    print_header(args);

    let source: Box<dyn MotionSource> = match &args.motion_script {
        Some(path) => match ScriptedMotion::from_file(path) {
            Ok(source) => Box::new(source),
            Err(e) => {
                eprintln!("{}", format!("motion script ignored: {}", e).yellow());
                Box::new(UnavailableMotion)
            }
        },
        None => Box::new(UnavailableMotion),
    };
    let mut listener = MotionListener::activate(source, coordinator.clone(), config.motion);

    let renderer = tokio::spawn(render_states(coordinator.subscribe(), args.json));

    let parser = IntentParser::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "stdin_read_failed");
                break;
            }
        };

        let Some(intent) = parser.parse(&line) else {
            println!("{}", format!("unknown command '{}' (type 'help')", line.trim()).dimmed());
            continue;
        };

        let response = coordinator.dispatch(intent);
        if response == IntentResponse::Quit {
            break;
        }
        print_response(&response, args);
    }

    // a running flip always completes
    let mut states = coordinator.subscribe();
    let _ = states.wait_for(|s| !s.is_flipping()).await;

    listener.deactivate().await;

    // the renderer prints the last published state, then stops once every
    // coordinator handle (and with it the state sender) is gone
    drop(coordinator);
    if tokio::time::timeout(Duration::from_secs(1), renderer).await.is_err() {
        tracing::debug!("renderer_drain_timeout");
    }
    println!("\nBye. Flips this session are in history ('coinflip --history').");
}

/// Print every published state change
async fn render_states(mut states: watch::Receiver<FlipState>, json: bool) {
    while states.changed().await.is_ok() {
        let display = DisplayState::from_state(&states.borrow_and_update());
        if json {
            println!("{}", to_json(&display));
        } else {
            println!("{}", display.to_terminal_string());
        }
    }
}

fn print_response(response: &IntentResponse, args: &Args) {
    if args.json {
        println!("{}", to_json(response));
        return;
    }
    match response {
        IntentResponse::Dispatched { dispatch: Dispatch::Ignored(reason) } => {
            println!("{}", format!("  ({})", reason.description()).dimmed());
        }
        IntentResponse::Dispatched { dispatch: Dispatch::Accepted(_) } => {}
        IntentResponse::History { entries } => print_history(entries, args),
        IntentResponse::HistoryCleared { ok: true } => println!("History cleared."),
        IntentResponse::HistoryCleared { ok: false } => {
            println!("{}", "History could not be cleared.".red());
        }
        IntentResponse::Status { state } => println!("{}", state.to_terminal_string()),
        IntentResponse::Help => println!("{}", HELP),
        IntentResponse::Quit => {}
    }
}

fn print_history(entries: &[HistoryEntry], args: &Args) {
    if args.json {
        println!("{}", to_json(&entries));
        return;
    }
    if entries.is_empty() {
        println!("{}", "No flips yet.".dimmed());
        return;
    }
    println!("{}", "Recent flips (newest first):".bold());
    for (i, entry) in entries.iter().enumerate() {
        println!("{:>3}. {:<24} {}", i + 1, entry.label, entry.time_of_day().dimmed());
    }
}

fn print_header(args: &Args) {
    if args.json {
        return;
    }
    println!("{}", format!("Coinflip v{}", VERSION).bold());
    println!("Press Enter to flip. Type 'help' for commands, 'quit' to exit.");
    println!();
}
