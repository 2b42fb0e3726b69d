//! Arrogance Admin - Firebase project dashboard
//!
//! The main entry point for arr-core, handling:
//! - The interactive users/routines dashboard (default)
//! - Credential pre-flight check
//! - Signal-driven shutdown that releases the gateway

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use arr_common::{
    format_error_human, CredentialPaths, CredentialResolver, LoadedCredentials, StructuredError,
};
use arr_core::exit_codes::ExitCode;
use arr_core::gateway::{FirebaseGateway, Gateway, MemoryGateway};
use arr_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use arr_core::tui::{run_ftui, App, SessionOutcome, Theme};
use clap::{Args, Parser, Subcommand};
use ftui::ProgramConfig;

/// How long the signal handler waits for the gateway to close.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Arrogance Admin - Inspect Firebase Authentication users and Firestore routines
#[derive(Parser)]
#[command(name = "arr-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to the Firebase service account key
    #[arg(long, global = true, value_name = "PATH")]
    service_account: Option<PathBuf>,

    /// Use built-in sample data instead of Firebase
    #[arg(long, global = true)]
    demo: bool,

    /// Render inline at the bottom of the terminal with this many rows
    #[arg(long, global = true, value_name = "ROWS")]
    inline: Option<u16>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the dashboard (default)
    Run,

    /// Resolve and validate the service account file
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env(cli.global.log_level, cli.global.log_format);
    if let Some(ref path) = cli.global.log_file {
        log_config = log_config.with_file(path);
    }
    let interactive = !matches!(cli.command, Some(Commands::Check(_)));
    if interactive {
        log_config = log_config.ensure_file();
    }
    if let Err(err) = init_logging(&log_config) {
        eprintln!("arr-core: logging disabled: {}", err);
    }

    let exit_code = match cli.command {
        None | Some(Commands::Run) => run_interactive(&cli.global),
        Some(Commands::Check(ref args)) => run_check(&cli.global, args),
    };

    tracing::debug!(exit_code = %exit_code, "exiting");
    std::process::exit(exit_code.as_i32());
}

fn resolver(global: &GlobalOpts) -> CredentialResolver {
    CredentialResolver::new(CredentialPaths {
        service_account: global.service_account.clone(),
        working_dir: None,
    })
}

fn build_gateway(global: &GlobalOpts) -> Arc<dyn Gateway> {
    if global.demo {
        Arc::new(MemoryGateway::demo())
    } else {
        Arc::new(FirebaseGateway::new(resolver(global)))
    }
}

/// Close the gateway from a helper thread, waiting at most [`SHUTDOWN_GRACE`].
fn close_with_timeout(gateway: Arc<dyn Gateway>) {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(gateway.close());
    });
    match rx.recv_timeout(SHUTDOWN_GRACE) {
        Ok(Ok(())) => tracing::info!("gateway closed"),
        Ok(Err(err)) => tracing::warn!(error = %err, "gateway close failed"),
        Err(_) => tracing::warn!("gateway close timed out"),
    }
}

/// Exit code for a signal-driven shutdown: a failed startup still reports 1.
fn signal_exit_code(outcome: &SessionOutcome) -> ExitCode {
    outcome.exit_code()
}

/// Undo what the TUI program did to the terminal when it is torn down
/// without running its own cleanup.
fn restore_terminal(inline: bool) {
    let _ = crossterm::terminal::disable_raw_mode();
    let mut stdout = std::io::stdout();
    if !inline {
        let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    }
    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
}

fn install_signal_handler(gateway: Arc<dyn Gateway>, outcome: SessionOutcome, inline: bool) {
    if let Err(err) = ctrlc::set_handler(move || {
        let code = signal_exit_code(&outcome);
        tracing::info!(exit_code = %code, "shutdown signal received");
        close_with_timeout(Arc::clone(&gateway));
        restore_terminal(inline);
        std::process::exit(code.as_i32());
    }) {
        tracing::error!(error = %err, "failed to set signal handler");
    }
}

fn run_interactive(global: &GlobalOpts) -> ExitCode {
    let gateway = build_gateway(global);
    let app = App::new(Arc::clone(&gateway)).with_theme(Theme::from_env());
    let outcome = app.outcome();
    install_signal_handler(
        Arc::clone(&gateway),
        outcome.clone(),
        global.inline.is_some(),
    );
    let config = match global.inline {
        Some(rows) => ProgramConfig::inline(rows),
        None => ProgramConfig::fullscreen(),
    };

    tracing::info!(
        target: "tui.startup",
        gateway = gateway.name(),
        inline = ?global.inline,
        "starting dashboard"
    );

    let result = run_ftui(app, config);
    close_with_timeout(gateway);

    match result {
        Ok(()) => outcome.exit_code(),
        Err(err) => {
            tracing::error!(error = %err, "dashboard failed");
            eprintln!("arr-core: {}", err);
            ExitCode::StartupError
        }
    }
}

fn run_check(global: &GlobalOpts, args: &CheckArgs) -> ExitCode {
    match resolver(global).load() {
        Ok(loaded) => {
            tracing::info!(
                path = %loaded.source.path.display(),
                resolution = %loaded.source.resolution,
                project_id = %loaded.account.project_id,
                "service account valid"
            );
            print_check_ok(&loaded, args.json);
            ExitCode::Clean
        }
        Err(err) => {
            tracing::warn!(code = err.code(), error = %err, "service account check failed");
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "status": "error",
                        "error": StructuredError::from(&err),
                    })
                );
            } else {
                eprintln!(
                    "{}",
                    format_error_human(&err, std::io::stderr().is_terminal())
                );
            }
            ExitCode::StartupError
        }
    }
}

fn print_check_ok(loaded: &LoadedCredentials, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "path": loaded.source.path.display().to_string(),
                "resolution": loaded.source.resolution.to_string(),
                "project_id": loaded.account.project_id,
                "client_email": loaded.account.client_email,
            })
        );
    } else {
        println!("Service account: {}", loaded.source.path.display());
        println!("  Resolved via: {}", loaded.source.resolution);
        println!("  Project:      {}", loaded.account.project_id);
        println!("  Client email: {}", loaded.account.client_email);
    }
}
