//! Task Timer CLI - a persistent per-task stopwatch
//!
//! Each invocation reads the single timer session from the data directory,
//! applies one transition and exits. `watch` keeps a live display open and
//! `refresh` is run periodically by launchd to keep the notification current.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use tasktimer::cli::{Cli, Commands, Display, TaskArgs, TerminalNavigator};
use tasktimer::clock::{Clock, SystemClock};
use tasktimer::config::{self, TimerConfig};
use tasktimer::feedback::try_create_feedback;
use tasktimer::launchagent::{self, LaunchAgentError};
use tasktimer::ledger::{JsonlTaskLedger, TaskLedger, TimeEntry};
use tasktimer::notification::{
    create_gateway, DefaultGateway, NotificationGateway, NotificationRouter,
};
use tasktimer::refresh::{
    register_background_refresh, BackgroundRefresh, LaunchAgentScheduler, RefreshResult,
    RefreshScheduler,
};
use tasktimer::store::FileTimerStore;
use tasktimer::sync::{is_suspension_gap, AppState, ForegroundSync};
use tasktimer::timer::TimerEngine;
use tasktimer::types::StartOutcome;

type Engine = TimerEngine<FileTimerStore, DefaultGateway, SystemClock>;

/// How often the watch loop checks for notification taps and suspension.
const WATCH_HOUSEKEEPING: Duration = Duration::from_millis(250);

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        if let Some(hint) = e
            .downcast_ref::<LaunchAgentError>()
            .and_then(LaunchAgentError::suggestion)
        {
            Display::show_hint(hint);
        }
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

// ============================================================================
// Context
// ============================================================================

/// Resolved data directory and configuration for one invocation.
struct AppContext {
    data_dir: PathBuf,
    config: TimerConfig,
    notifications: bool,
}

impl AppContext {
    fn load(no_notify: bool) -> Result<Self> {
        let data_dir = config::data_dir()?;
        let config = TimerConfig::load(&data_dir)?;
        debug!("Data directory: {:?}", data_dir);
        Ok(Self {
            notifications: config.notifications && !no_notify,
            data_dir,
            config,
        })
    }

    async fn engine(&self) -> Engine {
        TimerEngine::new(
            FileTimerStore::in_dir(&self.data_dir),
            create_gateway(self.notifications).await,
            SystemClock,
        )
    }

    fn ledger(&self) -> JsonlTaskLedger {
        JsonlTaskLedger::in_dir(&self.data_dir)
    }

    fn scheduler(&self) -> Result<LaunchAgentScheduler> {
        Ok(LaunchAgentScheduler::for_current_exe(&self.data_dir)?)
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Executes the CLI command.
///
/// The data directory and configuration are only loaded by commands that
/// use them, so help and completions work without either.
async fn execute(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        // No command provided, show help
        Cli::command().print_help()?;
        return Ok(());
    };
    let no_notify = cli.no_notify;
    let context = || AppContext::load(no_notify);

    match command {
        Commands::Start(args) => {
            let ctx = context()?;
            let task = args.to_task_ref();
            let outcome = ctx.engine().await.start(task.clone()).await;
            Display::show_start(&task, &outcome);
            if outcome == StartOutcome::Failed {
                bail!("failed to save the timer session to {:?}", ctx.data_dir);
            }
        }
        Commands::Pause => {
            let ctx = context()?;
            Display::show_pause(ctx.engine().await.pause().await);
        }
        Commands::Resume => {
            let ctx = context()?;
            Display::show_resume(ctx.engine().await.resume().await);
        }
        Commands::Stop => {
            let entry = stop_and_record(&context()?).await;
            Display::show_stop(entry.as_ref());
        }
        Commands::Status => {
            let ctx = context()?;
            let snapshot = ctx.engine().await.snapshot().await;
            let job = if cfg!(target_os = "macos") {
                launchagent::get_status()
                    .map_err(|e| debug!("Refresh job status unavailable: {}", e))
                    .ok()
            } else {
                None
            };
            Display::show_status(snapshot.as_ref(), job.as_ref());
        }
        Commands::Watch(args) => {
            run_watch(&context()?, args).await?;
            // The runtime would otherwise wait on the blocking stdin read.
            std::process::exit(0);
        }
        Commands::Refresh => {
            let ctx = context()?;
            let refresh = BackgroundRefresh::new(
                FileTimerStore::in_dir(&ctx.data_dir),
                create_gateway(ctx.notifications).await,
                SystemClock,
            );
            let result = refresh.run_once().await;
            println!("{}", result);
            if result == RefreshResult::Failed {
                bail!("background refresh failed");
            }
        }
        Commands::Install => {
            let ctx = context()?;
            ctx.scheduler()?
                .register(ctx.config.refresh_interval())
                .context("failed to install the background refresh")?;
            Display::show_install_success(ctx.config.refresh_interval_secs);
        }
        Commands::Uninstall => {
            context()?
                .scheduler()?
                .unregister()
                .context("failed to uninstall the background refresh")?;
            Display::show_uninstall_success();
        }
        Commands::Entries { task_id } => {
            let mut entries = context()?.ledger().entries().await?;
            if let Some(task_id) = task_id {
                entries.retain(|e| e.task_id == task_id);
            }
            Display::show_entries(&entries);
        }
        Commands::Completions { shell } => generate_completions(shell),
    }

    Ok(())
}

/// Stops the timer and records the time against its task.
///
/// Returns `None` when no timer was active.
async fn stop_and_record(ctx: &AppContext) -> Option<TimeEntry> {
    let engine = ctx.engine().await;
    let snapshot = engine.snapshot().await?;
    let seconds = engine.stop().await;

    let entry = TimeEntry {
        task_id: snapshot.task.task_id,
        task_name: snapshot.task.task_name,
        project_id: snapshot.task.project_id,
        seconds,
        recorded_at: engine.clock().now_ms(),
    };
    record_entry(&ctx.ledger(), &entry).await;
    Some(entry)
}

async fn record_entry(ledger: &JsonlTaskLedger, entry: &TimeEntry) {
    if let Err(e) = ledger.record(entry).await {
        warn!("Failed to record time entry for task {}: {}", entry.task_id, e);
    }
}

// ============================================================================
// Watch
// ============================================================================

/// Runs the live display until the user quits.
///
/// The loop multiplexes the poll ticker, keyboard input, Ctrl-C and a
/// housekeeping tick that routes notification taps and detects suspension.
async fn run_watch(ctx: &AppContext, args: TaskArgs) -> Result<()> {
    let task = args.to_task_ref();

    match ctx.scheduler() {
        Ok(scheduler) => {
            register_background_refresh(&scheduler, ctx.config.refresh_interval());
        }
        Err(e) => warn!("Background refresh unavailable: {:#}", e),
    }

    let router = NotificationRouter::new(TerminalNavigator::new(task.task_id.clone()));
    let haptics = try_create_feedback(ctx.config.feedback);
    let ledger = ctx.ledger();
    let poll_interval = ctx.config.poll_interval();
    let mut sync = ForegroundSync::new(ctx.engine().await, haptics, task, poll_interval);

    Display::show_watch_help();
    Display::show_watch_line(sync.mount().await);

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut housekeeping = tokio::time::interval(WATCH_HOUSEKEEPING);
    let mut last_seen_ms = SystemClock.now_ms();
    // Housekeeping ticks are the gap samples, so the threshold never drops
    // below two of them.
    let gap_period = poll_interval.max(WATCH_HOUSEKEEPING);

    loop {
        tokio::select! {
            display = sync.next_tick() => {
                Display::show_watch_line(&display);
            }
            line = input.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    break;
                };
                match line.trim() {
                    "" => {
                        let outcome = sync.tap().await;
                        debug!("Tap: {:?}", outcome);
                    }
                    "s" => {
                        if let Some(entry) = sync.stop().await {
                            record_entry(&ledger, &entry).await;
                        }
                    }
                    "q" => break,
                    other => debug!("Ignoring input {:?}", other),
                }
                Display::show_watch_line(sync.display());
            }
            _ = housekeeping.tick() => {
                let now_ms = SystemClock.now_ms();
                if is_suspension_gap(last_seen_ms, now_ms, gap_period) {
                    debug!("Resumed after {}ms suspension", now_ms - last_seen_ms);
                    sync.on_app_state_change(AppState::Background).await;
                    sync.on_app_state_change(AppState::Active).await;
                    Display::show_watch_line(sync.display());
                }
                last_seen_ms = now_ms;

                while let Some(payload) = sync.engine().notifier().try_recv_tap() {
                    router.handle_tap(&payload);
                    sync.reconcile().await;
                    Display::show_watch_line(sync.display());
                }
            }
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    sync.unmount();
    println!();
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["tasktimer"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_start_with_options() {
        let cli = Cli::parse_from(["tasktimer", "start", "--task", "Test", "--project", "p"]);
        match cli.command {
            Some(Commands::Start(args)) => {
                assert_eq!(args.task, "Test");
                assert_eq!(args.project.as_deref(), Some("p"));
            }
            _ => panic!("Expected Start command"),
        }
    }

    #[test]
    fn test_cli_parse_verbose() {
        let cli = Cli::parse_from(["tasktimer", "--verbose", "status"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_fast_poll_gap_uses_housekeeping_floor() {
        let gap_period = Duration::from_millis(100).max(WATCH_HOUSEKEEPING);
        assert!(!is_suspension_gap(0, 250, gap_period));
        assert!(!is_suspension_gap(0, 500, gap_period));
        assert!(is_suspension_gap(0, 30_000, gap_period));
    }
}
