use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use screenplay_reporter::config::{self, ENV_LOG};
use screenplay_reporter::session::{Session, cleanup_old_sessions, list_sessions};
use screenplay_reporter::stage::{ConsoleReporter, Cue, JsonReporter, Stage, SystemClock};
use screenplay_reporter::{LibtestBridge, Name, RunSummary, SceneReporter};

/// Screenplay Reporter - test runner events as screenplay domain events
#[derive(Parser, Debug)]
#[command(
    name = "screenplay-reporter",
    about = "Reports test runs as screenplay scenes",
    after_help = "ENVIRONMENT VARIABLES:\n\
        SCREENPLAY_REPORT_DIR     Base directory for report sessions\n\
        SCREENPLAY_RUNNER_NAME    Runner name announced with every scene\n\
        SCREENPLAY_CONSOLE        Log scene progress (true/false)\n\
        SCREENPLAY_LOG            Log filter directives (e.g. debug)"
)]
struct Args {
    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report a libtest JSON event stream (`cargo test -- -Z unstable-options --format json`)
    Bridge {
        /// File containing the event stream (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory for reports (default: new session in the report dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Remove the reports once the summary has been printed
        #[arg(long, conflicts_with = "output")]
        discard: bool,

        /// Runner name announced with every scene (default: SCREENPLAY_RUNNER_NAME or libtest)
        #[arg(long)]
        runner_name: Option<String>,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage report sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
}

#[derive(Subcommand, Debug)]
enum SessionsAction {
    /// List report sessions
    List,

    /// Remove report sessions older than the given age
    Clean {
        /// Maximum age in hours
        #[arg(long, default_value = "24")]
        max_age_hours: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.quiet);

    match args.command {
        Some(Commands::Bridge {
            input,
            output,
            discard,
            runner_name,
            json,
        }) => {
            let runner_name = runner_name.unwrap_or_else(config::runner_name);
            let session = match output {
                Some(dir) => Session::in_dir(dir),
                None => Session::with_name(&runner_name),
            }
            .keep(!discard)
            .with_runner(&runner_name);
            session.init()?;

            let reports = Arc::new(JsonReporter::new(&session.dir));
            let mut stage = Stage::new()?.assign(reports.clone());
            if config::console_enabled() && !json {
                stage = stage.assign(Arc::new(ConsoleReporter));
            }
            let stage = Arc::new(stage);

            let reporter = SceneReporter::on_stage(
                Arc::clone(&stage),
                Arc::new(SystemClock),
                Name::new(runner_name),
            );
            let bridge = LibtestBridge::new(reporter);

            let failures = match input {
                Some(path) => {
                    let file = tokio::fs::File::open(&path).await?;
                    bridge.run(BufReader::new(file)).await?
                }
                None => bridge.run(BufReader::new(tokio::io::stdin())).await?,
            };

            // run.json is written after the last cue.
            stage.wait_for_next_cue().await;

            let summary = reports.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
                if !discard {
                    println!("\nReports: {}", session.dir.display());
                }
            }

            info!(failures, "run reported");
            drop(session);
            if failures > 0 {
                std::process::exit(1);
            }
        }

        Some(Commands::Sessions { action }) => match action {
            SessionsAction::List => {
                for path in list_sessions()? {
                    println!("{}", path.display());
                }
            }
            SessionsAction::Clean { max_age_hours } => {
                let cleaned = cleanup_old_sessions(max_age(max_age_hours))?;
                println!("Removed {} session(s)", cleaned);
            }
        },

        None => {
            println!("Screenplay Reporter - test runner events as screenplay domain events");
            println!();
            println!("Usage: screenplay-reporter <COMMAND>");
            println!();
            println!("Commands:");
            println!("  bridge    Report a libtest JSON event stream");
            println!("  sessions  List or clean report sessions");
            println!();
            println!("Run with --help for more information.");
        }
    }

    Ok(())
}

fn init_tracing(quiet: bool) {
    let default_filter = if quiet { "warn" } else { config::DEFAULT_LOG_FILTER };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .try_init();
}

fn max_age(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(3600))
}

fn print_summary(summary: &RunSummary) {
    println!(
        "Run finished: {} scene(s), {} successful, {} failed, {} errors, {} skipped, {} ignored",
        summary.total,
        summary.successful,
        summary.failed,
        summary.errors,
        summary.skipped,
        summary.ignored
    );
    for report in &summary.reports {
        println!("  {}", report.display());
    }
}
