//! Riskboard: credit-risk dashboard CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::{Builder, Env};
use riskboard::classifier::Classifier;
use riskboard::config::{load_config, write_default_config, CliOverrides, CONFIG_FILENAME};
use riskboard::controller::{CycleOutcome, UploadController};
use riskboard::render::{
    ConsoleDashboard, Dashboard, HtmlDashboard, JsonReporter, MemoryDashboard, Tee,
};
use riskboard::service::{HttpScoringService, ScoringService};
use riskboard::watcher::DatasetWatcher;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// The environment variable for configuring logging output.
static LOG_NAME: &str = "RISKBOARD_LOG";

/// The environment variable for configuring logging style.
static LOG_STYLE: &str = "RISKBOARD_LOG_STYLE";

/// Riskboard: upload financial statements and view the credit-risk assessment
#[derive(Parser, Debug)]
#[command(name = "riskboard")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Financial statement CSV to upload
    dataset: Option<PathBuf>,

    /// Scoring service base address
    #[arg(long, env = "RISKBOARD_BASE_URL", value_name = "URL")]
    base_url: Option<String>,

    /// Also write an HTML dashboard to FILE
    #[arg(long, value_name = "FILE")]
    html: Option<PathBuf>,

    /// Print a JSON snapshot of the dashboard instead of the terminal view
    #[arg(long, short)]
    json: bool,

    /// Disable terminal colors
    #[arg(long)]
    no_color: bool,

    /// Re-submit whenever the dataset changes
    #[arg(long, short)]
    watch: bool,

    /// Path to config file (default: search .riskboardrc.json in current dir and parents)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Debug-level diagnostics
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create .riskboardrc.json with the default settings
    Init {
        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Service address to put in the config
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn init_log(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env = Env::new()
        .filter_or(LOG_NAME, default)
        .write_style(LOG_STYLE);
    Builder::from_env(env).init();
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();
    init_log(args.verbose);

    if let Some(Commands::Init { dir, base_url }) = &args.command {
        return run_init(dir.as_deref(), base_url.as_deref());
    }

    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    // Config is searched from the dataset's directory; --config is relative to cwd
    let work_dir = args
        .dataset
        .as_deref()
        .and_then(Path::parent)
        .filter(|p| p.is_dir())
        .map(|p| cwd.join(p))
        .unwrap_or_else(|| cwd.clone());
    let custom_config = args.config.as_ref().map(|p| cwd.join(p));
    let config = load_config(&work_dir, custom_config.as_deref())?;

    let settings = config.effective(&CliOverrides {
        base_url: args.base_url.as_deref(),
        html: args.html.as_deref(),
        no_color: args.no_color,
    });
    if !settings.use_colors {
        colored::control::set_override(false);
    }
    log::debug!("scoring service at {}", settings.base_url);

    let service = HttpScoringService::new(&settings.base_url)?;
    let classifier = Classifier::with_tokens(&settings.recommendation_tokens);
    let html = settings.html.map(HtmlDashboard::new);
    let dataset = args.dataset.as_deref();

    if args.json {
        let dashboard = Tee::new(MemoryDashboard::new(), html);
        let mut controller =
            UploadController::new(service, dashboard, classifier, settings.messages);
        drive(&mut controller, dataset, args.watch, |controller, _| {
            println!(
                "{}",
                JsonReporter::new().pretty().report(controller.dashboard().first())
            );
        })
    } else {
        let console = if settings.use_colors {
            ConsoleDashboard::stdout()
        } else {
            ConsoleDashboard::stdout().without_colors()
        };
        let written_to = html.as_ref().map(|h| h.path().to_path_buf());
        let dashboard = Tee::new(console, html);
        let mut controller =
            UploadController::new(service, dashboard, classifier, settings.messages);
        drive(&mut controller, dataset, args.watch, |_, outcome| {
            if let (Some(path), true) = (&written_to, outcome.is_rendered()) {
                eprintln!("{}: Dashboard written to {}", "Info".blue(), path.display());
            }
        })
    }
}

/// Run the first cycle, then keep cycling on dataset changes in watch mode
fn drive<S, D>(
    controller: &mut UploadController<S, D>,
    dataset: Option<&Path>,
    watch: bool,
    mut after_cycle: impl FnMut(&UploadController<S, D>, &CycleOutcome),
) -> Result<ExitCode>
where
    S: ScoringService,
    D: Dashboard,
{
    let outcome = controller.submit(dataset);
    after_cycle(controller, &outcome);

    let dataset = match (watch, dataset, &outcome) {
        (true, Some(dataset), CycleOutcome::Rendered { .. } | CycleOutcome::Failed(_)) => dataset,
        _ => return Ok(exit_code(&outcome)),
    };

    let watcher = DatasetWatcher::watch(dataset).context("Failed to create file watcher")?;
    eprintln!(
        "{}: Watching {} for changes... (Ctrl+C to stop)",
        "Info".blue(),
        dataset.display()
    );

    while watcher.next_change() {
        let outcome = controller.submit(Some(dataset));
        after_cycle(controller, &outcome);
    }
    Ok(ExitCode::SUCCESS)
}

fn exit_code(outcome: &CycleOutcome) -> ExitCode {
    match outcome {
        CycleOutcome::Rendered { .. } => ExitCode::SUCCESS,
        CycleOutcome::Failed(_) => ExitCode::from(1),
        CycleOutcome::Blocked(_) => ExitCode::from(2),
    }
}

fn run_init(dir: Option<&Path>, base_url: Option<&str>) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let dir = dir.unwrap_or(&cwd);
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "{}: {} already exists; use --dir to write elsewhere or remove it first",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let path = write_default_config(dir, base_url)?;
    println!("{}: Created {}", "Done".green().bold(), path.display());
    Ok(ExitCode::SUCCESS)
}
