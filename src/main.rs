//! Git pre-commit hook that asks Claude to review staged changes
//!
//! Install by copying or linking the binary to `.git/hooks/pre-commit` and
//! placing a `.env` file with `CLAUDE_API_KEY=...` beside it.
//!
//! Git runs the hook with stdin redirected, so the confirmation question is
//! asked on the controlling terminal when there is one.

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use claude_review::{
    claude::ClaudeClient,
    config::{CONFIG_FILE_NAME, ENV_FILE_NAME, Settings, program_dir},
    gate::Gate,
    git::GitRepo,
    hook,
    output::ReviewReport,
    terminal,
};

/// Environment variable holding the log filter
const LOG_ENV: &str = "CLAUDE_REVIEW_LOG";

/// Command-line arguments
#[derive(Parser)]
#[command(name = "claude_review")]
#[command(about = "Review staged changes with Claude before committing", long_about = None)]
struct Args {
    /// Print a JSON report instead of the transcript (never prompts)
    #[arg(long)]
    json: bool,

    /// Settings file holding CLAUDE_API_KEY [default: .env beside the executable]
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Tunables file in TOML format [default: claude-review.toml beside the executable, if present]
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Main flow
///
/// # Process flow
///
/// 1. Load settings (fails before any git or network access)
/// 2. Locate the repository
/// 3. Build the review client and the decision gate
/// 4. Run the pipeline and map the outcome to an exit status
async fn run(args: Args) -> Result<u8> {
    let (env_file, config_file) = settings_paths(&args)?;
    let settings = Settings::load(&env_file, config_file.as_deref())?;

    let repo = GitRepo::discover().context("Error finding git root")?;
    let client = ClaudeClient::new(&settings)?;

    let secs = settings.review.prompt_timeout_secs;
    let timeout = (secs > 0).then(|| Duration::from_secs(secs));
    let confirmation = terminal::confirmation(args.json, timeout, settings.review.unattended);
    let gate = Gate::new(confirmation, settings.review.honor_confirmation);

    if args.json {
        let outcome = hook::run(&settings, &repo, &client, gate, &mut io::sink()).await?;
        let report = ReviewReport::from(&outcome);
        println!("{}", serde_json::to_string(&report)?);
        Ok(report.exit_code)
    } else {
        let outcome = hook::run(&settings, &repo, &client, gate, &mut io::stdout()).await?;
        Ok(outcome.exit_code())
    }
}

/// Resolve the settings and tunables paths
///
/// An explicit `--config` must exist; the default tunables file is optional.
fn settings_paths(args: &Args) -> Result<(PathBuf, Option<PathBuf>)> {
    let env_file = match &args.env_file {
        Some(path) => path.clone(),
        None => program_dir()?.join(ENV_FILE_NAME),
    };

    let config_file = match &args.config {
        Some(path) => Some(path.clone()),
        None => Some(program_dir()?.join(CONFIG_FILE_NAME)).filter(|path| path.is_file()),
    };

    Ok((env_file, config_file))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
