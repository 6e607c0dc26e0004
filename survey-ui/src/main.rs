use std::path::PathBuf;

use clap::Parser;
use tokio::io::BufReader;
use tracing::{debug, info, warn};

use survey_ui::{config::AppConfig, console::Console, logging};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Insurance survey report form, driven from the terminal.
///
/// Reads commands from stdin, keeps an in-memory autosave snapshot, and
/// submits the finished report through a simulated transport.
#[derive(Debug, Parser)]
struct Cli {
    /// TOML file with autosave, submit and logging settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `warn,survey_core=trace`.
    /// Takes precedence over the config file and `RUST_LOG`.
    #[arg(long)]
    log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_default_logging();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            AppConfig::load(path)?
        }
        None => AppConfig::default(),
    };

    if let Some(level) = cli.log_level.as_deref().or(config.log_level.as_deref()) {
        logging::set_log_level(level)?;
    }
    if let Some(path) = cli.log_file.as_ref().or(config.log_file.as_ref()) {
        if let Err(error) = logging::enable_file_logging(path) {
            warn!(%error, "file logging disabled");
        }
    }

    info!(
        autosave_secs = config.autosave_interval_secs,
        submit_delay_ms = config.submit_delay_ms,
        "starting survey report console"
    );

    let mut console = Console::new(&config);
    let mut stdout = std::io::stdout();
    console
        .run(BufReader::new(tokio::io::stdin()), &mut stdout)
        .await?;

    info!(state = %console.controller().state(), "survey report console closed");
    Ok(())
}
