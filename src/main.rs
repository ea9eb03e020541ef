use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use wpcheck::asset::AssetPattern;
use wpcheck::cli::{Cli, Command};
use wpcheck::config::{Settings, WpcheckConfig};
use wpcheck::pins::{Pins, read_pin};
use wpcheck::registry::GitHubReleases;
use wpcheck::report::{run_confidence, run_exact};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle no-color flag
    if cli.no_color {
        colored::control::set_override(false);
    }

    init_tracing(cli.verbose);

    if cli.command == Some(Command::Version) {
        println!("wpcheck version {}", VERSION);
        return Ok(());
    }

    let settings = load_settings(&cli)?;

    // One blocking request; no need for a multi-threaded runtime
    let code = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(run(&cli, &settings))?;

    std::process::exit(code)
}

/// Logs go to stderr so stdout stays parseable
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let file_config = match &cli.config {
        Some(path) => Some(WpcheckConfig::load_from_path_with_error(path)?),
        None => {
            let cwd = std::env::current_dir()?;
            WpcheckConfig::discover(&cwd).map(|(config, path)| {
                debug!("Using config file {}", path.display());
                config
            })
        }
    };

    let settings = cli.settings(file_config);
    debug!("Resolved settings: {:?}", settings);
    Ok(settings)
}

async fn run(cli: &Cli, settings: &Settings) -> Result<i32> {
    let source = GitHubReleases::with_url(settings.url.clone())?;
    let pattern = AssetPattern::new(settings.arch);
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Some(Command::Py) => {
            let python = read_pin(&settings.python_file)?;
            run_confidence(&source, &python, &pattern, &mut stdout).await?;
            Ok(0)
        }
        Some(Command::Wp) | None => {
            let pins = Pins::load(&settings.python_file, &settings.winpython_file)?;
            let status = run_exact(&source, &pins, &pattern, &mut stdout).await?;
            if cli.verbose {
                eprintln!("{}", format!("Exit status: {:?}", status).cyan());
            }
            Ok(status.code())
        }
        Some(Command::Version) => Ok(0),
    }
}
