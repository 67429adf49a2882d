mod event_loop;
mod keymap;
mod screenshot;
mod theme;
mod ui;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use pai_core::{Dashboard, SimSettings};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::{io, process::ExitCode};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pai-dashboard", version, about = "Live view of a simulated PAI agent fleet")]
struct Cli {
    /// Print one deterministic frame to stdout and exit.
    #[arg(long)]
    screenshot: bool,
    /// Seed for the simulation's random source.
    #[arg(long, env = "PAI_DASHBOARD_SEED")]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pai-dashboard: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = SimSettings::from_env().context("invalid simulation settings")?;

    if cli.screenshot {
        return screenshot::print(settings, cli.seed.unwrap_or(screenshot::DEFAULT_SEED));
    }

    let seed = cli.seed.unwrap_or_else(rand::random);
    info!(seed, tick_ms = settings.tick_interval.as_millis() as u64, "starting dashboard");
    let mut dash = Dashboard::new(settings, SmallRng::seed_from_u64(seed), Utc::now())
        .context("invalid simulation settings")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start runtime")?;
    runtime.block_on(event_loop::run(&mut dash))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_enabled = matches!(
        std::env::var("PAI_LOG_STDOUT").ok().as_deref(),
        Some("1") | Some("true") | Some("TRUE") | Some("yes") | Some("YES")
    );
    if stdout_enabled {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_screenshot_and_seed() {
        let cli = Cli::parse_from(["pai-dashboard", "--screenshot", "--seed", "7"]);
        assert!(cli.screenshot);
        assert_eq!(cli.seed, Some(7));
    }

    #[test]
    fn rejects_non_numeric_seed() {
        assert!(Cli::try_parse_from(["pai-dashboard", "--seed", "forty-two"]).is_err());
    }
}
