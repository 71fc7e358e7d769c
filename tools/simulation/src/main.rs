//! custody-sim: run vault scenarios and replay races from the command line.

use anyhow::{bail, Context, Result};
use clap::Parser;
use custody_simulation::engine::Simulation;
use custody_simulation::export::{export_json, write_to_file, SimulationExport};
use custody_simulation::logging::{init_logging, LogFormat};
use custody_simulation::race::replay_race;
use custody_simulation::scenario::Scenario;
use custody_simulation::scenarios;
use custody_types::numeric::parse_amount;
use std::path::PathBuf;
use tracing::info;

/// Scenario runner for the authorization-gated custody vault.
#[derive(Parser, Debug)]
#[command(name = "custody-sim", version, about)]
struct Cli {
    /// JSON scenario file to run instead of the built-in presets.
    #[arg(long, short = 's')]
    scenario: Option<PathBuf>,

    /// Seed for an additional random-walk scenario.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of steps in the random-walk scenario.
    #[arg(long, default_value_t = 500)]
    steps: usize,

    /// Threads in the concurrent replay race (0 disables it).
    #[arg(long, default_value_t = 16)]
    race_threads: usize,

    /// Amount each racing thread tries to withdraw.
    #[arg(long, default_value = "0.5")]
    race_amount: String,

    /// Write the JSON report here instead of stdout.
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,

    /// Log format: pretty or json.
    #[arg(long, env = "CUSTODY_LOG_FORMAT", default_value = "pretty")]
    log_format: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging("info", LogFormat::from_str_lossy(&cli.log_format))
        .context("installing log subscriber")?;

    let mut plan: Vec<Scenario> = match &cli.scenario {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading scenario {}", path.display()))?;
            vec![Scenario::from_json(&json)
                .with_context(|| format!("parsing scenario {}", path.display()))?]
        }
        None => {
            let mut presets = vec![scenarios::validate_flow(), scenarios::rollback_flow()];
            presets.extend(scenarios::reference_scenarios());
            presets
        }
    };
    if let Some(seed) = cli.seed {
        plan.push(scenarios::random_walk(seed, cli.steps));
    }

    let reports = plan
        .iter()
        .map(Simulation::run)
        .collect::<Result<Vec<_>, _>>()?;

    let race = if cli.race_threads > 0 {
        let amount = parse_amount(&cli.race_amount).context("parsing --race-amount")?;
        Some(replay_race(cli.race_threads, "race", amount).context("running replay race")?)
    } else {
        None
    };

    let export = SimulationExport::new(reports, race);
    match &cli.out {
        Some(path) => {
            write_to_file(&export, path)
                .with_context(|| format!("writing report {}", path.display()))?;
            info!(path = %path.display(), "Report written");
        }
        None => println!("{}", export_json(&export)?),
    }

    if !export.passed() {
        bail!("one or more scenarios failed");
    }
    Ok(())
}
