use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

use boa_analysis::analyze;
use boa_outcome_utils::{OutcomeSpace, ScenarioConfig};

/// Pareto frontier, Nash point and per-outcome analysis of a negotiation domain.
#[derive(clap::Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// YAML file with `domain`, `own` and `opponent` profiles.
    pub scenario: PathBuf,
    /// Seed for sampling domains too large for enumeration.
    #[clap(long, default_value = "0")]
    pub seed: u64,
    /// Print only frontier, Nash point and sensitivity.
    #[clap(long)]
    pub summary: bool,
    #[clap(long)]
    pub compact: bool,
}

fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder().try_init();
    let args = Args::parse();

    let content = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("Failed to read scenario {}", args.scenario.display()))?;
    let scenario = ScenarioConfig::from_yaml(&content)?.build()?;

    let space = OutcomeSpace::new(scenario.domain.clone());
    if !space.is_enumerated() {
        log::warn!(
            "Domain has {} outcomes, analysis uses random sample.",
            scenario.domain.size()
        );
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let outcomes = space.outcomes(&mut rng);
    log::info!("Analyzing {} outcome(s).", outcomes.len());

    let mut analysis = analyze(
        &scenario.own,
        &scenario.opponent,
        scenario.own_reservation,
        scenario.opponent_reservation,
        &outcomes,
    );
    if args.summary {
        analysis.outcomes.clear();
    }

    let output = match args.compact {
        true => serde_json::to_string(&analysis)?,
        false => serde_json::to_string_pretty(&analysis)?,
    };
    println!("{}", output);
    Ok(())
}
