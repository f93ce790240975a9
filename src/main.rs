use mssim::{ScenarioConfig, Scenario, Trajectory};
use mssim::{bench_backends, bench_backends_curve};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// Run a coupled oscillator scenario
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Scenario file, looked up under `scenarios/` unless the path exists as given
    #[arg(short, default_value = "chain3.yaml")]
    file_name: String,

    /// Print every sample as `t,x0,v0,x1,v1,...` to stdout
    #[arg(long)]
    csv: bool,

    /// Time the cpu and parallel backends instead of running a scenario
    #[arg(long)]
    bench: bool,

    /// Like --bench, over a fine range of sizes, as CSV
    #[arg(long)]
    bench_curve: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let given = PathBuf::from(file_name);
    let config_path = if given.exists() {
        given
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };

    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn print_csv(traj: &Trajectory) {
    let Some(first) = traj.samples().first() else {
        return;
    };
    let header: Vec<String> = (0..first.state.num_bodies())
        .flat_map(|i| [format!("x{i}"), format!("v{i}")])
        .collect();
    println!("t,{}", header.join(","));

    for s in traj.samples() {
        let row: Vec<String> = s.state.as_slice().iter().map(|c| c.to_string()).collect();
        println!("{},{}", s.t, row.join(","));
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.bench {
        bench_backends();
        return Ok(());
    }
    if args.bench_curve {
        bench_backends_curve();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let scenario = Scenario::build_scenario(scenario_cfg).context("invalid scenario")?;

    let traj = scenario.run().context("simulation failed")?;

    if let (Some(first), Some(last)) = (traj.samples().first(), traj.last()) {
        let e0 = scenario.system.energy(&first.state)?;
        let e1 = scenario.system.energy(&last.state)?;
        info!(
            samples = traj.len(),
            t_final = last.t,
            energy_start = e0,
            energy_end = e1,
            "run complete"
        );
        let (x, v) = last.state.to_parallel();
        info!(?x, ?v, "final state");
    }

    if let Some(modal) = scenario.modal_analysis().context("modal analysis failed")? {
        let omegas = modal.natural_frequencies();
        info!(omegas = ?omegas.as_slice(), "natural angular frequencies");
    }

    if args.csv {
        print_csv(&traj);
    }

    Ok(())
}
