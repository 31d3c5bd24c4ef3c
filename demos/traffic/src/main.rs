//! traffic — drive the intersection controller with simulated vehicles.
//!
//! Each vehicle is a thread that repeatedly arrives, picks a movement, waits
//! for the controller to admit it, crosses, and leaves.  The run fails if the
//! independent collision monitor ever sees two crossing movements inside the
//! box together.
//!
//! ```text
//! traffic --vehicles 32 --trips 50 --wake broadcast --aging 4 --output output/traffic
//! RUST_LOG=xing_control=debug traffic --vehicles 4 --trips 2
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use xing_control::{FairnessPolicy, WakeStrategy};
use xing_core::Movement;
use xing_output::{CsvWriter, TripLogObserver};
use xing_sim::{DelayRange, NoopObserver, SimConfig, SimObserver, SimReport, Simulation};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "traffic")]
#[command(version)]
#[command(about = "Four-way intersection admission control simulation")]
struct Cli {
    /// JSON file holding a full or partial `SimConfig`; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of vehicles (one thread each)
    #[arg(short, long)]
    vehicles: Option<usize>,

    /// Trips per vehicle
    #[arg(short, long)]
    trips: Option<u32>,

    /// Master RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// How exits wake blocked vehicles
    #[arg(long, value_enum)]
    wake: Option<Wake>,

    /// Polling interval in microseconds for `--wake polling`
    #[arg(long, default_value = "500")]
    poll_us: u64,

    /// Enable aging fairness: hold back traffic that has bypassed a waiting
    /// movement this many times
    #[arg(long)]
    aging: Option<u32>,

    /// Upper bound of the arrival delay in microseconds
    #[arg(long)]
    arrival_us: Option<u64>,

    /// Upper bound of the transit time in microseconds
    #[arg(long)]
    transit_us: Option<u64>,

    /// Relative weights for straight,right,left
    #[arg(long, value_delimiter = ',', num_args = 3)]
    weights: Option<Vec<f64>>,

    /// Use the process-wide initialize/shutdown lifecycle
    #[arg(long)]
    global: bool,

    /// Directory for trips.csv and movement_summary.csv
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Wake {
    Targeted,
    Broadcast,
    Polling,
}

impl Cli {
    /// Load the base configuration and apply flag overrides.
    fn sim_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => SimConfig::default(),
        };

        if let Some(n) = self.vehicles {
            config.vehicles = n;
        }
        if let Some(n) = self.trips {
            config.trips_per_vehicle = n;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(max) = self.arrival_us {
            config.arrival_delay = DelayRange::new(Duration::ZERO, Duration::from_micros(max));
        }
        if let Some(max) = self.transit_us {
            config.transit_time = DelayRange::new(Duration::ZERO, Duration::from_micros(max));
        }
        if let Some(w) = &self.weights {
            config.turn_weights = [w[0], w[1], w[2]];
        }
        if let Some(wake) = self.wake {
            config.control.wake = match wake {
                Wake::Targeted => WakeStrategy::Targeted,
                Wake::Broadcast => WakeStrategy::Broadcast,
                Wake::Polling => WakeStrategy::Polling {
                    interval: Duration::from_micros(self.poll_us),
                },
            };
        }
        if let Some(max_bypass) = self.aging {
            config.control.fairness = FairnessPolicy::Aging { max_bypass };
        }
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<SimConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

// ── Run ───────────────────────────────────────────────────────────────────────

fn run<O: SimObserver>(sim: &Simulation, global: bool, observer: &O) -> Result<SimReport> {
    let report = if global { sim.run_global(observer)? } else { sim.run(observer)? };
    Ok(report)
}

fn print_report(report: &SimReport) {
    println!(
        "Simulation complete in {:.3} s  ({:.0} trips/s)",
        report.elapsed.as_secs_f64(),
        report.throughput()
    );
    println!(
        "  admitted: {}  blocked: {}  wakeups: {}  peak in box: {}",
        report.controller.admitted,
        report.controller.blocked,
        report.controller.wakeups,
        report.peak_in_box
    );
    println!();

    println!("{:<10} {:<9} {:>8} {:>14} {:>14}", "Movement", "Turn", "Trips", "Mean wait µs", "Max wait µs");
    println!("{}", "-".repeat(59));
    for m in Movement::ALL {
        let s = report.movement(m);
        println!(
            "{:<10} {:<9} {:>8} {:>14} {:>14}",
            m.to_string(),
            m.turn().as_str(),
            s.trips,
            s.mean_wait().as_micros(),
            s.max_wait.as_micros(),
        );
    }
    let all = report.overall();
    println!("{}", "-".repeat(59));
    println!(
        "{:<10} {:<9} {:>8} {:>14} {:>14}",
        "all",
        "",
        all.trips,
        all.mean_wait().as_micros(),
        all.max_wait.as_micros(),
    );
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "info" })
    });
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let config = cli.sim_config()?;
    println!("=== traffic — rust_xing intersection ===");
    println!(
        "Vehicles: {}  |  Trips/vehicle: {}  |  Seed: {}",
        config.vehicles, config.trips_per_vehicle, config.seed
    );
    println!("Wake: {:?}  |  Fairness: {:?}", config.control.wake, config.control.fairness);
    println!();

    let sim = Simulation::new(config)?;

    let report = match &cli.output {
        Some(dir) => {
            let obs = TripLogObserver::new(CsvWriter::new(dir)?);
            let report = run(&sim, cli.global, &obs)?;
            if let Some(e) = obs.take_error() {
                eprintln!("output error: {e}");
            }
            info!(dir = %dir.display(), "wrote trips.csv and movement_summary.csv");
            report
        }
        None => run(&sim, cli.global, &NoopObserver)?,
    };

    print_report(&report);
    Ok(())
}
