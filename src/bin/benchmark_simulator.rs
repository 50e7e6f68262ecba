//! Measure single-trial throughput and optionally append one line to a log file for trend
//! tracking.
//!
//! Usage:
//!   cargo run --release --bin benchmark_simulator
//!   cargo run --release --bin benchmark_simulator -- --log
//!
//! --log  Append one row to benchmark_log.csv (date, trials_per_sec, trials_per_min, casts_per_trial, venom).

use std::fs::OpenOptions;
use std::io::Write;
use std::time::Instant;

use nshot::combat::{calc_periodic_params, simulate_once, PlayerStats, Rng, TrialParams};
use nshot::data::DataRegistry;
use nshot::estimator::build_trial_params;

// Run for at least this long and this many trials
const MIN_DURATION_MS: u128 = 2000;
const MIN_TRIALS: u64 = 5000;

fn venom_params(registry: &DataRegistry) -> Result<TrialParams, String> {
    let monster = registry.monster("grim_phantom_watch").map_err(|e| e.to_string())?;
    let skill = registry.attack_skill("savage_blow").map_err(|e| e.to_string())?;
    let stats = PlayerStats {
        strength: 4,
        dex: 25,
        int: 4,
        luk: 300,
    };
    let venom = registry
        .venom_metadata()
        .map_err(|e| e.to_string())
        .and_then(|meta| calc_periodic_params(meta, 30, stats).map_err(|e| e.to_string()))?;
    build_trial_params(1200, 1800, monster, skill, skill.default_level, Some(venom))
        .map_err(|e| e.to_string())
}

fn main() {
    let log = std::env::args().any(|a| a == "--log");

    let registry = match DataRegistry::bundled() {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("failed to load bundled tables: {err}");
            std::process::exit(1);
        }
    };
    let params = match venom_params(&registry) {
        Ok(params) => params,
        Err(err) => {
            eprintln!("failed to build trial parameters: {err}");
            std::process::exit(1);
        }
    };

    let start = Instant::now();
    let mut trials: u64 = 0;
    let mut casts: u64 = 0;
    while start.elapsed().as_millis() < MIN_DURATION_MS || trials < MIN_TRIALS {
        let outcome = simulate_once(&params, &mut Rng::for_trial(7, trials));
        casts += u64::from(outcome.casts);
        trials += 1;
    }
    let elapsed_secs = start.elapsed().as_secs_f64();

    let trials_per_sec = trials as f64 / elapsed_secs;
    let trials_per_min = trials_per_sec * 60.0;
    let casts_per_trial = casts as f64 / trials as f64;

    println!("Simulator benchmark (Savage Blow + Venom 30 vs Grim Phantom Watch):");
    println!("  Trials:       {}", trials);
    println!("  Duration:     {:.2} s", elapsed_secs);
    println!("  Trials/s:     {:.2}", trials_per_sec);
    println!("  Trials/min:   {:.2}", trials_per_min);
    println!("  Casts/trial:  {:.3}", casts_per_trial);

    if log {
        let date = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        let line = format!(
            "{},{:.4},{:.4},{:.4},{}\n",
            date, trials_per_sec, trials_per_min, casts_per_trial, 30
        );
        let path = "benchmark_log.csv";
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| {
                if file.metadata().map(|m| m.len() == 0).unwrap_or(true) {
                    file.write_all(b"date,trials_per_sec,trials_per_min,casts_per_trial,venom\n")?;
                }
                file.write_all(line.as_bytes())?;
                file.flush()
            });
        match written {
            Ok(()) => println!("Appended to {}", path),
            Err(err) => {
                eprintln!("failed to write {path}: {err}");
                std::process::exit(1);
            }
        }
    }
}
