use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::combat::{
    calc_dmg_percent, calc_periodic_params, simulate_traced, PeriodicParams, PlayerStats, Rng,
    TimelineEvent, TrialOutcome,
};
use crate::config::AppConfig;
use crate::data::{validate_tables, DataRegistry};
use crate::estimator::{build_trial_params, run_simulation, summarize, Summary};
use crate::server::{self, AppState};

const USAGE: &str = "usage: nshot <serve|simulate|info|validate>";
const SIMULATE_USAGE: &str = "usage: nshot simulate --min N --max N [--monster ID] [--skill ID] \
[--level N] [--venom LEVEL --str N --dex N --luk N] [--sims N] [--seed N] [--table|--trace]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Simulate,
    Info,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("simulate") => Some(Command::Simulate),
        Some("info") => Some(Command::Info),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(),
        Some(Command::Simulate) => handle_simulate(args),
        Some(Command::Info) => handle_info(),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn load_context() -> Option<(AppConfig, Arc<DataRegistry>)> {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return None;
        }
    };
    match DataRegistry::load(&config.data_dir) {
        Ok(registry) => Some((config, registry)),
        Err(err) => {
            eprintln!("data error: {err}");
            None
        }
    }
}

fn handle_serve() -> i32 {
    let Some((config, registry)) = load_context() else {
        return 1;
    };
    match server::run_server(AppState::new(registry, config)) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

/// `--key value` pairs plus bare `--switch` flags.
#[derive(Debug, Default)]
struct Flags {
    values: HashMap<String, String>,
    switches: Vec<String>,
}

impl Flags {
    fn parse(args: &[String]) -> Self {
        let mut flags = Flags::default();
        let mut iter = args.iter().peekable();
        while let Some(arg) = iter.next() {
            let Some(key) = arg.strip_prefix("--") else {
                eprintln!("ignoring stray argument '{arg}'");
                continue;
            };
            match iter.peek() {
                Some(next) if !next.starts_with("--") => {
                    flags.values.insert(key.to_string(), (*next).clone());
                    iter.next();
                }
                _ => flags.switches.push(key.to_string()),
            }
        }
        flags
    }

    fn get(&self, key: &str) -> Option<&String> {
        self.values.get(key)
    }

    fn has(&self, key: &str) -> bool {
        self.switches.iter().any(|s| s == key)
    }
}

#[derive(Debug, Serialize)]
struct SimulateOutput<'a> {
    monster: &'a str,
    skill: &'a str,
    skill_level: u32,
    dmg_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    venom: Option<PeriodicParams>,
    seed: u64,
    summary: Summary,
}

#[derive(Debug, Serialize)]
struct TraceOutput {
    outcome: TrialOutcome,
    seed: u64,
    events: Vec<TimelineEvent>,
}

fn handle_simulate(args: &[String]) -> i32 {
    let flags = Flags::parse(&args[2..]);
    let (Some(atk_min), Some(atk_max)) = (
        flags.get("min").and_then(|v| v.parse::<u32>().ok()),
        flags.get("max").and_then(|v| v.parse::<u32>().ok()),
    ) else {
        eprintln!("{SIMULATE_USAGE}");
        return 2;
    };

    let (sims, seed) = match (
        optional_flag::<usize>(&flags, "sims"),
        optional_flag::<u64>(&flags, "seed"),
    ) {
        (Ok(sims), Ok(seed)) => (sims, seed),
        (Err(err), _) | (_, Err(err)) => {
            eprintln!("{err}");
            eprintln!("{SIMULATE_USAGE}");
            return 2;
        }
    };

    let Some((config, registry)) = load_context() else {
        return 1;
    };

    let monster = match flags.get("monster") {
        Some(id) => registry.monster(id),
        None => registry
            .monsters()
            .first()
            .ok_or_else(|| crate::data::DataError::UnknownMonster(String::new())),
    };
    let skill = match flags.get("skill") {
        Some(id) => registry.attack_skill(id),
        None => registry
            .default_attack_skill()
            .ok_or_else(|| crate::data::DataError::UnknownSkill(String::new())),
    };
    let (monster, skill) = match (monster, skill) {
        (Ok(m), Ok(s)) => (m, s),
        (Err(err), _) | (_, Err(err)) => {
            eprintln!("simulate failed: {err}");
            return 1;
        }
    };

    let level_arg = flags.get("level").map(|raw| parse_u32_arg(Some(raw), "level", 0));
    let skill_level = skill.clamp_level(level_arg);
    let stats = PlayerStats {
        strength: parse_u32_arg(flags.get("str"), "str", 0),
        dex: parse_u32_arg(flags.get("dex"), "dex", 0),
        int: parse_u32_arg(flags.get("int"), "int", 0),
        luk: parse_u32_arg(flags.get("luk"), "luk", 0),
    };
    let venom_level = parse_u32_arg(flags.get("venom"), "venom", 0);

    let venom = if venom_level > 0 {
        let params = registry
            .venom_metadata()
            .map_err(|err| err.to_string())
            .and_then(|meta| {
                calc_periodic_params(meta, venom_level, stats).map_err(|err| err.to_string())
            });
        match params {
            Ok(params) => Some(params),
            Err(err) => {
                eprintln!("simulate failed: {err}");
                return 1;
            }
        }
    } else {
        None
    };

    let run = match config.run_config(sims, seed) {
        Ok(run) => run,
        Err(err) => {
            eprintln!("simulate failed: {err}");
            return 1;
        }
    };
    debug!(?run, "run configuration");

    if flags.has("trace") {
        let traced = build_trial_params(atk_min, atk_max, monster, skill, skill_level, venom)
            .map(|params| simulate_traced(&params, &mut Rng::for_trial(run.seed, 0)));
        return match traced {
            Ok((outcome, events)) => print_json(&TraceOutput {
                outcome,
                seed: run.seed,
                events,
            }),
            Err(err) => {
                eprintln!("simulate failed: {err}");
                1
            }
        };
    }

    let dmg_percent = match calc_dmg_percent(skill, skill_level) {
        Ok(pct) => pct,
        Err(err) => {
            eprintln!("simulate failed: {err}");
            return 1;
        }
    };
    let distribution =
        match run_simulation(atk_min, atk_max, monster, skill, skill_level, venom, &run) {
            Ok(distribution) => distribution,
            Err(err) => {
                eprintln!("simulate failed: {err}");
                return 1;
            }
        };
    let summary = summarize(&distribution);

    if flags.has("table") {
        print!("{}", render_table(&summary));
        return 0;
    }

    print_json(&SimulateOutput {
        monster: &monster.id,
        skill: &skill.id,
        skill_level,
        dmg_percent,
        venom,
        seed: run.seed,
        summary,
    })
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize simulation result: {err}");
            1
        }
    }
}

/// Tab-separated histogram followed by the expectation.
pub fn render_table(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "casts\tcount\tpercent\tcumulative");
    for row in &summary.rows {
        let _ = writeln!(
            out,
            "{}\t{}\t{:.2}\t{:.2}",
            row.casts, row.count, row.percent, row.cumulative_percent
        );
    }
    let _ = writeln!(out, "expected\t{:.2}", summary.expected_casts);
    let _ = writeln!(out, "trials\t{}", summary.trials);
    if summary.unfinished > 0 {
        let _ = writeln!(out, "unfinished\t{}", summary.unfinished);
    }
    out
}

fn handle_info() -> i32 {
    let Some((_, registry)) = load_context() else {
        return 1;
    };
    println!("monsters:");
    for m in registry.monsters() {
        println!(
            "  {}\t{}\thp={}\twdef={}\tmdef={}",
            m.id, m.name, m.hp, m.weapon_def, m.magic_def
        );
    }
    println!("attack skills:");
    for s in registry.attack_skills() {
        let pct = calc_dmg_percent(s, s.default_level)
            .map(|p| format!("{p}%"))
            .unwrap_or_else(|_| "fixed".to_string());
        println!(
            "  {}\t{}\tLv.{}: {} x {} hit\t{}ms",
            s.id, s.name, s.default_level, pct, s.hits, s.latency
        );
    }
    0
}

fn handle_validate(args: &[String]) -> i32 {
    let dir = args.get(2).map(String::as_str).unwrap_or(crate::config::DEFAULT_DATA_DIR);
    let registry = match DataRegistry::load(Path::new(dir)) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };
    let report = validate_tables(&registry);
    for diag in &report.diagnostics {
        eprintln!("- {diag}");
    }
    if report.has_errors() {
        eprintln!("validation failed: {} issue(s)", report.diagnostics.len());
        1
    } else {
        println!("validation passed: {dir}");
        0
    }
}

fn parse_u32_arg(raw: Option<&String>, name: &str, default: u32) -> u32 {
    raw.and_then(|value| value.parse::<u32>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

/// Strict parse for flags that select the run; a bad value is a usage error.
fn optional_flag<T: std::str::FromStr>(flags: &Flags, name: &str) -> Result<Option<T>, String> {
    if flags.has(name) {
        return Err(format!("--{name} needs a value"));
    }
    flags
        .get(name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| format!("invalid --{name} '{raw}'"))
        })
        .transpose()
}
