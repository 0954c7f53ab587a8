//! Headless Skirmish Runner
//!
//! Buys both armies procedurally, fights the match to the end on a fixed
//! frame clock and prints the result.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use hive_skirmish::battle::{MatchEvent, MatchResult, Skirmish, TracingSink};
use hive_skirmish::core::{Faction, SkirmishConfig, SkirmishError};

/// Headless Skirmish Runner - procedural armies fight to the end
#[derive(Parser, Debug)]
#[command(name = "skirmish_runner")]
#[command(about = "Run a procedurally bought skirmish and print the outcome")]
struct Args {
    /// Roster file (TOML); built-in roster when omitted
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum ticks before the run is called off
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u64,

    /// Milliseconds of match time per tick
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Include the full event log in the output
    #[arg(long)]
    events: bool,
}

#[derive(Serialize)]
struct RunResult {
    outcome: String,
    ticks: u64,
    elapsed_ms: u64,
    player_units: usize,
    enemy_units: usize,
    player_survivors: usize,
    enemy_survivors: usize,
    player_payout: u32,
    enemy_payout: u32,
    seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<MatchEvent>>,
}

fn run(args: &Args, seed: u64) -> Result<RunResult, SkirmishError> {
    let mut config = match &args.roster {
        Some(path) => SkirmishConfig::load(path)?,
        None => SkirmishConfig::default(),
    }
    .with_seed(seed);
    config.session.auto_reset = false;

    let mut now = 0;
    let mut skirmish = Skirmish::new(config, now)?;
    let mut log = Vec::new();

    skirmish.procure_army(Faction::Player, now)?;
    let mut top_ups = 0;
    loop {
        match skirmish.start(now) {
            Ok(()) => break,
            Err(SkirmishError::GoldNotSpent { .. }) if top_ups < 20 => {
                skirmish.procure_reinforcements(Faction::Player, now)?;
                top_ups += 1;
            }
            Err(e) => return Err(e),
        }
    }
    if args.events {
        log.extend(skirmish.drain_events());
    } else {
        skirmish.flush_to(&mut TracingSink);
    }
    let player_units = skirmish.store().count_faction(Faction::Player);
    let enemy_units = skirmish.store().count_faction(Faction::Enemy);

    let mut decided = None;
    while skirmish.ticks() < args.max_ticks {
        now += args.frame_ms;
        let report = skirmish.tick(now)?;
        if args.events {
            log.extend(skirmish.drain_events());
        } else {
            skirmish.flush_to(&mut TracingSink);
        }
        if report.outcome.is_some() {
            decided = report.outcome;
            break;
        }
    }

    let outcome = match decided.as_ref().map(|o| o.result) {
        Some(MatchResult::Victory(Faction::Player)) => "player_victory",
        Some(MatchResult::Victory(Faction::Enemy)) => "enemy_victory",
        Some(MatchResult::Draw) => "draw",
        None => "timeout",
    };

    Ok(RunResult {
        outcome: outcome.to_string(),
        ticks: skirmish.ticks(),
        elapsed_ms: now,
        player_units,
        enemy_units,
        player_survivors: skirmish.survivors(Faction::Player),
        enemy_survivors: skirmish.survivors(Faction::Enemy),
        player_payout: decided.as_ref().map_or(0, |o| o.payout(Faction::Player)),
        enemy_payout: decided.as_ref().map_or(0, |o| o.payout(Faction::Enemy)),
        seed,
        events: args.events.then_some(log),
    })
}

fn print_json(result: &RunResult) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize result: {}", e),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hive_skirmish=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let result = match run(&args, seed) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Skirmish failed: {}", e);
            std::process::exit(1);
        }
    };

    match args.format.as_str() {
        "json" => print_json(&result),
        "text" => {
            println!("Skirmish Result");
            println!("===============");
            println!("Outcome: {}", result.outcome);
            println!("Ticks: {} ({} ms)", result.ticks, result.elapsed_ms);
            println!(
                "Armies: {} player vs {} enemy",
                result.player_units, result.enemy_units
            );
            println!(
                "Survivors: {} player, {} enemy",
                result.player_survivors, result.enemy_survivors
            );
            println!(
                "Payouts: {} player, {} enemy",
                result.player_payout, result.enemy_payout
            );
            println!("Seed: {}", result.seed);
            if let Some(events) = &result.events {
                println!();
                for event in events {
                    println!("[{:>7} ms] {}", event.timestamp, event.description);
                }
            }
        }
        _ => {
            eprintln!("Unknown format '{}', defaulting to json", args.format);
            print_json(&result);
        }
    }
}
