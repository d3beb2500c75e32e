//! sim-runner: headless simulation runner for Gridtown.
//!
//! Usage:
//!   sim-runner --seed 12345 --days 365
//!   sim-runner --seed 12345 --days 90 --data-dir ./data

use anyhow::Result;
use gridtown_core::{
    command::PlayerCommand,
    config::GameConfig,
    engine::SimEngine,
    research_subsystem::ResearchStatus,
    state::{Building, Weather},
};
use std::env;

/// Research order the scripted player works through.
const RESEARCH_PLAN: [&str; 5] = [
    "basic_engineering",
    "trade_logistics",
    "urban_planning",
    "renewable_energy",
    "market_analytics",
];

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let days = parse_arg(&args, "--days", 365u64);
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].clone());

    println!("Gridtown — sim-runner");
    println!("  seed:     {seed}");
    println!("  days:     {days}");
    println!(
        "  catalog:  {}",
        data_dir.as_deref().unwrap_or("(builtin)")
    );
    println!();

    let config = match &data_dir {
        Some(dir) => GameConfig::load(dir)?,
        None => GameConfig::builtin(),
    };

    let run_id = format!("run-{seed}");
    let mut engine = SimEngine::build(run_id, seed, config)?;
    seed_demo_city(&mut engine);
    log::info!("engine built: {} buildings, {} coins", engine.city.buildings.len(), engine.ledger.coins);

    for day in 1..=days {
        host_inputs(&mut engine, day);
        engine.run_days(1)?;
        scripted_player(&mut engine, day)?;
    }

    print_summary(&engine, days);
    Ok(())
}

/// A small mixed-use town: enough buildings to clear the disaster
/// threshold and exercise every scoring rule.
fn seed_demo_city(engine: &mut SimEngine) {
    engine.city.buildings = vec![
        Building::new(0, "power_plant", 5000, 120.0),
        Building::new(1, "factory", 3000, 80.0),
        Building::new(2, "park", 500, 0.0),
        Building::new(3, "garden", 300, 0.0),
        Building::new(4, "tech_hub", 4000, 60.0),
        Building::new(5, "house", 800, 20.0),
        Building::new(6, "solar_panel", 1200, 0.0),
    ];
    engine.city.infrastructure = 20;
    engine.city.player_level = 3;
    engine.ledger.coins = 10_000;
    engine.ledger.add_stock("textiles", 50);
    engine.ledger.add_stock("grain", 20);
}

/// Rotate the host-owned weather and season deterministically so
/// disaster triggers and seasonal multipliers all get exercised.
fn host_inputs(engine: &mut SimEngine, day: u64) {
    engine.city.weather = match day % 5 {
        0 => Weather::Sunny,
        1 => Weather::Cloudy,
        2 => Weather::Rainy,
        3 => Weather::Stormy,
        _ => Weather::Snowy,
    };
    engine.city.season = match (day / 30) % 4 {
        0 => "spring",
        1 => "summer",
        2 => "autumn",
        _ => "winter",
    }
    .to_string();
}

/// Minimal scripted player: keeps the power plant maintained, trades on
/// the starter route, and works through the research plan.
fn scripted_player(engine: &mut SimEngine, day: u64) -> Result<()> {
    if day % 10 == 0 {
        engine.apply(PlayerCommand::Maintain { cell: 0 })?;
    }
    if day % 7 == 0 {
        engine.apply(PlayerCommand::BuyGood {
            route_id: "riverport".into(),
            good_id: "grain".into(),
            quantity: 10,
        })?;
    }
    if day % 12 == 0 {
        engine.apply(PlayerCommand::SellGood {
            route_id: "riverport".into(),
            good_id: "textiles".into(),
            quantity: 5,
        })?;
    }

    if engine.active_research().is_none() {
        for node_id in RESEARCH_PLAN {
            if engine.research_status(node_id) == Some(ResearchStatus::Available) {
                engine.apply(PlayerCommand::StartResearch {
                    node_id: node_id.into(),
                })?;
                break;
            }
        }
    }
    Ok(())
}

fn print_summary(engine: &SimEngine, days: u64) {
    let journal = engine.journal();
    let count = |event_type: &str| {
        journal
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    };
    let env = engine.environment();

    println!("=== RUN SUMMARY ===");
    println!("  run_id:          {}", engine.run_id);
    println!("  days run:        {days}");
    println!("  final day:       {}", engine.clock.current_day);
    println!("  coins:           {}", engine.ledger.coins);
    println!("  disasters:       {}", count("disaster_struck"));
    println!("  trades settled:  {}", count("trade_settled"));
    println!("  goods sold:      {}", count("goods_sold"));
    println!("  maintenance:     {}", count("maintenance_performed"));
    println!("  rejections:      {}", count("action_rejected"));
    println!();
    println!("=== CITY HEALTH ===");
    println!("  pollution:       {:.0}", env.pollution);
    println!("  greenery:        {:.0}", env.greenery);
    println!("  sustainability:  {:.0}", env.sustainability);
    let mut efficiencies: Vec<f64> = engine
        .efficiency_records()
        .values()
        .map(|r| r.efficiency)
        .collect();
    efficiencies.sort_by(|a, b| a.partial_cmp(b).expect("efficiency is never NaN"));
    if let (Some(lo), Some(hi)) = (efficiencies.first(), efficiencies.last()) {
        println!("  efficiency:      {lo:.0}%–{hi:.0}%");
    }
    println!();
    println!("=== RESEARCH ===");
    if engine.completed_research().is_empty() {
        println!("  (nothing completed yet)");
    } else {
        for node in engine.completed_research() {
            println!("  completed: {node}");
        }
    }
    if let Some(active) = engine.active_research() {
        println!(
            "  in progress: {} ({:.0}%)",
            active.node_id,
            active.progress(engine.clock.current_day)
        );
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
