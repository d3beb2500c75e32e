//! Research tree tests: the single slot, prerequisite gating, progress,
//! and completion effects.

use gridtown_core::{
    command::PlayerCommand,
    config::{GameConfig, ResearchEffect},
    engine::SimEngine,
    event::SimEvent,
    research_subsystem::ResearchStatus,
};

fn build(run_id: &str, coins: i64) -> SimEngine {
    let mut engine =
        SimEngine::build(run_id.to_string(), 7, GameConfig::builtin()).expect("build engine");
    engine.ledger.coins = coins;
    engine
}

fn start(engine: &mut SimEngine, node_id: &str) -> Vec<SimEvent> {
    engine
        .apply(PlayerCommand::StartResearch {
            node_id: node_id.into(),
        })
        .unwrap()
}

/// Starting deducts the cost; a second start before completion is
/// rejected because the slot is occupied.
#[test]
fn single_slot_and_cost() {
    let mut engine = build("res-slot", 1200);

    let events = start(&mut engine, "basic_engineering"); // costs 500
    assert!(events.iter().any(|e| e.type_name() == "research_started"));
    assert_eq!(engine.ledger.coins, 700);
    assert!(engine.active_research().is_some());

    let events = start(&mut engine, "trade_logistics");
    let rejected = events.iter().any(|e| match e {
        SimEvent::ActionRejected { reason, .. } => reason.contains("already in progress"),
        _ => false,
    });
    assert!(rejected, "second start must be rejected: {events:?}");
    assert_eq!(engine.ledger.coins, 700, "rejection must not charge");
}

#[test]
fn prerequisites_gate_start() {
    let mut engine = build("res-prereq", 50_000);

    // smart_grid needs renewable_energy, which needs basic_engineering.
    assert_eq!(
        engine.research_status("smart_grid"),
        Some(ResearchStatus::Locked)
    );
    let events = start(&mut engine, "smart_grid");
    assert!(events.iter().any(|e| e.type_name() == "action_rejected"));
    assert!(engine.active_research().is_none());
}

#[test]
fn insufficient_funds_rejected() {
    let mut engine = build("res-broke", 100);
    let events = start(&mut engine, "basic_engineering");
    assert!(events.iter().any(|e| e.type_name() == "action_rejected"));
    assert_eq!(engine.ledger.coins, 100);
    assert!(engine.active_research().is_none());
}

#[test]
fn unknown_node_rejected() {
    let mut engine = build("res-unknown", 5_000);
    let events = start(&mut engine, "cold_fusion");
    assert!(events.iter().any(|e| e.type_name() == "action_rejected"));
}

/// Completion adds exactly one id to the completed set, clears the
/// slot, and surfaces the node's effects for the host.
#[test]
fn completion_lifecycle() {
    let mut engine = build("res-complete", 5_000);
    start(&mut engine, "basic_engineering"); // 3 days from day 0

    engine.run_days(2).unwrap();
    assert_eq!(
        engine.research_status("basic_engineering"),
        Some(ResearchStatus::InProgress { progress: 2.0 / 3.0 * 100.0 })
    );
    assert!(engine.completed_research().is_empty());

    engine.run_days(1).unwrap(); // day 3: done
    assert!(engine.active_research().is_none());
    assert_eq!(engine.completed_research().len(), 1);
    assert!(engine.completed_research().contains("basic_engineering"));
    assert_eq!(
        engine.research_status("basic_engineering"),
        Some(ResearchStatus::Completed)
    );

    let completed = engine
        .journal()
        .iter()
        .find(|e| e.event_type == "research_completed")
        .map(|e| serde_json::from_str::<SimEvent>(&e.payload).unwrap())
        .expect("completion event");
    match completed {
        SimEvent::ResearchCompleted { day, node_id, effects } => {
            assert_eq!(day, 3);
            assert_eq!(node_id, "basic_engineering");
            assert_eq!(effects, vec![ResearchEffect::EfficiencyBonus { amount: 5.0 }]);
        }
        other => panic!("unexpected event {other:?}"),
    }

    // Dependents open up once the prerequisite lands.
    assert_eq!(
        engine.research_status("renewable_energy"),
        Some(ResearchStatus::Available)
    );
}

#[test]
fn completed_node_cannot_restart() {
    let mut engine = build("res-restart", 10_000);
    start(&mut engine, "basic_engineering");
    engine.run_days(3).unwrap();

    let events = start(&mut engine, "basic_engineering");
    let rejected = events.iter().any(|e| match e {
        SimEvent::ActionRejected { reason, .. } => reason.contains("already been researched"),
        _ => false,
    });
    assert!(rejected, "{events:?}");
    assert_eq!(engine.completed_research().len(), 1);
}

/// The completed set only ever grows, one node per completion.
#[test]
fn completed_set_is_append_only() {
    let mut engine = build("res-chain", 50_000);

    start(&mut engine, "basic_engineering");
    engine.run_days(3).unwrap();
    start(&mut engine, "renewable_energy"); // 5 days
    engine.run_days(5).unwrap();
    start(&mut engine, "smart_grid"); // now unlocked, 6 days
    engine.run_days(6).unwrap();

    assert_eq!(
        engine.completed_research().iter().cloned().collect::<Vec<_>>(),
        vec![
            "basic_engineering".to_string(),
            "renewable_energy".to_string(),
            "smart_grid".to_string(),
        ]
    );
}
