//! Catalog validation: malformed definitions fail at load/build time,
//! never mid-run.

use gridtown_core::config::{GameConfig, ResearchNodeConfig};
use std::fs;

#[test]
fn builtin_catalog_is_valid() {
    GameConfig::builtin().validate().expect("builtin catalog");
}

#[test]
fn unknown_prerequisite_rejected() {
    let mut config = GameConfig::builtin();
    config.research.push(ResearchNodeConfig {
        id: "quantum".into(),
        label: "Quantum".into(),
        cost: 100,
        research_days: 1,
        prerequisites: vec!["does_not_exist".into()],
        effects: vec![],
        category: "technology".into(),
    });

    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("unknown prerequisite"), "{err}");
}

#[test]
fn prerequisite_cycle_rejected() {
    let mut config = GameConfig::builtin();
    config.research.push(ResearchNodeConfig {
        id: "a".into(),
        label: "A".into(),
        cost: 100,
        research_days: 1,
        prerequisites: vec!["b".into()],
        effects: vec![],
        category: "technology".into(),
    });
    config.research.push(ResearchNodeConfig {
        id: "b".into(),
        label: "B".into(),
        cost: 100,
        research_days: 1,
        prerequisites: vec!["a".into()],
        effects: vec![],
        category: "technology".into(),
    });

    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("cycle"), "{err}");
}

#[test]
fn route_with_unknown_good_rejected() {
    let mut config = GameConfig::builtin();
    config.routes[0].goods.push("unobtainium".into());

    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("unknown good"), "{err}");
}

#[test]
fn out_of_range_probability_rejected() {
    let mut config = GameConfig::builtin();
    config.disasters[0].base_probability = 1.5;

    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("base_probability"), "{err}");
}

#[test]
fn zero_recovery_rejected() {
    let mut config = GameConfig::builtin();
    config.disasters[0].recovery_days = 0;

    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("recovery_days"), "{err}");
}

/// Round-trip through the on-disk JSON layout the runner loads.
#[test]
fn load_from_data_dir() {
    let dir = std::env::temp_dir().join(format!("gridtown-catalog-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();

    fs::write(
        dir.join("disasters.json"),
        r#"{
          "disasters": [{
            "id": "fire",
            "label": "Fire",
            "base_probability": 0.01,
            "severity": "moderate",
            "effects": { "damage_pct": 20.0, "power_outage": false, "coin_loss": 100 },
            "weather_triggers": ["sunny"],
            "seasonal_multipliers": { "summer": 1.5 },
            "recovery_days": 3
          }]
        }"#,
    )
    .unwrap();
    fs::write(
        dir.join("goods.json"),
        r#"{
          "goods": [{
            "id": "grain", "label": "Grain", "base_price": 10.0,
            "demand": 1.2, "supply": 0.9, "category": "food"
          }]
        }"#,
    )
    .unwrap();
    fs::write(
        dir.join("routes.json"),
        r#"{
          "routes": [{
            "id": "riverport", "destination": "Riverport", "goods": ["grain"],
            "relationship": 70.0, "distance_km": 120.0, "travel_days": 2,
            "min_level": 1
          }]
        }"#,
    )
    .unwrap();
    fs::write(
        dir.join("research.json"),
        r#"{
          "nodes": [{
            "id": "basic_engineering", "label": "Basic Engineering",
            "cost": 500, "research_days": 3,
            "effects": [{ "effect": "efficiency_bonus", "amount": 5.0 }],
            "category": "infrastructure"
          }]
        }"#,
    )
    .unwrap();

    let config = GameConfig::load(dir.to_str().unwrap()).expect("load catalogs");
    assert_eq!(config.disasters.len(), 1);
    assert_eq!(config.goods[0].id, "grain");
    assert_eq!(config.routes[0].travel_days, 2);
    assert_eq!(config.research[0].cost, 500);

    fs::remove_dir_all(&dir).ok();
}
