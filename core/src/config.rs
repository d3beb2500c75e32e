//! Static catalogs: disaster definitions, trade goods and routes, and
//! the research tree.
//!
//! Catalogs are read-only configuration. Runtime instance state
//! (active disasters, in-transit trades, the research slot) lives in the
//! subsystems, keyed by catalog id. Malformed catalogs are an
//! authoring-time failure: `validate()` rejects them at engine build,
//! never mid-run.

use crate::{
    state::Weather,
    types::{Day, DisasterId, GoodId, NodeId, RouteId},
};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

// ── Disasters ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DisasterSeverity {
    Minor,
    Moderate,
    Severe,
    Catastrophic,
}

impl DisasterSeverity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
            Self::Catastrophic => "catastrophic",
        }
    }
}

/// What a disaster does to the city when it strikes. Damage and outages
/// are applied by the host grid; the coin loss hits the ledger directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisasterEffects {
    pub damage_pct: f64,
    pub power_outage: bool,
    pub coin_loss: i64,
    /// Building kind keys this disaster targets. Empty = city-wide.
    #[serde(default)]
    pub affected_kinds: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisasterConfig {
    pub id: DisasterId,
    pub label: String,
    pub base_probability: f64,
    pub severity: DisasterSeverity,
    pub effects: DisasterEffects,
    /// Weather states that double the trigger probability.
    #[serde(default)]
    pub weather_triggers: Vec<Weather>,
    /// Season key → probability multiplier. Missing season = 1.0.
    #[serde(default)]
    pub seasonal_multipliers: BTreeMap<String, f64>,
    pub recovery_days: Day,
}

// ── Trade ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeGoodConfig {
    pub id: GoodId,
    pub label: String,
    pub base_price: f64,
    pub demand: f64,
    pub supply: f64,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRouteConfig {
    pub id: RouteId,
    pub destination: String,
    pub goods: Vec<GoodId>,
    /// Diplomatic relationship score, 0–100.
    pub relationship: f64,
    pub distance_km: f64,
    pub travel_days: Day,
    /// Player level at which this route opens.
    pub min_level: u32,
}

// ── Research ─────────────────────────────────────────────────────────────────

/// Typed research payoff. The core records completion and surfaces the
/// effect list in the `ResearchCompleted` event; applying the effects is
/// the host's job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ResearchEffect {
    UnlockBuilding { kind: String },
    EfficiencyBonus { amount: f64 },
    DisasterRiskReduction { amount: f64 },
    IncomeBonus { amount: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchNodeConfig {
    pub id: NodeId,
    pub label: String,
    pub cost: i64,
    pub research_days: Day,
    #[serde(default)]
    pub prerequisites: Vec<NodeId>,
    pub effects: Vec<ResearchEffect>,
    pub category: String,
}

// ── Catalog files ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct DisasterCatalogFile {
    disasters: Vec<DisasterConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct GoodsCatalogFile {
    goods: Vec<TradeGoodConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct RoutesCatalogFile {
    routes: Vec<TradeRouteConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResearchCatalogFile {
    nodes: Vec<ResearchNodeConfig>,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub disasters: Vec<DisasterConfig>,
    pub goods: Vec<TradeGoodConfig>,
    pub routes: Vec<TradeRouteConfig>,
    pub research: Vec<ResearchNodeConfig>,
}

impl GameConfig {
    /// Load all catalogs from JSON files in `data_dir`.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let dir = Path::new(data_dir);

        let content = fs::read_to_string(dir.join("disasters.json"))
            .with_context(|| format!("reading {data_dir}/disasters.json"))?;
        let disaster_file: DisasterCatalogFile = serde_json::from_str(&content)?;

        let content = fs::read_to_string(dir.join("goods.json"))
            .with_context(|| format!("reading {data_dir}/goods.json"))?;
        let goods_file: GoodsCatalogFile = serde_json::from_str(&content)?;

        let content = fs::read_to_string(dir.join("routes.json"))
            .with_context(|| format!("reading {data_dir}/routes.json"))?;
        let routes_file: RoutesCatalogFile = serde_json::from_str(&content)?;

        let content = fs::read_to_string(dir.join("research.json"))
            .with_context(|| format!("reading {data_dir}/research.json"))?;
        let research_file: ResearchCatalogFile = serde_json::from_str(&content)?;

        let config = Self {
            disasters: disaster_file.disasters,
            goods: goods_file.goods,
            routes: routes_file.routes,
            research: research_file.nodes,
        };
        config.validate()?;
        Ok(config)
    }

    /// Authoring-time catalog checks: id cross-references, probability
    /// ranges, and research-graph acyclicity.
    pub fn validate(&self) -> anyhow::Result<()> {
        for def in &self.disasters {
            if !(0.0..=1.0).contains(&def.base_probability) {
                bail!(
                    "disaster '{}': base_probability {} outside [0, 1]",
                    def.id,
                    def.base_probability
                );
            }
            if def.recovery_days == 0 {
                bail!("disaster '{}': recovery_days must be >= 1", def.id);
            }
        }

        let good_ids: HashSet<&str> = self.goods.iter().map(|g| g.id.as_str()).collect();
        for route in &self.routes {
            for good in &route.goods {
                if !good_ids.contains(good.as_str()) {
                    bail!("route '{}': unknown good '{good}'", route.id);
                }
            }
        }

        let node_ids: HashSet<&str> = self.research.iter().map(|n| n.id.as_str()).collect();
        for node in &self.research {
            for prereq in &node.prerequisites {
                if !node_ids.contains(prereq.as_str()) {
                    bail!("research '{}': unknown prerequisite '{prereq}'", node.id);
                }
            }
        }
        self.check_research_acyclic()?;

        Ok(())
    }

    /// Kahn's algorithm over the prerequisite graph. Any node left with
    /// unresolved prerequisites after the sweep sits on a cycle.
    fn check_research_acyclic(&self) -> anyhow::Result<()> {
        let mut indegree: HashMap<&str, usize> = self
            .research
            .iter()
            .map(|n| (n.id.as_str(), n.prerequisites.len()))
            .collect();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        for node in &self.research {
            for prereq in &node.prerequisites {
                dependents
                    .entry(prereq.as_str())
                    .or_default()
                    .push(node.id.as_str());
            }
        }

        let mut ready: Vec<&str> = indegree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut resolved = 0usize;
        while let Some(id) = ready.pop() {
            resolved += 1;
            for &dep in dependents.get(id).into_iter().flatten() {
                if let Some(deg) = indegree.get_mut(dep) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.push(dep);
                    }
                }
            }
        }

        if resolved != self.research.len() {
            bail!("research catalog contains a prerequisite cycle");
        }
        Ok(())
    }

    /// The standard catalog shipped with the game. Tests and the headless
    /// runner use this; a data dir overrides it.
    pub fn builtin() -> Self {
        let disasters = vec![
            DisasterConfig {
                id: "fire".into(),
                label: "Building Fire".into(),
                base_probability: 0.012,
                severity: DisasterSeverity::Moderate,
                effects: DisasterEffects {
                    damage_pct: 25.0,
                    power_outage: false,
                    coin_loss: 150,
                    affected_kinds: vec![],
                },
                weather_triggers: vec![Weather::Sunny],
                seasonal_multipliers: BTreeMap::from([("summer".to_string(), 1.5)]),
                recovery_days: 3,
            },
            DisasterConfig {
                id: "flood".into(),
                label: "Flash Flood".into(),
                base_probability: 0.008,
                severity: DisasterSeverity::Severe,
                effects: DisasterEffects {
                    damage_pct: 30.0,
                    power_outage: false,
                    coin_loss: 300,
                    affected_kinds: vec!["park".into(), "garden".into(), "farm".into()],
                },
                weather_triggers: vec![Weather::Rainy, Weather::Stormy],
                seasonal_multipliers: BTreeMap::from([("spring".to_string(), 1.4)]),
                recovery_days: 5,
            },
            DisasterConfig {
                id: "earthquake".into(),
                label: "Earthquake".into(),
                base_probability: 0.004,
                severity: DisasterSeverity::Catastrophic,
                effects: DisasterEffects {
                    damage_pct: 50.0,
                    power_outage: true,
                    coin_loss: 500,
                    affected_kinds: vec![],
                },
                weather_triggers: vec![],
                seasonal_multipliers: BTreeMap::new(),
                recovery_days: 7,
            },
            DisasterConfig {
                id: "tornado".into(),
                label: "Tornado".into(),
                base_probability: 0.006,
                severity: DisasterSeverity::Severe,
                effects: DisasterEffects {
                    damage_pct: 35.0,
                    power_outage: true,
                    coin_loss: 250,
                    affected_kinds: vec![],
                },
                weather_triggers: vec![Weather::Stormy],
                seasonal_multipliers: BTreeMap::from([
                    ("summer".to_string(), 1.3),
                    ("autumn".to_string(), 1.2),
                ]),
                recovery_days: 4,
            },
            DisasterConfig {
                id: "blackout".into(),
                label: "Grid Blackout".into(),
                base_probability: 0.015,
                severity: DisasterSeverity::Minor,
                effects: DisasterEffects {
                    damage_pct: 5.0,
                    power_outage: true,
                    coin_loss: 100,
                    affected_kinds: vec![
                        "power_plant".into(),
                        "solar_panel".into(),
                        "wind_turbine".into(),
                    ],
                },
                weather_triggers: vec![Weather::Stormy, Weather::Snowy],
                seasonal_multipliers: BTreeMap::from([("winter".to_string(), 1.5)]),
                recovery_days: 2,
            },
            DisasterConfig {
                id: "cyber_attack".into(),
                label: "Cyber Attack".into(),
                base_probability: 0.010,
                severity: DisasterSeverity::Moderate,
                effects: DisasterEffects {
                    damage_pct: 10.0,
                    power_outage: false,
                    coin_loss: 400,
                    affected_kinds: vec!["tech".into(), "smart".into(), "automated".into()],
                },
                weather_triggers: vec![],
                seasonal_multipliers: BTreeMap::new(),
                recovery_days: 2,
            },
        ];

        let goods = vec![
            good("grain", "Grain", 10.0, 1.2, 0.9, "food"),
            good("lumber", "Lumber", 25.0, 1.1, 1.0, "raw"),
            good("steel", "Steel", 60.0, 1.3, 0.8, "industrial"),
            good("electronics", "Electronics", 120.0, 1.5, 0.7, "industrial"),
            good("textiles", "Textiles", 35.0, 1.0, 1.1, "consumer"),
            good("medicine", "Medicine", 90.0, 1.4, 0.6, "consumer"),
        ];

        let routes = vec![
            TradeRouteConfig {
                id: "riverport".into(),
                destination: "Riverport".into(),
                goods: vec!["grain".into(), "lumber".into(), "textiles".into()],
                relationship: 70.0,
                distance_km: 120.0,
                travel_days: 2,
                min_level: 1,
            },
            TradeRouteConfig {
                id: "ironreach".into(),
                destination: "Ironreach".into(),
                goods: vec!["steel".into(), "lumber".into(), "electronics".into()],
                relationship: 55.0,
                distance_km: 340.0,
                travel_days: 4,
                min_level: 3,
            },
            TradeRouteConfig {
                id: "meridian".into(),
                destination: "Meridian City".into(),
                goods: vec!["electronics".into(), "medicine".into(), "textiles".into()],
                relationship: 60.0,
                distance_km: 520.0,
                travel_days: 6,
                min_level: 5,
            },
        ];

        let research = vec![
            node(
                "basic_engineering",
                "Basic Engineering",
                500,
                3,
                &[],
                vec![ResearchEffect::EfficiencyBonus { amount: 5.0 }],
                "infrastructure",
            ),
            node(
                "urban_planning",
                "Urban Planning",
                800,
                4,
                &["basic_engineering"],
                vec![ResearchEffect::UnlockBuilding {
                    kind: "plaza".into(),
                }],
                "infrastructure",
            ),
            node(
                "renewable_energy",
                "Renewable Energy",
                1000,
                5,
                &["basic_engineering"],
                vec![ResearchEffect::UnlockBuilding {
                    kind: "solar_panel".into(),
                }],
                "energy",
            ),
            node(
                "smart_grid",
                "Smart Grid",
                1500,
                6,
                &["renewable_energy"],
                vec![
                    ResearchEffect::EfficiencyBonus { amount: 10.0 },
                    ResearchEffect::UnlockBuilding {
                        kind: "wind_turbine".into(),
                    },
                ],
                "energy",
            ),
            node(
                "disaster_preparedness",
                "Disaster Preparedness",
                1200,
                5,
                &["urban_planning"],
                vec![ResearchEffect::DisasterRiskReduction { amount: 0.15 }],
                "safety",
            ),
            node(
                "early_warning",
                "Early Warning Network",
                2000,
                7,
                &["disaster_preparedness", "smart_grid"],
                vec![ResearchEffect::DisasterRiskReduction { amount: 0.25 }],
                "safety",
            ),
            node(
                "trade_logistics",
                "Trade Logistics",
                900,
                4,
                &["basic_engineering"],
                vec![ResearchEffect::IncomeBonus { amount: 0.1 }],
                "commerce",
            ),
            node(
                "market_analytics",
                "Market Analytics",
                1600,
                6,
                &["trade_logistics"],
                vec![ResearchEffect::IncomeBonus { amount: 0.2 }],
                "commerce",
            ),
            node(
                "automation",
                "Automation",
                2200,
                8,
                &["smart_grid"],
                vec![
                    ResearchEffect::UnlockBuilding {
                        kind: "automated_factory".into(),
                    },
                    ResearchEffect::EfficiencyBonus { amount: 15.0 },
                ],
                "technology",
            ),
            node(
                "arcology",
                "Arcology",
                3500,
                10,
                &["automation", "early_warning", "market_analytics"],
                vec![
                    ResearchEffect::UnlockBuilding {
                        kind: "arcology".into(),
                    },
                    ResearchEffect::IncomeBonus { amount: 0.3 },
                ],
                "technology",
            ),
        ];

        Self {
            disasters,
            goods,
            routes,
            research,
        }
    }
}

fn good(id: &str, label: &str, base_price: f64, demand: f64, supply: f64, category: &str) -> TradeGoodConfig {
    TradeGoodConfig {
        id: id.into(),
        label: label.into(),
        base_price,
        demand,
        supply,
        category: category.into(),
    }
}

fn node(
    id: &str,
    label: &str,
    cost: i64,
    research_days: Day,
    prerequisites: &[&str],
    effects: Vec<ResearchEffect>,
    category: &str,
) -> ResearchNodeConfig {
    ResearchNodeConfig {
        id: id.into(),
        label: label.into(),
        cost,
        research_days,
        prerequisites: prerequisites.iter().map(|p| p.to_string()).collect(),
        effects,
        category: category.into(),
    }
}
