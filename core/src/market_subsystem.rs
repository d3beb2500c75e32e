//! Trade market subsystem.
//!
//! This subsystem:
//!   1. Redraws every good's market trend each day (no smoothing — the
//!      prior trend is discarded)
//!   2. Settles in-transit trades once their travel time elapses
//!   3. Handles buy orders (coins out now, settlement after transit)
//!   4. Handles sell orders (inventory out and coins in immediately)
//!
//! The buy/sell asymmetry — buys travel, sells are instant — is the
//! shipped game behavior and is kept as-is.
//!
//! Execution: every tick, after disasters.
//! Depends on: player level (route gates), the shared ledger.

use crate::{
    config::{TradeGoodConfig, TradeRouteConfig},
    error::{SimResult, ValidationError},
    event::{GoodMap, NotifyLevel, SimEvent},
    rng::SubsystemRng,
    state::{CityState, PlayerLedger},
    subsystem::{reject, SimSubsystem},
    types::{Day, GoodId, RouteId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A buy order in transit. The settlement key `{route}_{good}_{day}` is
/// not unique if two identical orders depart the same day; settlement
/// handles each entry independently, so duplicates settle as duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveTrade {
    pub key: String,
    pub route_id: RouteId,
    pub good_id: GoodId,
    pub quantity: u32,
    pub departure_day: Day,
}

pub struct MarketSubsystem {
    goods: BTreeMap<GoodId, TradeGoodConfig>,
    routes: BTreeMap<RouteId, TradeRouteConfig>,
    trends: GoodMap<f64>,
    active: Vec<ActiveTrade>,
}

impl MarketSubsystem {
    pub fn new(goods: Vec<TradeGoodConfig>, routes: Vec<TradeRouteConfig>) -> Self {
        Self {
            goods: goods.into_iter().map(|g| (g.id.clone(), g)).collect(),
            routes: routes.into_iter().map(|r| (r.id.clone(), r)).collect(),
            trends: GoodMap::new(),
            active: Vec::new(),
        }
    }

    /// Current per-good price trend, in [-0.2, 0.3].
    pub fn trends(&self) -> &GoodMap<f64> {
        &self.trends
    }

    pub fn active_trades(&self) -> &[ActiveTrade] {
        &self.active
    }

    pub fn route(&self, route_id: &str) -> Option<&TradeRouteConfig> {
        self.routes.get(route_id)
    }

    /// Redraw every trend from scratch. A good listed on several routes
    /// is drawn once per route; the last route's draw wins, matching the
    /// per-route recompute of the shipped game.
    fn recompute_trends(&mut self, rng: &mut SubsystemRng) {
        let mut fresh = GoodMap::new();
        for route in self.routes.values() {
            for good_id in &route.goods {
                let draw = (rng.next_f64() - 0.4) * 0.5;
                fresh.insert(good_id.clone(), draw);
            }
        }
        self.trends = fresh;
    }

    /// Settle every trade whose transit is over. Each settles exactly
    /// once: settled trades leave the active list here and now.
    fn settle_arrivals(&mut self, day: Day, ledger: &mut PlayerLedger) -> Vec<SimEvent> {
        let mut events = Vec::new();
        let pending = std::mem::take(&mut self.active);

        for trade in pending {
            let travel_days = self
                .routes
                .get(&trade.route_id)
                .map(|r| r.travel_days)
                .unwrap_or(0);
            if day < trade.departure_day + travel_days {
                self.active.push(trade);
                continue;
            }

            let good = match self.goods.get(&trade.good_id) {
                Some(g) => g,
                None => continue,
            };
            let trend = self.trends.get(&trade.good_id).copied().unwrap_or(0.0);
            let final_price = good.base_price * good.demand * (1.0 + trend);
            let profit = (final_price - good.base_price) * trade.quantity as f64;
            let proceeds = (final_price * trade.quantity as f64).round() as i64;
            ledger.coins += proceeds;

            let level = if profit > 0.0 {
                NotifyLevel::Success
            } else {
                NotifyLevel::Warning
            };
            events.push(SimEvent::TradeSettled {
                day,
                key: trade.key.clone(),
                route_id: trade.route_id.clone(),
                good_id: trade.good_id.clone(),
                quantity: trade.quantity,
                profit,
                proceeds,
            });
            events.push(SimEvent::Notification {
                day,
                level,
                message: format!(
                    "Shipment of {} {} settled for {proceeds} coins ({profit:+.0} profit)",
                    trade.quantity, good.label
                ),
            });
            log::info!(
                "day={day} market: trade {} settled, profit {profit:.1}",
                trade.key
            );
        }

        events
    }

    /// Shared route/good validation for buy and sell orders.
    fn check_route(
        &self,
        city: &CityState,
        route_id: &str,
        good_id: &str,
    ) -> Result<&TradeRouteConfig, ValidationError> {
        let route = self
            .routes
            .get(route_id)
            .ok_or_else(|| ValidationError::UnknownRoute {
                route: route_id.to_string(),
            })?;
        if city.player_level < route.min_level {
            return Err(ValidationError::RouteLocked {
                route: route_id.to_string(),
                required_level: route.min_level,
            });
        }
        if !route.goods.iter().any(|g| g == good_id) {
            return Err(ValidationError::GoodNotTraded {
                route: route_id.to_string(),
                good: good_id.to_string(),
            });
        }
        Ok(route)
    }

    /// Place a buy order: pay the base price now, settle after transit.
    pub fn buy(
        &mut self,
        day: Day,
        city: &CityState,
        ledger: &mut PlayerLedger,
        route_id: &str,
        good_id: &str,
        quantity: u32,
    ) -> Vec<SimEvent> {
        let route = match self.check_route(city, route_id, good_id) {
            Ok(r) => r,
            Err(err) => return reject(day, "buy_good", &err),
        };
        let good = &self.goods[good_id];

        let cost = (good.base_price * quantity as f64).round() as i64;
        if ledger.coins < cost {
            return reject(
                day,
                "buy_good",
                &ValidationError::InsufficientCoins {
                    needed: cost,
                    available: ledger.coins,
                },
            );
        }

        ledger.coins -= cost;
        let arrival_day = day + route.travel_days;
        let key = format!("{route_id}_{good_id}_{day}");
        self.active.push(ActiveTrade {
            key: key.clone(),
            route_id: route_id.to_string(),
            good_id: good_id.to_string(),
            quantity,
            departure_day: day,
        });

        log::info!(
            "day={day} market: bought {quantity} {good_id} on {route_id} for {cost}, arrives day {arrival_day}"
        );
        vec![SimEvent::TradeDeparted {
            day,
            key,
            route_id: route_id.to_string(),
            good_id: good_id.to_string(),
            quantity,
            cost,
            arrival_day,
        }]
    }

    /// Sell from inventory at today's trend price. Unlike buys, sells
    /// settle immediately — no transit leg.
    pub fn sell(
        &mut self,
        day: Day,
        city: &CityState,
        ledger: &mut PlayerLedger,
        route_id: &str,
        good_id: &str,
        quantity: u32,
    ) -> Vec<SimEvent> {
        if let Err(err) = self.check_route(city, route_id, good_id) {
            return reject(day, "sell_good", &err);
        }
        let good = &self.goods[good_id];

        let held = ledger.stock(good_id);
        if held < quantity {
            return reject(
                day,
                "sell_good",
                &ValidationError::InsufficientInventory {
                    good: good_id.to_string(),
                    needed: quantity,
                    available: held,
                },
            );
        }

        let trend = self.trends.get(good_id).copied().unwrap_or(0.0);
        let proceeds =
            (good.base_price * good.demand * (1.0 + trend) * quantity as f64).round() as i64;
        ledger.remove_stock(good_id, quantity);
        ledger.coins += proceeds;

        log::info!("day={day} market: sold {quantity} {good_id} for {proceeds}");
        vec![SimEvent::GoodsSold {
            day,
            route_id: route_id.to_string(),
            good_id: good_id.to_string(),
            quantity,
            proceeds,
        }]
    }
}

impl SimSubsystem for MarketSubsystem {
    fn name(&self) -> &'static str {
        "market"
    }

    fn update(
        &mut self,
        day: Day,
        _city: &CityState,
        ledger: &mut PlayerLedger,
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        // Trends first: arrivals settle at today's prices.
        self.recompute_trends(rng);
        log::debug!("day={day} market: {} trends redrawn", self.trends.len());

        Ok(self.settle_arrivals(day, ledger))
    }
}
