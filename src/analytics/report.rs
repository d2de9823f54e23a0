use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::context::ViewContext;
use super::current::current_stages;
use super::duration::resolve;
use super::stats::{aggregate, bottleneck_ranking, stats_for, StageStats};
use super::traffic::{classify, TrafficLight};
use crate::models::{OrderSummary, Stage, StageStatus, StageTransition};

/// Health of one order in its current stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderHealth {
    pub order_id: i32,
    pub code: String,
    pub customer_name: String,
    pub stage: Stage,
    pub status: StageStatus,
    /// `None` when no open transition exists and the stage comes from the
    /// order row alone.
    pub days_open: Option<f64>,
    pub since: Option<DateTime<Utc>>,
    pub baseline_days: Option<f64>,
    pub light: TrafficLight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionReport {
    pub generated_at: DateTime<Utc>,
    pub stages: BTreeMap<Stage, StageStats>,
    pub ranking: Vec<StageStats>,
    pub orders: Vec<OrderHealth>,
}

impl ProductionReport {
    pub fn health_of(&self, order_id: i32) -> Option<&OrderHealth> {
        self.orders.iter().find(|o| o.order_id == order_id)
    }

    pub fn count_light(&self, light: TrafficLight) -> usize {
        self.orders.iter().filter(|o| o.light == light).count()
    }

    pub fn count_in_stage(&self, stage: Stage) -> usize {
        self.orders.iter().filter(|o| o.stage == stage).count()
    }
}

/// Builds stage statistics and per-order health from one snapshot. Orders
/// outside the context's period are left out, and so are their transitions.
pub fn build_report(
    orders: &[OrderSummary],
    transitions: &[StageTransition],
    ctx: &ViewContext,
) -> ProductionReport {
    let selected: Vec<&OrderSummary> = orders.iter().filter(|o| ctx.includes(o)).collect();
    let scoped: Vec<StageTransition> = if ctx.period.is_some() {
        transitions
            .iter()
            .filter(|t| selected.iter().any(|o| o.id == t.order_id))
            .cloned()
            .collect()
    } else {
        transitions.to_vec()
    };

    let stages = aggregate(&scoped, ctx.now);
    let residency = current_stages(&scoped, ctx.now);

    let orders = selected
        .into_iter()
        .map(|order| {
            let current = residency.get(&order.id);
            let stage = current.map(|c| c.stage).unwrap_or(order.current_stage);
            let status = current.map(|c| c.status).unwrap_or(order.current_status);
            let days_open = current.map(|c| c.days_open);
            let baseline_days = stats_for(&stages, stage).baseline();

            OrderHealth {
                order_id: order.id,
                code: order.code.clone(),
                customer_name: order.customer_name.clone(),
                stage,
                status,
                days_open,
                since: current.map(|c| c.since),
                baseline_days,
                light: classify(days_open, baseline_days),
            }
        })
        .collect();

    ProductionReport {
        generated_at: ctx.now,
        ranking: bottleneck_ranking(&stages),
        stages,
        orders,
    }
}

/// One resolved stay of an order, for its timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub transition_id: i32,
    pub stage: Stage,
    pub status: StageStatus,
    pub responsible_id: Option<i32>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub days: f64,
    pub note: String,
}

/// Chronological stays of one order. Transitions without a usable start are
/// dropped, as everywhere else.
pub fn order_timeline(order_id: i32, transitions: &[StageTransition], now: DateTime<Utc>) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = transitions
        .iter()
        .filter(|t| t.order_id == order_id)
        .filter_map(|t| {
            resolve(t, now).map(|span| TimelineEntry {
                transition_id: t.id,
                stage: t.stage,
                status: t.status,
                responsible_id: t.responsible_id,
                start: span.start,
                end: (!span.open).then_some(span.end),
                days: span.days,
                note: t.note.clone(),
            })
        })
        .collect();

    entries.sort_by_key(|e| (e.start, e.transition_id));
    entries
}
