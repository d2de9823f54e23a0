use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::analytics::{
    build_report, current_stage_for, order_timeline, CurrentStage, ProductionReport, TimelineEntry, TrafficLight,
    ViewContext,
};
use crate::error::{AppError, AppResult};
use crate::models::{MoveOutcome, MoveRequest, OrderSummary, Stage, StageStatus};
use crate::store::ProductionStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardCard {
    pub order_id: i32,
    pub code: String,
    pub customer_name: String,
    pub status: StageStatus,
    pub responsible_name: Option<String>,
    pub expected_delivery: Option<NaiveDate>,
    pub days_open: Option<f64>,
    pub light: TrafficLight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardColumn {
    pub stage: Stage,
    pub cards: Vec<BoardCard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeadlineCounts {
    pub active_orders: usize,
    pub in_manufacturing: usize,
    pub bottlenecks: usize,
    pub without_baseline: usize,
}

impl HeadlineCounts {
    pub fn from_report(report: &ProductionReport) -> Self {
        Self {
            active_orders: report.orders.len(),
            in_manufacturing: report.count_in_stage(Stage::Manufacturing),
            bottlenecks: report.count_light(TrafficLight::Red),
            without_baseline: report.count_light(TrafficLight::Gray),
        }
    }
}

/// Active orders plus the report computed over them.
pub struct Snapshot {
    pub orders: Vec<OrderSummary>,
    pub report: ProductionReport,
}

pub async fn load_snapshot(store: &dyn ProductionStore, ctx: &ViewContext) -> AppResult<Snapshot> {
    let orders = store.active_orders().await?;
    let ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
    let transitions = store.transitions_for(&ids).await?;
    log::debug!("snapshot: {} orders, {} transitions", orders.len(), transitions.len());

    let report = build_report(&orders, &transitions, ctx);
    Ok(Snapshot { orders, report })
}

/// Kanban columns for the board stages. Every active order gets a card in
/// the column of its recorded stage; orders outside the report (filtered out
/// by period) show up gray.
pub fn build_board(orders: &[OrderSummary], report: &ProductionReport) -> Vec<BoardColumn> {
    Stage::board_stages()
        .into_iter()
        .map(|stage| {
            let cards = orders
                .iter()
                .filter(|order| order.current_stage == stage)
                .map(|order| {
                    let health = report.health_of(order.id);
                    BoardCard {
                        order_id: order.id,
                        code: order.code.clone(),
                        customer_name: order.customer_name.clone(),
                        status: order.position().status,
                        responsible_name: order.responsible_name.clone(),
                        expected_delivery: order.expected_delivery,
                        days_open: health.and_then(|h| h.days_open),
                        light: health.map(|h| h.light).unwrap_or(TrafficLight::Gray),
                    }
                })
                .collect();
            BoardColumn { stage, cards }
        })
        .collect()
}

/// Validates the submitted names and applies the move.
pub async fn move_order(
    store: &dyn ProductionStore,
    order_id: i32,
    stage: &str,
    status: &str,
    responsible_id: Option<i32>,
    note: Option<String>,
    at: DateTime<Utc>,
) -> AppResult<MoveOutcome> {
    let request = MoveRequest::parse(order_id, stage, status, responsible_id, note)?;
    let outcome = store.move_order(&request, at).await?;

    match &outcome {
        MoveOutcome::Moved {
            transition_id,
            closed_transitions,
            event_id,
        } => {
            log::info!(
                "order {} moved to {} / {} (transition {}, closed {})",
                order_id,
                request.stage,
                request.status,
                transition_id,
                closed_transitions
            );
            if event_id.is_none() {
                log::warn!("order {} moved without an automation event", order_id);
            }
        }
        MoveOutcome::Unchanged => {
            log::info!("order {} already in {} / {}", order_id, request.stage, request.status)
        }
    }

    Ok(outcome)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetail {
    pub order: OrderSummary,
    pub current: Option<CurrentStage>,
    pub timeline: Vec<TimelineEntry>,
}

pub async fn order_detail(
    store: &dyn ProductionStore,
    order_id: i32,
    now: DateTime<Utc>,
) -> AppResult<OrderDetail> {
    let order = store
        .order(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Pedido não encontrado.".to_string()))?;
    let transitions = store.transitions_for(&[order_id]).await?;

    Ok(OrderDetail {
        order,
        current: current_stage_for(order_id, &transitions, now),
        timeline: order_timeline(order_id, &transitions, now),
    })
}
