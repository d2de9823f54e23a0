use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use askama::Template;
use chrono::Utc;

use crate::{
    error::AppResult,
    filters,
    handlers::{AppState, ViewQuery},
    models::{OrderSummary, Stage, StageStatus},
    services,
    utils::format_local,
};

struct TimelineRow {
    stage: Stage,
    status: StageStatus,
    start: String,
    end: String,
    days: Option<f64>,
    note: String,
    open: bool,
}

#[derive(Template)]
#[template(path = "order_timeline.html")]
struct OrderTimelineTemplate {
    order: OrderSummary,
    days_in_stage: Option<f64>,
    expected_delivery: String,
    rows: Vec<TimelineRow>,
}

pub async fn order_page(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
    Query(query): Query<ViewQuery>,
) -> AppResult<Html<String>> {
    let ctx = query.context(Utc::now(), state.zone)?;
    let detail = services::production::order_detail(state.store.as_ref(), order_id, ctx.now).await?;

    let rows = detail
        .timeline
        .into_iter()
        .map(|entry| TimelineRow {
            stage: entry.stage,
            status: entry.status,
            start: format_local(entry.start, state.zone),
            end: entry
                .end
                .map(|end| format_local(end, state.zone))
                .unwrap_or_else(|| "em aberto".to_string()),
            days: Some(entry.days),
            note: entry.note,
            open: entry.end.is_none(),
        })
        .collect();

    let order = detail.order;
    let template = OrderTimelineTemplate {
        days_in_stage: detail.current.map(|c| c.days_open),
        expected_delivery: order
            .expected_delivery
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "-".to_string()),
        order,
        rows,
    };
    Ok(Html(template.render()?))
}
