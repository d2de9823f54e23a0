use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    analytics::{CurrentStage, OrderHealth, Period, StageStats, TimelineEntry},
    error::AppResult,
    handlers::{AppState, ViewQuery},
    models::{MoveOutcome, OrderDraft, QuoteStatus},
    services::{self, HeadlineCounts},
};

#[derive(Serialize)]
pub struct StageRankingResponse {
    generated_at: DateTime<Utc>,
    period: Option<Period>,
    ranking: Vec<StageStats>,
}

#[derive(Serialize)]
pub struct OrderHealthResponse {
    generated_at: DateTime<Utc>,
    period: Option<Period>,
    counts: HeadlineCounts,
    orders: Vec<OrderHealth>,
}

#[derive(Serialize)]
pub struct TimelineResponse {
    order_id: i32,
    code: String,
    current: Option<CurrentStage>,
    entries: Vec<TimelineEntry>,
}

#[derive(Deserialize)]
pub struct MoveBody {
    stage: String,
    status: String,
    responsible_id: Option<i32>,
    note: Option<String>,
}

#[derive(Serialize)]
pub struct MoveResponse {
    changed: bool,
    message: String,
    #[serde(flatten)]
    outcome: MoveOutcome,
}

#[derive(Deserialize)]
pub struct QuoteStatusBody {
    status: String,
}

#[derive(Serialize)]
pub struct QuoteStatusResponse {
    quote_id: i32,
    status: QuoteStatus,
}

#[derive(Serialize)]
pub struct GeneratedOrderResponse {
    order_id: i32,
    code: String,
    created: bool,
    message: String,
}

pub async fn stage_ranking(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> AppResult<Json<StageRankingResponse>> {
    let ctx = query.context(Utc::now(), state.zone)?;
    let snapshot = services::load_snapshot(state.store.as_ref(), &ctx).await?;

    Ok(Json(StageRankingResponse {
        generated_at: ctx.now,
        period: ctx.period,
        ranking: snapshot.report.ranking,
    }))
}

pub async fn order_health(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> AppResult<Json<OrderHealthResponse>> {
    let ctx = query.context(Utc::now(), state.zone)?;
    let snapshot = services::load_snapshot(state.store.as_ref(), &ctx).await?;

    Ok(Json(OrderHealthResponse {
        generated_at: ctx.now,
        period: ctx.period,
        counts: HeadlineCounts::from_report(&snapshot.report),
        orders: snapshot.report.orders,
    }))
}

pub async fn order_timeline(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
    Query(query): Query<ViewQuery>,
) -> AppResult<Json<TimelineResponse>> {
    let ctx = query.context(Utc::now(), state.zone)?;
    let detail = services::production::order_detail(state.store.as_ref(), order_id, ctx.now).await?;

    Ok(Json(TimelineResponse {
        order_id,
        code: detail.order.code,
        current: detail.current,
        entries: detail.timeline,
    }))
}

pub async fn move_order(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
    Json(body): Json<MoveBody>,
) -> AppResult<Json<MoveResponse>> {
    let outcome = services::production::move_order(
        state.store.as_ref(),
        order_id,
        &body.stage,
        &body.status,
        body.responsible_id,
        body.note,
        Utc::now(),
    )
    .await?;

    Ok(Json(MoveResponse {
        changed: outcome.changed(),
        message: outcome.message(),
        outcome,
    }))
}

pub async fn set_quote_status(
    State(state): State<AppState>,
    Path(quote_id): Path<i32>,
    Json(body): Json<QuoteStatusBody>,
) -> AppResult<Json<QuoteStatusResponse>> {
    let status = services::quotes::set_quote_status(state.store.as_ref(), quote_id, &body.status, Utc::now()).await?;
    Ok(Json(QuoteStatusResponse { quote_id, status }))
}

pub async fn generate_order(
    State(state): State<AppState>,
    Path(quote_id): Path<i32>,
    Json(draft): Json<OrderDraft>,
) -> AppResult<(StatusCode, Json<GeneratedOrderResponse>)> {
    let generated = services::quotes::generate_order(state.store.as_ref(), quote_id, draft, Utc::now()).await?;

    let status = if generated.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(GeneratedOrderResponse {
            message: generated.message(),
            order_id: generated.order_id,
            code: generated.code,
            created: generated.created,
        }),
    ))
}
