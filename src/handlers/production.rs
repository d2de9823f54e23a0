use axum::{
    extract::{Form, Path, Query, State},
    response::{Html, Redirect},
};
use askama::Template;
use chrono::Utc;
use serde::Deserialize;

use crate::{
    analytics::StageStats,
    error::{AppError, AppResult},
    filters,
    handlers::{parse_optional_id, AppState, ViewQuery},
    models::{Employee, Stage, StageStatus},
    services::{self, build_board, BoardColumn, HeadlineCounts},
    utils::format_local,
};

#[derive(Template)]
#[template(path = "production.html")]
struct ProductionTemplate {
    board: Vec<BoardColumn>,
    ranking: Vec<StageStats>,
    counts: HeadlineCounts,
    employees: Vec<Employee>,
    stages: Vec<Stage>,
    statuses: Vec<StageStatus>,
    year: String,
    month: String,
    notice: Option<String>,
    generated_at: String,
}

#[derive(Deserialize)]
pub struct MoveForm {
    stage: String,
    status: String,
    #[serde(default)]
    responsible_id: String, // empty option in the select
    #[serde(default)]
    note: String,
}

pub async fn production_page(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> AppResult<Html<String>> {
    let ctx = query.context(Utc::now(), state.zone)?;
    let snapshot = services::load_snapshot(state.store.as_ref(), &ctx).await?;
    let employees = state.store.employees().await?;

    let template = ProductionTemplate {
        board: build_board(&snapshot.orders, &snapshot.report),
        counts: HeadlineCounts::from_report(&snapshot.report),
        ranking: snapshot.report.ranking,
        employees,
        stages: Stage::board_stages(),
        statuses: StageStatus::ALL.to_vec(),
        year: ctx.period.map(|p| p.year.to_string()).unwrap_or_default(),
        month: ctx.period.map(|p| p.month.to_string()).unwrap_or_default(),
        notice: query.notice.filter(|n| !n.trim().is_empty()),
        generated_at: format_local(ctx.now, ctx.zone),
    };
    Ok(Html(template.render()?))
}

/// Form post from a Kanban card. Operator mistakes come back as a notice on
/// the board instead of an error page.
pub async fn move_from_board(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
    Form(form): Form<MoveForm>,
) -> AppResult<Redirect> {
    let result = match parse_optional_id(&form.responsible_id) {
        Ok(responsible_id) => {
            services::production::move_order(
                state.store.as_ref(),
                order_id,
                &form.stage,
                &form.status,
                responsible_id,
                Some(form.note),
                Utc::now(),
            )
            .await
        }
        Err(e) => Err(e),
    };

    let notice = match result {
        Ok(outcome) => outcome.message(),
        Err(e @ (AppError::InvalidArgument(_) | AppError::NotFound(_))) => e.to_string(),
        Err(e) => return Err(e),
    };

    Ok(Redirect::to(&format!(
        "/production?notice={}",
        urlencoding::encode(&notice)
    )))
}
