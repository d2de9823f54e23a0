pub mod api;
pub mod orders;
pub mod production;

use std::sync::Arc;

use axum::{
    response::Redirect,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::analytics::{Period, ViewContext};
use crate::error::{AppError, AppResult};
use crate::store::ProductionStore;
use crate::utils::parse_timestamp;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductionStore>,
    pub zone: FixedOffset,
}

impl AppState {
    pub fn new(store: Arc<dyn ProductionStore>, zone: FixedOffset) -> Self {
        Self { store, zone }
    }
}

/// Query string shared by the board and the analytics API. Everything is
/// taken as text so empty form fields mean "not set".
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub now: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
    pub notice: Option<String>,
}

impl ViewQuery {
    pub fn context(&self, clock: DateTime<Utc>, zone: FixedOffset) -> AppResult<ViewContext> {
        let now = match non_empty(&self.now) {
            Some(raw) => parse_timestamp(raw, zone)
                .ok_or_else(|| AppError::InvalidArgument(format!("Data inválida: {}", raw)))?,
            None => clock,
        };
        Ok(ViewContext::new(now, zone).with_period(self.period()?))
    }

    pub fn period(&self) -> AppResult<Option<Period>> {
        match (non_empty(&self.year), non_empty(&self.month)) {
            (None, None) => Ok(None),
            (Some(year), Some(month)) => {
                let year = year
                    .parse::<i32>()
                    .map_err(|_| AppError::InvalidArgument(format!("Ano inválido: {}", year)))?;
                let period = month
                    .parse::<u32>()
                    .ok()
                    .and_then(|month| Period::new(year, month))
                    .ok_or_else(|| AppError::InvalidArgument(format!("Mês inválido: {}", month)))?;
                Ok(Some(period))
            }
            _ => Err(AppError::InvalidArgument("Informe ano e mês.".to_string())),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Optional id coming from a `<select>` where the empty option means none.
pub fn parse_optional_id(raw: &str) -> AppResult<Option<i32>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i32>()
        .map(Some)
        .map_err(|_| AppError::InvalidArgument(format!("Responsável inválido: {}", raw)))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::permanent("/production") }))
        // Board
        .route("/production", get(production::production_page))
        .route("/production/orders/:id/move", post(production::move_from_board))
        .route("/orders/:id", get(orders::order_page))
        // JSON API
        .route("/api/production/stages", get(api::stage_ranking))
        .route("/api/production/orders", get(api::order_health))
        .route("/api/orders/:id/timeline", get(api::order_timeline))
        .route("/api/orders/:id/move", post(api::move_order))
        .route("/api/quotes/:id/status", post(api::set_quote_status))
        .route("/api/quotes/:id/order", post(api::generate_order))
        .nest_service("/static", ServeDir::new("static"))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
