//! Persistence seam for the production board.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppResult;
use crate::models::{
    Employee, GeneratedOrder, MoveOutcome, MoveRequest, OrderDraft, OrderSummary, QuoteStatus,
    StageTransition,
};

pub use postgres::PgProductionStore;

#[async_trait]
pub trait ProductionStore: Send + Sync {
    /// Non-cancelled orders, most recently updated first.
    async fn active_orders(&self) -> AppResult<Vec<OrderSummary>>;

    async fn order(&self, order_id: i32) -> AppResult<Option<OrderSummary>>;

    /// Active employees by name.
    async fn employees(&self) -> AppResult<Vec<Employee>>;

    /// Transitions of the given orders, ordered by order and effective start.
    async fn transitions_for(&self, order_ids: &[i32]) -> AppResult<Vec<StageTransition>>;

    /// Applies a validated move atomically. Leaves everything untouched and
    /// reports [`MoveOutcome::Unchanged`] when the order already sits in the
    /// requested stage and status.
    async fn move_order(&self, request: &MoveRequest, at: DateTime<Utc>) -> AppResult<MoveOutcome>;

    async fn set_quote_status(&self, quote_id: i32, status: QuoteStatus, at: DateTime<Utc>) -> AppResult<()>;

    /// Opens an order for an approved quote, in the first stage and with its
    /// first transition, copying the quote items.
    async fn generate_order_from_quote(
        &self,
        quote_id: i32,
        draft: OrderDraft,
        at: DateTime<Utc>,
    ) -> AppResult<GeneratedOrder>;
}
