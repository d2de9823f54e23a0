use chrono::{DateTime, Utc};

use crate::error::AppResult;
use crate::models::{GeneratedOrder, OrderDraft, QuoteStatus};
use crate::store::ProductionStore;

pub async fn set_quote_status(
    store: &dyn ProductionStore,
    quote_id: i32,
    status: &str,
    at: DateTime<Utc>,
) -> AppResult<QuoteStatus> {
    let status = status.parse::<QuoteStatus>()?;
    store.set_quote_status(quote_id, status, at).await?;
    log::info!("quote {} set to {}", quote_id, status);
    Ok(status)
}

/// Turns an approved quote into an order. Calling it again for the same
/// quote returns the order created the first time.
pub async fn generate_order(
    store: &dyn ProductionStore,
    quote_id: i32,
    draft: OrderDraft,
    at: DateTime<Utc>,
) -> AppResult<GeneratedOrder> {
    let generated = store.generate_order_from_quote(quote_id, draft, at).await?;
    if !generated.created {
        log::info!("quote {} already has order {}", quote_id, generated.code);
    }
    Ok(generated)
}
