use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use crate::models::production::{Stage, StagePosition, StageStatus};

/// Order status meaning the order left the workshop for good.
pub const ORDER_CANCELLED: &str = "Cancelado";
pub const ORDER_OPEN: &str = "Aberto";

/// `pedidos` joined with customer and responsible names.
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: i32,
    pub code: Option<String>,
    pub customer_id: Option<i32>,
    pub customer_name: Option<String>,
    pub quote_id: Option<i32>,
    pub status: Option<String>,
    pub current_stage: Option<String>,
    pub current_status: Option<String>,
    pub responsible_id: Option<i32>,
    pub responsible_name: Option<String>,
    pub expected_delivery: Option<NaiveDate>,
    pub total: Option<Decimal>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub id: i32,
    pub code: String,
    pub customer_id: Option<i32>,
    pub customer_name: String,
    pub quote_id: Option<i32>,
    pub status: String,
    pub current_stage: Stage,
    pub current_status: StageStatus,
    pub responsible_id: Option<i32>,
    pub responsible_name: Option<String>,
    pub expected_delivery: Option<NaiveDate>,
    pub total: Decimal,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OrderSummary {
    pub fn position(&self) -> StagePosition {
        StagePosition {
            stage: self.current_stage,
            status: self.current_status,
        }
    }
}

impl From<OrderRow> for OrderSummary {
    fn from(row: OrderRow) -> Self {
        let current_stage = match row.current_stage.as_deref().map(str::parse::<Stage>) {
            Some(Ok(stage)) => stage,
            Some(Err(_)) => {
                log::warn!(
                    "order {} has unknown stage {:?}, showing it in {}",
                    row.id,
                    row.current_stage,
                    Stage::first()
                );
                Stage::first()
            }
            None => Stage::first(),
        };
        let current_status = row
            .current_status
            .as_deref()
            .and_then(|s| s.parse::<StageStatus>().ok())
            .unwrap_or_default();

        Self {
            id: row.id,
            code: row.code.unwrap_or_else(|| format!("#{}", row.id)),
            customer_id: row.customer_id,
            customer_name: row.customer_name.unwrap_or_default(),
            quote_id: row.quote_id,
            status: row.status.unwrap_or_else(|| ORDER_OPEN.to_string()),
            current_stage,
            current_status,
            responsible_id: row.responsible_id,
            responsible_name: row.responsible_name,
            expected_delivery: row.expected_delivery,
            total: row.total.unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Fields needed to open a new order. Every order starts in the first stage.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: Option<i32>,
    pub quote_id: Option<i32>,
    pub responsible_id: Option<i32>,
    pub expected_delivery: Option<NaiveDate>,
    pub total: Decimal,
    pub notes: String,
}

/// Human readable code, e.g. `PED251018143005`, stamped in the operating zone.
pub fn document_code(prefix: &str, at: DateTime<Utc>, zone: FixedOffset) -> String {
    format!("{}{}", prefix, at.with_timezone(&zone).format("%y%m%d%H%M%S"))
}

pub fn order_code(at: DateTime<Utc>, zone: FixedOffset) -> String {
    document_code("PED", at, zone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row() -> OrderRow {
        OrderRow {
            id: 3,
            code: None,
            customer_id: Some(1),
            customer_name: None,
            quote_id: None,
            status: None,
            current_stage: Some("Mistério".to_string()),
            current_status: Some("Pausado".to_string()),
            responsible_id: None,
            responsible_name: None,
            expected_delivery: None,
            total: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn unknown_stage_falls_back_to_first_column() {
        let summary = OrderSummary::from(row());
        assert_eq!(summary.current_stage, Stage::TechnicalMeasurement);
        assert_eq!(summary.current_status, StageStatus::Paused);
        assert_eq!(summary.code, "#3");
        assert_eq!(summary.status, ORDER_OPEN);
    }

    #[test]
    fn order_code_uses_operating_zone() {
        let at = Utc.with_ymd_and_hms(2025, 10, 18, 2, 30, 5).unwrap();
        let fortaleza = FixedOffset::west_opt(3 * 3600).unwrap();
        assert_eq!(order_code(at, fortaleza), "PED251017233005");
    }
}
