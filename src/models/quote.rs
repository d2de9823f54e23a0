use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteStatus {
    #[serde(rename = "Aberto")]
    Open,
    #[serde(rename = "Rascunho")]
    Draft,
    #[serde(rename = "Aprovado")]
    Approved,
    #[serde(rename = "Cancelado")]
    Cancelled,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 4] = [
        QuoteStatus::Open,
        QuoteStatus::Draft,
        QuoteStatus::Approved,
        QuoteStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Open => "Aberto",
            QuoteStatus::Draft => "Rascunho",
            QuoteStatus::Approved => "Aprovado",
            QuoteStatus::Cancelled => "Cancelado",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        QuoteStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| AppError::InvalidArgument("Status inválido.".to_string()))
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct QuoteRow {
    pub id: i32,
    pub customer_id: Option<i32>,
    pub status: Option<String>,
    pub estimated_total: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct QuoteItem {
    pub id: i32,
    pub description: String,
    pub quantity: Option<Decimal>,
    pub unit: Option<String>,
    pub unit_price: Option<Decimal>,
    pub subtotal: Option<Decimal>,
}

impl QuoteItem {
    /// Zero counts as unset, like a blank field on the quote form.
    pub fn quantity(&self) -> Decimal {
        self.quantity.filter(|q| !q.is_zero()).unwrap_or(Decimal::ONE)
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price.unwrap_or_default()
    }

    pub fn unit(&self) -> &str {
        self.unit.as_deref().unwrap_or("Unid.")
    }

    /// Stored subtotal, or quantity × unit price when the row has none
    /// (the column defaults to zero).
    pub fn line_total(&self) -> Decimal {
        self.subtotal
            .filter(|s| !s.is_zero())
            .unwrap_or_else(|| round_money(self.quantity() * self.unit_price()))
    }
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Operator input when turning an approved quote into an order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderDraft {
    pub responsible_id: Option<i32>,
    pub expected_delivery: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedOrder {
    pub order_id: i32,
    pub code: String,
    /// `false` when the quote already had an order and nothing was written.
    pub created: bool,
}

impl GeneratedOrder {
    pub fn message(&self) -> String {
        if self.created {
            format!("Pedido criado. Código {}", self.code)
        } else {
            format!("Já existe pedido para este orçamento. Código {}", self.code)
        }
    }
}
