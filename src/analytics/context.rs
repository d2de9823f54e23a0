use chrono::{DateTime, Datelike, FixedOffset, Utc};
use serde::Serialize;

use crate::models::OrderSummary;

/// Calendar month filter, evaluated in the operating zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn contains(&self, at: DateTime<Utc>, zone: FixedOffset) -> bool {
        let local = at.with_timezone(&zone);
        local.year() == self.year && local.month() == self.month
    }
}

/// Everything a render needs besides the data snapshot: the instant open
/// transitions are measured against, the operating zone and the operator's
/// current filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewContext {
    pub now: DateTime<Utc>,
    pub zone: FixedOffset,
    pub period: Option<Period>,
}

impl ViewContext {
    pub fn new(now: DateTime<Utc>, zone: FixedOffset) -> Self {
        Self {
            now,
            zone,
            period: None,
        }
    }

    pub fn with_period(mut self, period: Option<Period>) -> Self {
        self.period = period;
        self
    }

    /// Orders created in the selected month, or every order without a filter.
    /// An order with no creation date only passes when no filter is active.
    pub fn includes(&self, order: &OrderSummary) -> bool {
        match (self.period, order.created_at) {
            (None, _) => true,
            (Some(period), Some(created_at)) => period.contains(created_at, self.zone),
            (Some(_), None) => false,
        }
    }
}
