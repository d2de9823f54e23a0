use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::duration::{resolve, ResolvedSpan};
use crate::models::{Stage, StageStatus, StageTransition};

/// The stage an order occupies according to its open transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrentStage {
    pub transition_id: i32,
    pub stage: Stage,
    pub status: StageStatus,
    pub since: DateTime<Utc>,
    pub days_open: f64,
}

impl CurrentStage {
    fn from_span(transition: &StageTransition, span: ResolvedSpan) -> Self {
        Self {
            transition_id: transition.id,
            stage: transition.stage,
            status: transition.status,
            since: span.start,
            days_open: span.days,
        }
    }

    /// Most recent start wins; identical starts go to the later insert.
    fn supersedes(&self, other: &CurrentStage) -> bool {
        (self.since, self.transition_id) > (other.since, other.transition_id)
    }
}

/// Residency of one order, or `None` when it has no open transition.
pub fn current_stage_for(
    order_id: i32,
    transitions: &[StageTransition],
    now: DateTime<Utc>,
) -> Option<CurrentStage> {
    open_candidates(transitions.iter().filter(move |t| t.order_id == order_id), now)
        .reduce(|best, candidate| if candidate.supersedes(&best) { candidate } else { best })
}

/// Residency of every order with an open transition, in one pass.
pub fn current_stages(transitions: &[StageTransition], now: DateTime<Utc>) -> HashMap<i32, CurrentStage> {
    let mut current: HashMap<i32, CurrentStage> = HashMap::new();

    for (order_id, candidate) in transitions
        .iter()
        .filter(|t| t.is_open())
        .filter_map(|t| resolve(t, now).map(|span| (t.order_id, CurrentStage::from_span(t, span))))
    {
        match current.get(&order_id) {
            Some(best) if !candidate.supersedes(best) => {}
            _ => {
                current.insert(order_id, candidate);
            }
        }
    }

    current
}

fn open_candidates<'a>(
    transitions: impl Iterator<Item = &'a StageTransition> + 'a,
    now: DateTime<Utc>,
) -> impl Iterator<Item = CurrentStage> + 'a {
    transitions
        .filter(|t| t.is_open())
        .filter_map(move |t| resolve(t, now).map(|span| CurrentStage::from_span(t, span)))
}
