use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::duration::resolve;
use crate::models::{Stage, StageTransition};

/// Dwell-time summary of one stage over a set of transitions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageStats {
    pub stage: Stage,
    /// Mean over transitions that already ended.
    pub avg_closed: Option<f64>,
    /// Mean over every resolvable transition, ended or not.
    pub avg_all: Option<f64>,
    pub open_days_sum: f64,
    pub open_count: usize,
    pub closed_count: usize,
}

impl StageStats {
    pub fn empty(stage: Stage) -> Self {
        Self {
            stage,
            avg_closed: None,
            avg_all: None,
            open_days_sum: 0.0,
            open_count: 0,
            closed_count: 0,
        }
    }

    /// Reference duration for the traffic light.
    pub fn baseline(&self) -> Option<f64> {
        self.avg_closed.or(self.avg_all)
    }

    pub fn sample_count(&self) -> usize {
        self.open_count + self.closed_count
    }
}

#[derive(Default)]
struct Accumulator {
    closed_sum: f64,
    closed_count: usize,
    open_sum: f64,
    open_count: usize,
}

impl Accumulator {
    fn finish(self, stage: Stage) -> StageStats {
        let total = self.closed_count + self.open_count;
        StageStats {
            stage,
            avg_closed: mean(self.closed_sum, self.closed_count),
            avg_all: mean(self.closed_sum + self.open_sum, total),
            open_days_sum: self.open_sum,
            open_count: self.open_count,
            closed_count: self.closed_count,
        }
    }
}

fn mean(sum: f64, count: usize) -> Option<f64> {
    (count > 0).then(|| sum / count as f64)
}

/// Groups resolvable transitions by stage. Stages without any resolvable
/// transition are absent from the map; use [`stats_for`] to read with a
/// "no data" fallback.
pub fn aggregate(transitions: &[StageTransition], now: DateTime<Utc>) -> BTreeMap<Stage, StageStats> {
    let mut buckets: BTreeMap<Stage, Accumulator> = BTreeMap::new();

    for transition in transitions {
        let Some(span) = resolve(transition, now) else {
            log::debug!(
                "transition {} of order {} has no usable start, skipped",
                transition.id,
                transition.order_id
            );
            continue;
        };

        let bucket = buckets.entry(transition.stage).or_default();
        if span.open {
            bucket.open_sum += span.days;
            bucket.open_count += 1;
        } else {
            bucket.closed_sum += span.days;
            bucket.closed_count += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(stage, acc)| (stage, acc.finish(stage)))
        .collect()
}

pub fn stats_for(stats: &BTreeMap<Stage, StageStats>, stage: Stage) -> StageStats {
    stats
        .get(&stage)
        .cloned()
        .unwrap_or_else(|| StageStats::empty(stage))
}

/// Stages holding the most open time first; ties go to the stage with more
/// stuck orders, then to workflow order.
pub fn bottleneck_ranking(stats: &BTreeMap<Stage, StageStats>) -> Vec<StageStats> {
    let mut ranking: Vec<StageStats> = stats.values().cloned().collect();
    ranking.sort_by(compare_bottleneck);
    ranking
}

fn compare_bottleneck(a: &StageStats, b: &StageStats) -> Ordering {
    b.open_days_sum
        .total_cmp(&a.open_days_sum)
        .then_with(|| b.open_count.cmp(&a.open_count))
        .then_with(|| a.stage.cmp(&b.stage))
}
