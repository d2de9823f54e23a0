use chrono::{DateTime, Utc};

use crate::models::StageTransition;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// A transition pinned to concrete instants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSpan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub days: f64,
    pub open: bool,
}

/// Effective start is `started_at`, else `created_at`; effective end is
/// `ended_at`, else `now`. Returns `None` when no start can be determined.
pub fn resolve(transition: &StageTransition, now: DateTime<Utc>) -> Option<ResolvedSpan> {
    let start = transition.started_at.or(transition.created_at)?;
    let end = transition.ended_at.unwrap_or(now);

    Some(ResolvedSpan {
        start,
        end,
        days: days_between(start, end),
        open: transition.is_open(),
    })
}

/// Fractional days from `start` to `end`, never negative.
pub fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let millis = (end - start).num_milliseconds();
    (millis as f64 / MILLIS_PER_DAY).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Stage, StageStatus};
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn transition(
        started_at: Option<DateTime<Utc>>,
        ended_at: Option<DateTime<Utc>>,
        created_at: Option<DateTime<Utc>>,
    ) -> StageTransition {
        StageTransition {
            id: 1,
            order_id: 1,
            stage: Stage::Manufacturing,
            status: StageStatus::InProgress,
            responsible_id: None,
            started_at,
            ended_at,
            note: String::new(),
            created_at,
        }
    }

    #[test]
    fn closed_transition_uses_its_own_bounds() {
        let span = resolve(
            &transition(Some(t0()), Some(t0() + Duration::hours(36)), Some(t0())),
            t0() + Duration::days(30),
        )
        .unwrap();
        assert_eq!(span.days, 1.5);
        assert!(!span.open);
    }

    #[test]
    fn missing_start_falls_back_to_creation_time() {
        let now = t0() + Duration::hours(60);
        let span = resolve(&transition(None, None, Some(t0())), now).unwrap();
        assert_eq!(span.start, t0());
        assert_eq!(span.end, now);
        assert_eq!(span.days, 2.5);
        assert!(span.open);
    }

    #[test]
    fn no_start_at_all_is_unresolvable() {
        assert_eq!(resolve(&transition(None, None, None), t0()), None);
        assert_eq!(resolve(&transition(None, Some(t0()), None), t0()), None);
    }

    #[test]
    fn inverted_interval_clamps_to_zero() {
        let span = resolve(
            &transition(Some(t0()), Some(t0() - Duration::days(2)), None),
            t0(),
        )
        .unwrap();
        assert_eq!(span.days, 0.0);
    }

    proptest! {
        #[test]
        fn duration_is_never_negative(
            start_offset in -1_000_000i64..1_000_000,
            end_offset in proptest::option::of(-1_000_000i64..1_000_000),
            now_offset in -1_000_000i64..1_000_000,
        ) {
            let start = t0() + Duration::seconds(start_offset);
            let end = end_offset.map(|s| t0() + Duration::seconds(s));
            let now = t0() + Duration::seconds(now_offset);
            let span = resolve(&transition(Some(start), end, None), now).unwrap();
            prop_assert!(span.days >= 0.0);
        }

        #[test]
        fn open_transition_without_start_measures_from_creation(
            age_secs in 0i64..50_000_000,
        ) {
            let now = t0() + Duration::seconds(age_secs);
            let span = resolve(&transition(None, None, Some(t0())), now).unwrap();
            let expected = age_secs as f64 / 86_400.0;
            prop_assert!((span.days - expected).abs() < 1e-9);
        }
    }
}
