use serde::Serialize;

/// How far past the stage average an order may run before it turns red.
pub const ATTENTION_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrafficLight {
    /// No baseline to compare against.
    Gray,
    Green,
    Yellow,
    Red,
}

impl TrafficLight {
    pub fn label(&self) -> &'static str {
        match self {
            TrafficLight::Gray => "Sem referência",
            TrafficLight::Green => "No prazo",
            TrafficLight::Yellow => "Atenção",
            TrafficLight::Red => "Gargalo",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            TrafficLight::Gray => "light-gray",
            TrafficLight::Green => "light-green",
            TrafficLight::Yellow => "light-yellow",
            TrafficLight::Red => "light-red",
        }
    }
}

/// Compares how long an order has been in its stage against the stage's
/// historical average. Total over every input, NaN included.
pub fn classify(days_open: Option<f64>, avg_days: Option<f64>) -> TrafficLight {
    let (Some(days), Some(avg)) = (days_open, avg_days) else {
        return TrafficLight::Gray;
    };
    if !days.is_finite() || !avg.is_finite() || avg <= 0.0 {
        return TrafficLight::Gray;
    }

    if days <= avg {
        TrafficLight::Green
    } else if days <= avg * ATTENTION_FACTOR {
        TrafficLight::Yellow
    } else {
        TrafficLight::Red
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn slightly_over_average_needs_attention() {
        assert_eq!(classify(Some(3.2), Some(3.0)), TrafficLight::Yellow);
    }

    #[test]
    fn well_over_average_is_a_bottleneck() {
        assert_eq!(classify(Some(5.0), Some(3.0)), TrafficLight::Red);
    }

    #[test]
    fn boundaries_are_inclusive_on_the_lower_light() {
        assert_eq!(classify(Some(3.0), Some(3.0)), TrafficLight::Green);
        assert_eq!(classify(Some(4.5), Some(3.0)), TrafficLight::Yellow);
        assert_eq!(classify(Some(0.0), Some(3.0)), TrafficLight::Green);
    }

    #[test]
    fn no_baseline_cases_are_gray() {
        assert_eq!(classify(None, None), TrafficLight::Gray);
        assert_eq!(classify(Some(1.0), Some(0.0)), TrafficLight::Gray);
        assert_eq!(classify(Some(1.0), Some(-2.0)), TrafficLight::Gray);
        assert_eq!(classify(Some(f64::NAN), Some(2.0)), TrafficLight::Gray);
        assert_eq!(classify(Some(1.0), Some(f64::INFINITY)), TrafficLight::Gray);
    }

    proptest! {
        #[test]
        fn missing_average_is_always_gray(days in proptest::option::of(any::<f64>())) {
            prop_assert_eq!(classify(days, None), TrafficLight::Gray);
        }

        #[test]
        fn missing_residency_is_always_gray(avg in proptest::option::of(any::<f64>())) {
            prop_assert_eq!(classify(None, avg), TrafficLight::Gray);
        }

        #[test]
        fn classification_is_total_and_consistent(
            days in proptest::option::of(any::<f64>()),
            avg in proptest::option::of(any::<f64>()),
        ) {
            let light = classify(days, avg);
            match (days, avg) {
                (Some(d), Some(a)) if d.is_finite() && a.is_finite() && a > 0.0 => {
                    let expected = if d <= a {
                        TrafficLight::Green
                    } else if d <= a * ATTENTION_FACTOR {
                        TrafficLight::Yellow
                    } else {
                        TrafficLight::Red
                    };
                    prop_assert_eq!(light, expected);
                }
                _ => prop_assert_eq!(light, TrafficLight::Gray),
            }
        }
    }
}
