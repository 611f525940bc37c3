use std::fmt;

use crate::data::model::Dataset;
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Widget domain: what each control may take
// ---------------------------------------------------------------------------

/// Options offered by the controls, derived once from the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetDomain {
    /// Numeric fields except the target, in schema order.
    features: Vec<String>,
    /// Slider range per feature: (trunc(min), trunc(max)).
    ranges: Vec<(i64, i64)>,
}

impl WidgetDomain {
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, DashboardError> {
        let features: Vec<String> = dataset.features().into_iter().map(String::from).collect();
        if features.is_empty() {
            return Err(DashboardError::NoFeatures {
                target: dataset.target().to_string(),
            });
        }
        let ranges = features
            .iter()
            .map(|f| {
                dataset
                    .range(f)
                    .ok()
                    .flatten()
                    // `as` truncates toward zero, like Python's int().
                    .map(|(lo, hi)| (lo as i64, hi as i64))
                    .unwrap_or((0, 0))
            })
            .collect();
        Ok(WidgetDomain { features, ranges })
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    /// Inclusive slider bounds for `feature`.
    pub fn slider_range(&self, feature: &str) -> Option<(i64, i64)> {
        let idx = self.features.iter().position(|f| f == feature)?;
        Some(self.ranges[idx])
    }

    /// The `i`-th feature, clamped to the last one for short schemas.
    fn feature_at(&self, i: usize) -> &str {
        &self.features[i.min(self.features.len() - 1)]
    }
}

// ---------------------------------------------------------------------------
// Widget state and events
// ---------------------------------------------------------------------------

/// Current values of the four interactive controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetState {
    pub x_feature: String,
    pub y_feature: String,
    pub show_trend: bool,
    pub threshold: i64,
}

/// A single user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    SelectX(String),
    SelectY(String),
    ShowTrend(bool),
    SetThreshold(i64),
}

impl WidgetEvent {
    pub fn control(&self) -> &'static str {
        match self {
            WidgetEvent::SelectX(_) => "x_feature",
            WidgetEvent::SelectY(_) => "y_feature",
            WidgetEvent::ShowTrend(_) => "show_trend",
            WidgetEvent::SetThreshold(_) => "threshold",
        }
    }
}

impl fmt::Display for WidgetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetEvent::SelectX(v) | WidgetEvent::SelectY(v) => write!(f, "{} = {v}", self.control()),
            WidgetEvent::ShowTrend(v) => write!(f, "{} = {v}", self.control()),
            WidgetEvent::SetThreshold(v) => write!(f, "{} = {v}", self.control()),
        }
    }
}

impl WidgetState {
    /// Defaults: second feature on x, sixth on y, trend on, threshold at the
    /// truncated minimum of x.
    pub fn initial(domain: &WidgetDomain) -> Self {
        let x_feature = domain.feature_at(1).to_string();
        let threshold = domain.slider_range(&x_feature).map(|r| r.0).unwrap_or(0);
        WidgetState {
            y_feature: domain.feature_at(5).to_string(),
            x_feature,
            show_trend: true,
            threshold,
        }
    }

    /// Validate `event` against `domain` and apply it. On error `self` is left
    /// untouched.
    ///
    /// Selecting a new x feature swaps in that feature's slider, so the
    /// threshold resets to its minimum.
    pub fn update(&mut self, event: WidgetEvent, domain: &WidgetDomain) -> Result<(), DashboardError> {
        match event {
            WidgetEvent::SelectX(feature) => {
                let (min, _) = domain.slider_range(&feature).ok_or_else(|| {
                    DashboardError::invalid_selection("x_feature", format!("'{feature}' is not a feature"))
                })?;
                if feature != self.x_feature {
                    self.threshold = min;
                }
                self.x_feature = feature;
            }
            WidgetEvent::SelectY(feature) => {
                if !domain.contains(&feature) {
                    return Err(DashboardError::invalid_selection(
                        "y_feature",
                        format!("'{feature}' is not a feature"),
                    ));
                }
                self.y_feature = feature;
            }
            WidgetEvent::ShowTrend(on) => self.show_trend = on,
            WidgetEvent::SetThreshold(value) => {
                let (min, max) = domain.slider_range(&self.x_feature).unwrap_or((0, 0));
                if !(min..=max).contains(&value) {
                    return Err(DashboardError::invalid_selection(
                        "threshold",
                        format!("{value} is outside [{min}, {max}] for {}", self.x_feature),
                    ));
                }
                self.threshold = value;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        let cols = [
            ("Pregnancies", vec![6.0, 1.0, 8.0]),
            ("Glucose", vec![148.0, 85.0, 183.0]),
            ("BloodPressure", vec![72.0, 66.0, 64.0]),
            ("SkinThickness", vec![35.0, 29.0, 0.0]),
            ("Insulin", vec![0.0, 0.0, 0.0]),
            ("BMI", vec![33.6, 26.6, 23.3]),
            ("Age", vec![50.0, 31.0, 32.0]),
            ("Outcome", vec![1.0, 0.0, 1.0]),
        ];
        Dataset::from_numeric_columns(
            cols.into_iter().map(|(n, v)| (n.to_string(), v)).collect(),
            "Outcome",
        )
        .unwrap()
    }

    #[test]
    fn initial_state_follows_schema_order() {
        let domain = WidgetDomain::from_dataset(&dataset()).unwrap();
        let state = WidgetState::initial(&domain);
        assert_eq!(
            state,
            WidgetState {
                x_feature: "Glucose".into(),
                y_feature: "BMI".into(),
                show_trend: true,
                threshold: 85,
            }
        );
    }

    #[test]
    fn slider_range_truncates() {
        let domain = WidgetDomain::from_dataset(&dataset()).unwrap();
        assert_eq!(domain.slider_range("BMI"), Some((23, 33)));
        assert_eq!(domain.slider_range("Outcome"), None);
    }

    #[test]
    fn short_schema_clamps_default_indices() {
        let ds = Dataset::from_numeric_columns(
            vec![
                ("Glucose".into(), vec![1.0, 2.0]),
                ("Outcome".into(), vec![0.0, 1.0]),
            ],
            "Outcome",
        )
        .unwrap();
        let state = WidgetState::initial(&WidgetDomain::from_dataset(&ds).unwrap());
        assert_eq!(state.x_feature, "Glucose");
        assert_eq!(state.y_feature, "Glucose");
    }

    #[test]
    fn no_features_is_an_error() {
        let ds = Dataset::from_numeric_columns(vec![("Outcome".into(), vec![0.0])], "Outcome")
            .unwrap();
        assert!(matches!(
            WidgetDomain::from_dataset(&ds),
            Err(DashboardError::NoFeatures { .. })
        ));
    }

    #[test]
    fn invalid_updates_leave_state_unchanged() {
        let domain = WidgetDomain::from_dataset(&dataset()).unwrap();
        let mut state = WidgetState::initial(&domain);
        let before = state.clone();

        for event in [
            WidgetEvent::SelectX("Outcome".into()),
            WidgetEvent::SelectY("Cholesterol".into()),
            WidgetEvent::SetThreshold(84),
            WidgetEvent::SetThreshold(184),
        ] {
            let control = event.control();
            match state.update(event, &domain) {
                Err(DashboardError::InvalidSelection { control: c, .. }) => assert_eq!(c, control),
                other => panic!("expected InvalidSelection, got {other:?}"),
            }
            assert_eq!(state, before);
        }
    }

    #[test]
    fn valid_updates_apply() {
        let domain = WidgetDomain::from_dataset(&dataset()).unwrap();
        let mut state = WidgetState::initial(&domain);
        state.update(WidgetEvent::SetThreshold(183), &domain).unwrap();
        state.update(WidgetEvent::ShowTrend(false), &domain).unwrap();
        state.update(WidgetEvent::SelectY("Age".into()), &domain).unwrap();
        assert_eq!(state.threshold, 183);
        assert!(!state.show_trend);
        assert_eq!(state.y_feature, "Age");
    }

    #[test]
    fn changing_x_resets_threshold_to_new_minimum() {
        let domain = WidgetDomain::from_dataset(&dataset()).unwrap();
        let mut state = WidgetState::initial(&domain);
        state.update(WidgetEvent::SetThreshold(120), &domain).unwrap();

        state.update(WidgetEvent::SelectX("Glucose".into()), &domain).unwrap();
        assert_eq!(state.threshold, 120);

        state.update(WidgetEvent::SelectX("Age".into()), &domain).unwrap();
        assert_eq!(state.x_feature, "Age");
        assert_eq!(state.threshold, 31);
    }
}
