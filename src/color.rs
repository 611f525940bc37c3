use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

use crate::data::model::Outcome;
use crate::data::stats::Correlation;

// ---------------------------------------------------------------------------
// Outcome colours
// ---------------------------------------------------------------------------

pub const SKY_BLUE: Color32 = Color32::from_rgb(135, 206, 235);
pub const INDIAN_RED: Color32 = Color32::from_rgb(205, 92, 92);

pub fn outcome_color(outcome: Outcome) -> Color32 {
    match outcome {
        Outcome::Negative => SKY_BLUE,
        Outcome::Positive => INDIAN_RED,
    }
}

// ---------------------------------------------------------------------------
// Continuous scale: value → Color32
// ---------------------------------------------------------------------------

/// Piecewise-linear colour scale, interpolated in linear RGB.
#[derive(Debug, Clone)]
pub struct ColorScale {
    stops: Vec<(f64, LinSrgb)>,
    undefined: Color32,
}

impl ColorScale {
    /// Stops must be sorted by position.
    pub fn new(stops: &[(f64, [u8; 3])]) -> Self {
        ColorScale {
            stops: stops
                .iter()
                .map(|&(pos, [r, g, b])| (pos, Srgb::new(r, g, b).into_format::<f32>().into_linear()))
                .collect(),
            undefined: Color32::GRAY,
        }
    }

    /// Diverging red/blue scale over [-1, 1], red for positive values.
    pub fn red_blue() -> Self {
        Self::new(&[
            (-1.0, [5, 48, 97]),
            (-0.5, [67, 147, 195]),
            (0.0, [247, 247, 247]),
            (0.5, [214, 96, 77]),
            (1.0, [103, 0, 31]),
        ])
    }

    /// Colour for `value`, clamped to the end stops.
    pub fn color_at(&self, value: f64) -> Color32 {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return self.undefined;
        };
        let mixed = if value <= first.0 {
            first.1
        } else if value >= last.0 {
            last.1
        } else {
            self.stops
                .windows(2)
                .find(|w| value <= w[1].0)
                .map(|w| {
                    let t = (value - w[0].0) / (w[1].0 - w[0].0);
                    w[0].1.mix(w[1].1, t as f32)
                })
                .unwrap_or(last.1)
        };
        let rgb: Srgb<u8> = Srgb::<f32>::from_linear(mixed).into_format();
        Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
    }

    pub fn color_for(&self, correlation: Correlation) -> Color32 {
        correlation
            .value()
            .map(|r| self.color_at(r))
            .unwrap_or(self.undefined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_stops_and_clamping() {
        let scale = ColorScale::red_blue();
        assert_eq!(scale.color_at(1.0), Color32::from_rgb(103, 0, 31));
        assert_eq!(scale.color_at(5.0), Color32::from_rgb(103, 0, 31));
        assert_eq!(scale.color_at(-1.0), Color32::from_rgb(5, 48, 97));
        assert_eq!(scale.color_at(0.0), Color32::from_rgb(247, 247, 247));
    }

    #[test]
    fn undefined_correlation_is_gray() {
        assert_eq!(ColorScale::red_blue().color_for(Correlation::Undefined), Color32::GRAY);
    }

    #[test]
    fn positive_values_lean_red() {
        let c = ColorScale::red_blue().color_at(0.25);
        assert!(c.r() > c.b());
    }
}
