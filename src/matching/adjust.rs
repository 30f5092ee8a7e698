//! Weight-interpolated threshold adjustment
//!
//! A project can ask for targets to be nudged by a range that differs
//! between the lightest and boldest masters. The range for a style is
//! interpolated along the weight axis, then spread over the targets in
//! proportion to where each sits between this style's smallest and largest
//! target.

use super::Base;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Adjustment applied to the smallest (`low`) and largest (`high`) target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct AdjustmentRange {
    pub low: f64,
    pub high: f64,
}

impl AdjustmentRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

impl From<[f64; 2]> for AdjustmentRange {
    fn from([low, high]: [f64; 2]) -> Self {
        Self { low, high }
    }
}

impl From<AdjustmentRange> for [f64; 2] {
    fn from(range: AdjustmentRange) -> Self {
        [range.low, range.high]
    }
}

/// Position of a style between the axis extremes. A degenerate axis puts
/// every style at the bold end.
pub fn interpolation_ratio(position: f64, axis_start: f64, axis_end: f64) -> f64 {
    let axis_range = axis_end - axis_start;
    if axis_range == 0.0 {
        1.0
    } else {
        (position - axis_start) / axis_range
    }
}

pub fn interpolate_range(
    light: AdjustmentRange,
    bold: AdjustmentRange,
    ratio: f64,
) -> AdjustmentRange {
    AdjustmentRange {
        low: light.low + (bold.low - light.low) * ratio,
        high: light.high + (bold.high - light.high) * ratio,
    }
}

/// Spread `range` over the targets of `bases`.
///
/// When every target is equal there is nothing to spread over, so `low`
/// is added to all of them.
pub fn redistribute(bases: &mut [Base], range: AdjustmentRange) {
    let Some(first) = bases.first() else {
        return;
    };
    let (min, max) = bases
        .iter()
        .fold((first.target, first.target), |(min, max), base| {
            (min.min(base.target), max.max(base.target))
        });
    let span = max - min;

    for base in bases.iter_mut() {
        let ratio = if span == 0.0 {
            0.0
        } else {
            (base.target - min) / span
        };
        let old = base.target;
        base.target += range.low + (range.high - range.low) * ratio;
        debug!(
            "Adjusted target of '{}': {} -> {}",
            base.sequence_text(),
            old,
            base.target
        );
    }
}

/// Interpolate the range for this style and apply it. Returns the range used.
pub fn adjust(
    bases: &mut [Base],
    axis_position: f64,
    axis_start: f64,
    axis_end: f64,
    light: AdjustmentRange,
    bold: AdjustmentRange,
) -> AdjustmentRange {
    let ratio = interpolation_ratio(axis_position, axis_start, axis_end);
    let range = interpolate_range(light, bold, ratio);
    debug!(
        "Adjustment ratio {} on axis {}..{}, range {}..{}",
        ratio, axis_start, axis_end, range.low, range.high
    );
    redistribute(bases, range);
    range
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bases(targets: &[f64]) -> Vec<Base> {
        targets
            .iter()
            .enumerate()
            .map(|(i, &target)| Base {
                name_sequence: vec![format!("dvBASE{i}")],
                glyphs: Vec::new(),
                target,
            })
            .collect()
    }

    fn targets(bases: &[Base]) -> Vec<f64> {
        bases.iter().map(|b| b.target).collect()
    }

    #[test]
    fn ratio_along_axis() {
        assert_eq!(interpolation_ratio(400.0, 300.0, 700.0), 0.25);
        assert_eq!(interpolation_ratio(300.0, 300.0, 700.0), 0.0);
        assert_eq!(interpolation_ratio(700.0, 300.0, 700.0), 1.0);
    }

    #[test]
    fn degenerate_axis_means_bold() {
        assert_eq!(interpolation_ratio(400.0, 500.0, 500.0), 1.0);
        let mut b = bases(&[100.0, 200.0]);
        let range = adjust(
            &mut b,
            400.0,
            500.0,
            500.0,
            AdjustmentRange::new(0.0, 0.0),
            AdjustmentRange::new(10.0, 20.0),
        );
        assert_eq!(range, AdjustmentRange::new(10.0, 20.0));
        assert_eq!(targets(&b), vec![110.0, 220.0]);
    }

    #[test]
    fn range_is_interpolated() {
        let range = interpolate_range(
            AdjustmentRange::new(-10.0, 0.0),
            AdjustmentRange::new(10.0, 40.0),
            0.5,
        );
        assert_eq!(range, AdjustmentRange::new(0.0, 20.0));
    }

    #[test]
    fn targets_spread_over_observed_span() {
        let mut b = bases(&[100.0, 150.0, 300.0]);
        redistribute(&mut b, AdjustmentRange::new(10.0, 50.0));
        assert_eq!(targets(&b), vec![110.0, 170.0, 350.0]);
    }

    #[test]
    fn equal_targets_get_low_end() {
        let mut b = bases(&[200.0, 200.0, 200.0]);
        redistribute(&mut b, AdjustmentRange::new(-5.0, 30.0));
        assert_eq!(targets(&b), vec![195.0, 195.0, 195.0]);
    }

    #[test]
    fn nothing_to_adjust() {
        let mut b = bases(&[]);
        redistribute(&mut b, AdjustmentRange::new(1.0, 2.0));
        assert!(b.is_empty());
    }

    #[test]
    fn range_reads_from_pair() {
        let range: AdjustmentRange = serde_json::from_str("[-12, 30.5]").unwrap();
        assert_eq!(range, AdjustmentRange::new(-12.0, 30.5));
    }
}
