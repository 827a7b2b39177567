//! Order statistics over ranked samples.
//!
//! [`stat_summary`] assumes its input is already in rank order (rank 0 =
//! best under the active sort strategy): `best` and `second` are positional
//! reads, not a separate max search. [`range_summary`] makes no ordering
//! assumption.

/// Summary statistics of a ranked numeric sample.
///
/// `best` is `sample[0]` and `second` is `sample[1]` — callers supply data
/// in rank order. For a single-element sample, `second` collapses to
/// `best`. An empty sample yields the all-zero summary.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatSummary {
    pub count: usize,
    pub best: f64,
    pub second: f64,
    pub mean: f64,
    pub median: f64,
    pub worst: f64,
}

/// Min/mean/max of a numeric sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeStatSummary {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

/// Computes a [`StatSummary`] over a sample already in rank order.
pub fn stat_summary(ranked: &[f64]) -> StatSummary {
    if ranked.is_empty() {
        return StatSummary::default();
    }
    let count = ranked.len();
    let best = ranked[0];
    let second = if count > 1 { ranked[1] } else { best };
    let worst = ranked[count - 1];
    let mean = ranked.iter().sum::<f64>() / count as f64;
    StatSummary {
        count,
        best,
        second,
        mean,
        median: median_of_ranked(ranked),
        worst,
    }
}

/// Median of an already-ordered sample (direction does not matter);
/// midpoint average for even counts.
fn median_of_ranked(ranked: &[f64]) -> f64 {
    let n = ranked.len();
    if n % 2 == 1 {
        ranked[n / 2]
    } else {
        (ranked[n / 2 - 1] + ranked[n / 2]) / 2.0
    }
}

/// Computes a [`RangeStatSummary`] over an unordered sample.
/// An empty sample yields zeros.
pub fn range_summary(values: &[f64]) -> RangeStatSummary {
    if values.is_empty() {
        return RangeStatSummary::default();
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
        sum += v;
    }
    RangeStatSummary {
        min,
        mean: sum / values.len() as f64,
        max,
    }
}

/// Rounds `value` to `digits` decimal digits.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

impl StatSummary {
    /// Copy with every field rounded to `digits` decimals (`count` untouched).
    pub fn rounded(&self, digits: u32) -> Self {
        Self {
            count: self.count,
            best: round_to(self.best, digits),
            second: round_to(self.second, digits),
            mean: round_to(self.mean, digits),
            median: round_to(self.median, digits),
            worst: round_to(self.worst, digits),
        }
    }
}

impl RangeStatSummary {
    /// Copy with every field rounded to `digits` decimals.
    pub fn rounded(&self, digits: u32) -> Self {
        Self {
            min: round_to(self.min, digits),
            mean: round_to(self.mean, digits),
            max: round_to(self.max, digits),
        }
    }
}
