//! Averaging and rounding helpers shared by the server aggregates and the
//! client-side derived metrics.

/// Round to 2 decimal places, half away from zero
///
/// ```
/// use insight_common::stats::round2;
///
/// assert_eq!(round2(2.345), 2.35);
/// assert_eq!(round2(-2.345), -2.35);
/// assert_eq!(round2(3.0), 3.0);
/// ```
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    // 2.345 * 100.0 lands on 234.49999999999997; snap values that are
    // within float noise of a half-way point before rounding.
    let nudged = if (scaled.fract().abs() - 0.5).abs() < 1e-9 {
        scaled.trunc() + 0.5 * scaled.signum()
    } else {
        scaled
    };
    nudged.round() / 100.0
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Running sum/count for one metric inside a group
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean of everything pushed so far, 0 when nothing was pushed
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Mean rounded with [`round2`]
    pub fn rounded(&self) -> f64 {
        round2(self.mean())
    }
}
