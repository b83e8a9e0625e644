/// Quartile fence of one group's quantities
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrFit {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrFit {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    pub fn is_outside(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Percentile with linear interpolation between order statistics.
///
/// `sorted` must be ascending; position = p * (n - 1).
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }

    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Interquartile-range fence detector
///
/// lower = Q1 - k * IQR, upper = Q3 + k * IQR. A value strictly outside
/// the fence is flagged. Small groups are not special-cased: with a single
/// value both quartiles equal it, so that value is never outside.
#[derive(Debug, Clone)]
pub struct IqrDetector {
    /// Fence multiplier k (e.g., 1.5)
    multiplier: f64,
}

impl IqrDetector {
    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }

    pub fn fit(&self, values: &[f64]) -> Option<IqrFit> {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = percentile(&sorted, 0.25)?;
        let q3 = percentile(&sorted, 0.75)?;
        let iqr = q3 - q1;

        Some(IqrFit {
            q1,
            q3,
            lower: q1 - self.multiplier * iqr,
            upper: q3 + self.multiplier * iqr,
        })
    }
}

impl Default for IqrDetector {
    fn default() -> Self {
        Self::new(1.5)
    }
}
