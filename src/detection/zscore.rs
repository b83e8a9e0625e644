use crate::utils::config::StdDevKind;
use statrs::statistics::Statistics;

/// Location and spread of one group's quantities
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScoreFit {
    pub mean: f64,
    pub std_dev: f64,
}

impl ZScoreFit {
    pub fn score(&self, value: f64) -> f64 {
        (value - self.mean) / self.std_dev
    }
}

/// Z-score outlier detector
///
/// Flags values that sit more than `threshold` standard deviations away
/// from their group mean.
///
/// Algorithm:
/// 1. Need at least 2 values, otherwise no signal
/// 2. Compute mean and standard deviation (sample by default)
/// 3. A zero standard deviation means no signal for the whole group
/// 4. score = (value - mean) / std_dev, flag when |score| > threshold
///
/// "No signal" is `None` and never counts as anomalous.
#[derive(Debug, Clone)]
pub struct ZScoreDetector {
    /// Flag threshold on |score| (e.g., 3.0 = 3 sigma)
    threshold: f64,

    /// Denominator used for the standard deviation
    std_dev_kind: StdDevKind,
}

impl ZScoreDetector {
    pub fn new(threshold: f64, std_dev_kind: StdDevKind) -> Self {
        Self {
            threshold,
            std_dev_kind,
        }
    }

    /// Fit mean and standard deviation; `None` for degenerate groups
    pub fn fit(&self, values: &[f64]) -> Option<ZScoreFit> {
        if values.len() < 2 {
            return None;
        }

        let mean = values.iter().mean();
        let std_dev = match self.std_dev_kind {
            StdDevKind::Sample => values.iter().std_dev(),
            StdDevKind::Population => values.iter().population_std_dev(),
        };

        if !std_dev.is_finite() || std_dev <= 0.0 {
            return None;
        }

        Some(ZScoreFit { mean, std_dev })
    }

    pub fn is_anomalous(&self, score: Option<f64>) -> bool {
        matches!(score, Some(z) if z.abs() > self.threshold)
    }
}

impl Default for ZScoreDetector {
    fn default() -> Self {
        Self::new(3.0, StdDevKind::Sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(detector: &ZScoreDetector, values: &[f64]) -> Vec<Option<f64>> {
        match detector.fit(values) {
            Some(fit) => values.iter().map(|&v| Some(fit.score(v))).collect(),
            None => vec![None; values.len()],
        }
    }

    #[test]
    fn test_extreme_value_flagged() {
        let detector = ZScoreDetector::default();
        let mut values = vec![20.0; 30];
        values.extend([19.0, 21.0, 20.0, 18.0, 22.0]);
        values.push(-200.0);

        let scores = scores(&detector, &values);
        let last = *scores.last().unwrap();

        assert!(last.unwrap() < -3.0);
        assert!(detector.is_anomalous(last));
        assert!(!detector.is_anomalous(scores[0]));
    }

    #[test]
    fn test_constant_group_has_no_signal() {
        let detector = ZScoreDetector::new(0.001, StdDevKind::Sample);
        let scores = scores(&detector, &[5.0, 5.0, 5.0, 5.0]);

        assert!(scores.iter().all(|s| s.is_none()));
        assert!(scores.iter().all(|&s| !detector.is_anomalous(s)));
    }

    #[test]
    fn test_single_value_has_no_signal() {
        let detector = ZScoreDetector::default();
        assert!(detector.fit(&[42.0]).is_none());
        assert_eq!(scores(&detector, &[42.0]), vec![None]);
        assert!(scores(&detector, &[]).is_empty());
    }

    #[test]
    fn test_sample_vs_population_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

        let population = ZScoreDetector::new(3.0, StdDevKind::Population).fit(&values).unwrap();
        assert!((population.mean - 5.0).abs() < 1e-9);
        assert!((population.std_dev - 2.0).abs() < 1e-9);

        let sample = ZScoreDetector::new(3.0, StdDevKind::Sample).fit(&values).unwrap();
        assert!((sample.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_is_strict() {
        let detector = ZScoreDetector::new(1.0, StdDevKind::Population);
        // mean 0, population std dev 1: both scores are exactly +-1
        let scores = scores(&detector, &[-1.0, 1.0]);

        assert_eq!(scores, vec![Some(-1.0), Some(1.0)]);
        assert!(scores.iter().all(|&s| !detector.is_anomalous(s)));
    }
}
