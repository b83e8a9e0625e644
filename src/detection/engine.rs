use crate::data::{GroupKey, MovementRecord};
use crate::detection::fusion::AnomalyFlags;
use crate::detection::iqr::IqrDetector;
use crate::detection::partition::GroupIndex;
use crate::detection::zscore::ZScoreDetector;
use crate::utils::config::DetectionConfig;
use serde::Serialize;
use tracing::debug;

/// Detector output for a single record
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecordScore {
    /// Unrounded Z-score; `None` when the group gives no signal
    pub zscore: Option<f64>,
    pub flags: AnomalyFlags,
}

/// Explanatory statistics of one (unit, material) group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub key: GroupKey,
    pub count: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub q1: f64,
    pub q3: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub zscore_flags: usize,
    pub iqr_flags: usize,
}

/// Result of scoring a dataset: one score per record (same order as the
/// input) and one stats entry per group (first-appearance order).
#[derive(Debug, Clone, Default)]
pub struct GroupAnalysis {
    pub scores: Vec<RecordScore>,
    pub groups: Vec<GroupStats>,
}

impl GroupAnalysis {
    pub fn flagged_count(&self) -> usize {
        self.scores.iter().filter(|s| s.flags.combined_flag).count()
    }
}

/// Group Statistics Engine
///
/// Partitions the records by (unit, material), runs the Z-score and IQR
/// detectors on each group independently and writes the results back by
/// record index. Groups share nothing, so they can be spread across
/// scoped worker threads; results are gathered in group order and are
/// identical to a sequential run.
#[derive(Debug, Clone)]
pub struct GroupStatisticsEngine {
    zscore: ZScoreDetector,
    iqr: IqrDetector,
    parallel: bool,
    workers: usize,
}

type GroupResult = (GroupStats, Vec<(usize, RecordScore)>);

impl GroupStatisticsEngine {
    pub fn new(zscore: ZScoreDetector, iqr: IqrDetector) -> Self {
        Self {
            zscore,
            iqr,
            parallel: false,
            workers: 1,
        }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            zscore: ZScoreDetector::new(config.zscore_threshold, config.std_dev),
            iqr: IqrDetector::new(config.iqr_multiplier),
            parallel: config.parallel,
            workers: config.workers.max(1),
        }
    }

    /// Enable scatter/gather across `workers` threads
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self.parallel = self.workers > 1;
        self
    }

    pub fn evaluate(&self, records: &[MovementRecord]) -> GroupAnalysis {
        let index = GroupIndex::build(records);
        let group_ids: Vec<usize> = (0..index.len()).collect();

        let results: Vec<GroupResult> = if self.parallel && self.workers > 1 && index.len() > 1 {
            self.evaluate_parallel(&index, &group_ids, records)
        } else {
            group_ids
                .iter()
                .map(|&g| self.evaluate_group(&index, g, records))
                .collect()
        };

        let mut scores = vec![RecordScore::default(); records.len()];
        let mut groups = Vec::with_capacity(results.len());
        for (stats, group_scores) in results {
            for (i, score) in group_scores {
                scores[i] = score;
            }
            groups.push(stats);
        }

        let analysis = GroupAnalysis { scores, groups };
        debug!(
            records = records.len(),
            groups = analysis.groups.len(),
            flagged = analysis.flagged_count(),
            parallel = self.parallel,
            "group statistics computed"
        );
        analysis
    }

    fn evaluate_parallel(
        &self,
        index: &GroupIndex,
        group_ids: &[usize],
        records: &[MovementRecord],
    ) -> Vec<GroupResult> {
        let chunk_size = (group_ids.len() + self.workers - 1) / self.workers;

        crossbeam::thread::scope(|s| {
            let handles: Vec<_> = group_ids
                .chunks(chunk_size)
                .map(|chunk| {
                    s.spawn(move |_| {
                        chunk
                            .iter()
                            .map(|&g| self.evaluate_group(index, g, records))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        })
        .unwrap_or_else(|e| std::panic::resume_unwind(e))
    }

    fn evaluate_group(&self, index: &GroupIndex, group: usize, records: &[MovementRecord]) -> GroupResult {
        let members = index.members(group);
        let values = index.quantities(group, records);

        let z_fit = self.zscore.fit(&values);
        let iqr_fit = self.iqr.fit(&values);

        let mut zscore_flags = 0;
        let mut iqr_flags = 0;
        let scored: Vec<(usize, RecordScore)> = members
            .iter()
            .zip(values.iter())
            .map(|(&i, &v)| {
                let zscore = z_fit.map(|fit| fit.score(v));
                let z_flag = self.zscore.is_anomalous(zscore);
                let iqr_flag = iqr_fit.map(|fit| fit.is_outside(v)).unwrap_or(false);
                zscore_flags += z_flag as usize;
                iqr_flags += iqr_flag as usize;
                (
                    i,
                    RecordScore {
                        zscore,
                        flags: AnomalyFlags::fuse(z_flag, iqr_flag),
                    },
                )
            })
            .collect();

        let (q1, q3, lower_bound, upper_bound) = match iqr_fit {
            Some(f) => (f.q1, f.q3, f.lower, f.upper),
            None => (f64::NAN, f64::NAN, f64::NAN, f64::NAN),
        };

        let stats = GroupStats {
            key: index.key(group).clone(),
            count: members.len(),
            mean: z_fit.map(|f| f.mean),
            std_dev: z_fit.map(|f| f.std_dev),
            q1,
            q3,
            lower_bound,
            upper_bound,
            zscore_flags,
            iqr_flags,
        };

        (stats, scored)
    }
}

impl Default for GroupStatisticsEngine {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}
