pub mod partition;
pub mod zscore;
pub mod iqr;
pub mod fusion;
pub mod engine;

pub use partition::GroupIndex;
pub use zscore::{ZScoreDetector, ZScoreFit};
pub use iqr::{percentile, IqrDetector, IqrFit};
pub use fusion::AnomalyFlags;
pub use engine::{GroupAnalysis, GroupStatisticsEngine, GroupStats, RecordScore};
