pub mod data;
pub mod error;
pub mod simulation;
pub mod detection;
pub mod alerts;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use data::{GroupKey, MovementKind, MovementRecord};
pub use error::{DataError, DataResult};
pub use simulation::RecordGenerator;
pub use detection::{
    AnomalyFlags, GroupStatisticsEngine, GroupStats, IqrDetector, ZScoreDetector,
};
pub use alerts::{
    estimate_financial_impact, AlertEntry, AlertPanel, AlertPanelBuilder,
};
pub use pipeline::{run_pipeline, PipelineOutput};
pub use utils::{Config, DetectionConfig, GeneratorConfig, StdDevKind};
