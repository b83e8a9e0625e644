pub mod config;
pub mod logger;

pub use config::{Config, DetectionConfig, GeneratorConfig, LoggingConfig, ReportConfig, StdDevKind};
pub use logger::{init_logger, init_from_config, LogFormat};
