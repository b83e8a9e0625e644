pub mod generator;

pub use generator::RecordGenerator;
