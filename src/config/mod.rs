//! Configuration module for CardioScan

mod pipeline;

pub use pipeline::PipelineConfig;
