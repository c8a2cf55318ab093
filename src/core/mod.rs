pub mod assembler;
pub mod derived;
pub mod engine;
pub mod extractor;
pub mod introspector;
pub mod mapping;
pub mod orchestrator;
pub mod registry;

pub use crate::domain::ports::{ConfigProvider, Pipeline, ReportStore, Storage};
pub use crate::utils::error::Result;
