pub mod adapters;
pub mod app;
#[cfg(feature = "cli")]
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use adapters::SupabaseStore;
pub use app::pipelines::BatchImportPipeline;
pub use app::reports::standard_registry;
pub use core::{engine::ImportEngine, orchestrator::ImportOrchestrator};
pub use domain::model::{ImportContext, ImportResult, ReportPayload};
pub use utils::error::{ImportError, Result};
