pub mod batch_import;

pub use batch_import::BatchImportPipeline;
