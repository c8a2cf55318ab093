pub mod pipelines;
pub mod reports;
