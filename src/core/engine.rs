use crate::domain::ports::{Pipeline, TransformSummary};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct ImportEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ImportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting report import...");
        if self.monitor.is_enabled() {
            tracing::info!("📊 Resource monitoring enabled");
        }
        self.monitor.log_stats("Start");

        // Extract
        tracing::info!("📁 Reading payloads...");
        let payloads = self.pipeline.extract().await?;
        tracing::info!("📁 Read {} payloads", payloads.len());
        self.monitor.log_stats("Extract");

        // Transform
        tracing::info!("🔶 Importing reports...");
        let report = self.pipeline.transform(payloads).await?;
        self.monitor.record_imports(report.processed());
        tracing::info!(
            "✅ Imported {} reports ({} failed)",
            report.processed() - report.failed(),
            report.failed()
        );
        self.monitor.log_stats("Import");

        // Load
        tracing::info!("💾 Writing import summary...");
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("💾 Summary saved to: {}", output_path);

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{BatchEntry, BatchReport, ImportResult};
    use async_trait::async_trait;

    struct FixedPipeline;

    #[async_trait]
    impl Pipeline for FixedPipeline {
        type Input = String;
        type Output = BatchReport;

        async fn extract(&self) -> Result<Vec<String>> {
            Ok(vec!["a.json".to_string(), "b.json".to_string()])
        }

        async fn transform(&self, data: Vec<String>) -> Result<BatchReport> {
            let entries = data
                .into_iter()
                .map(|source| BatchEntry::new(source, ImportResult::succeeded(None, "panelboard")))
                .collect();
            Ok(BatchReport { entries })
        }

        async fn load(&self, result: BatchReport) -> Result<String> {
            Ok(format!("out/{}", result.entries.len()))
        }
    }

    #[tokio::test]
    async fn test_engine_runs_all_phases() {
        let engine = ImportEngine::new(FixedPipeline);
        assert_eq!(engine.run().await.unwrap(), "out/2");
    }
}
