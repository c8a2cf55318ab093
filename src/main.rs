use clap::Parser;
use report_import::core::ConfigProvider;
use report_import::utils::error::{ErrorSeverity, ImportError};
use report_import::utils::{logger, validation::Validate};
use report_import::{
    standard_registry, BatchImportPipeline, CliConfig, ImportEngine, ImportOrchestrator,
    LocalStorage, SupabaseStore,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("🚀 Starting report-import CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let registry = standard_registry();
    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No reports will be written");
        println!("🔍 Dry run: {} inputs, {} importers registered", config.input.len(), registry.len());
        for input in &config.input {
            println!("  📁 {}", input);
        }
        return Ok(());
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let store = match SupabaseStore::new(
        config.database_url(),
        config.api_key(),
        config.db_schema(),
        Duration::from_secs(config.timeout_seconds),
    ) {
        Ok(store) => store,
        Err(e) => exit_with(e),
    };

    // 創建匯入流程
    let orchestrator = ImportOrchestrator::new(registry, Arc::new(store))
        .with_link_assets(config.link_assets());
    let storage = LocalStorage::new(".".to_string());
    let pipeline = BatchImportPipeline::new(storage, config, Arc::new(orchestrator));

    let engine = ImportEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Report import completed successfully!");
            println!("✅ Report import completed successfully!");
            println!("📁 Summary saved to: {}", output_path);
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn exit_with(e: ImportError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Report import failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,      // 警告，但成功
        ErrorSeverity::Medium => 2,   // 重試錯誤
        ErrorSeverity::High => 1,     // 處理錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    };
    std::process::exit(exit_code);
}
