use anyhow::Context;
use clap::Parser;
use report_import::config::toml_config::TomlConfig;
use report_import::core::ConfigProvider;
use report_import::domain::model::ReportPayload;
use report_import::utils::error::ErrorSeverity;
use report_import::utils::{logger, validation::Validate};
use report_import::{
    standard_registry, BatchImportPipeline, ImportEngine, ImportOrchestrator, LocalStorage,
    SupabaseStore,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "toml-import")]
#[command(about = "Report import with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "report-import.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override asset linking from config
    #[arg(long)]
    link_assets: Option<bool>,

    /// Dry run - show which importer each payload would use without writing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based report import");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(link) = args.link_assets {
        config.import.link_assets = Some(link);
        tracing::info!("🔧 Asset linking overridden to: {}", link);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    // 顯示配置摘要
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No reports will be written");
        perform_dry_run(&config).await?;
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let store = SupabaseStore::new(
        config.database_url(),
        config.api_key(),
        config.db_schema(),
        Duration::from_secs(config.timeout_seconds()),
    )
    .context("creating database client")?;

    let orchestrator = ImportOrchestrator::new(standard_registry(), Arc::new(store))
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
        Err(e) => {
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

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Database: {} (schema {})", config.database_url(), config.db_schema());
    println!("  Job: {}  User: {}", config.job_id(), config.user_id());
    println!("  Inputs: {}", config.input_files().len());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    println!("  Concurrent Imports: {}", config.concurrent_imports());
    println!("  Link Assets: {}", config.link_assets());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

/// 讀取每個輸入檔並列出會使用的匯入器，不連線資料庫
async fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    use report_import::app::pipelines::batch_import::{parse_archive, parse_payloads};

    println!("🔍 Dry Run Analysis:");
    println!();

    let registry = standard_registry();
    let mut matched = 0usize;
    let mut total = 0usize;

    for input in config.input_files() {
        let content = std::fs::read(input).with_context(|| format!("reading {}", input))?;
        let envelopes = if input.to_ascii_lowercase().ends_with(".zip") {
            parse_archive(input, content)?
        } else {
            parse_payloads(input, &content)
        };

        println!("📁 {}", input);
        for envelope in envelopes {
            total += 1;
            match envelope.payload.as_ref().map(|p: &ReportPayload| registry.dispatch(p)) {
                Ok(Ok(importer)) => {
                    matched += 1;
                    println!("  ✅ {} → {} ({})", envelope.source, importer.name(), importer.table());
                }
                Ok(Err(e)) => println!("  ❌ {}: {}", envelope.source, e),
                Err(message) => println!("  ❌ {}: {}", envelope.source, message),
            }
        }
    }

    println!();
    println!("📊 {} of {} payloads have an importer", matched, total);
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
