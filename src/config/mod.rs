pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::{ImportError, Result};
use crate::utils::validation::{self, Validate, PAYLOAD_EXTENSIONS};
use clap::Parser;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SCHEMA: &str = "neta_ops";

#[derive(Clone, Serialize, Deserialize, Parser)]
#[command(name = "report-import")]
#[command(about = "Import exported NETA test reports into the reporting database")]
pub struct CliConfig {
    #[arg(long, value_delimiter = ',', help = "Payload files (.json or .zip)")]
    pub input: Vec<String>,

    #[arg(long, env = "SUPABASE_URL", default_value = "")]
    pub database_url: String,

    #[arg(long, env = "SUPABASE_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    #[arg(long, default_value = DEFAULT_SCHEMA)]
    pub schema: String,

    #[arg(long, default_value = "")]
    pub job_id: String,

    #[arg(long, default_value = "")]
    pub user_id: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "csv,json")]
    pub output_formats: Vec<String>,

    #[arg(long, default_value = "4")]
    pub concurrent_imports: usize,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    #[arg(long, help = "Skip creating asset and job links for imported reports")]
    pub no_link_assets: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Show what would be imported without writing to the database")]
    pub dry_run: bool,
}

impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("input", &self.input)
            .field("database_url", &self.database_url)
            .field("api_key", &"***")
            .field("schema", &self.schema)
            .field("job_id", &self.job_id)
            .field("user_id", &self.user_id)
            .field("output_path", &self.output_path)
            .field("output_formats", &self.output_formats)
            .field("concurrent_imports", &self.concurrent_imports)
            .field("no_link_assets", &self.no_link_assets)
            .finish()
    }
}

impl ConfigProvider for CliConfig {
    fn database_url(&self) -> &str {
        &self.database_url
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn db_schema(&self) -> &str {
        &self.schema
    }

    fn input_files(&self) -> &[String] {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn concurrent_imports(&self) -> usize {
        self.concurrent_imports
    }

    fn job_id(&self) -> &str {
        &self.job_id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn link_assets(&self) -> bool {
        !self.no_link_assets
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.input.is_empty() {
            return Err(ImportError::MissingConfigError {
                field: "input".to_string(),
            });
        }
        validation::validate_file_extensions("input", &self.input, PAYLOAD_EXTENSIONS)?;
        validation::validate_url("database_url", &self.database_url)?;
        validation::validate_non_empty_string("api_key", &self.api_key)?;
        validation::validate_non_empty_string("schema", &self.schema)?;
        validation::validate_non_empty_string("job_id", &self.job_id)?;
        validation::validate_non_empty_string("user_id", &self.user_id)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_output_formats("output_formats", &self.output_formats)?;
        validation::validate_range("concurrent_imports", self.concurrent_imports, 1, 64)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["report-import"];
        argv.extend_from_slice(args);
        CliConfig::parse_from(argv)
    }

    const VALID: &[&str] = &[
        "--input",
        "switch.json,export.zip",
        "--database-url",
        "https://project.supabase.co",
        "--api-key",
        "service-key",
        "--job-id",
        "job-1",
        "--user-id",
        "user-1",
    ];

    #[test]
    fn test_cli_defaults() {
        let config = parse(VALID);
        assert_eq!(config.input, vec!["switch.json", "export.zip"]);
        assert_eq!(config.db_schema(), DEFAULT_SCHEMA);
        assert_eq!(config.output_formats(), ["csv", "json"]);
        assert_eq!(config.concurrent_imports(), 4);
        assert!(config.link_assets());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_validation_failures() {
        let mut config = parse(VALID);
        config.no_link_assets = true;
        assert!(!config.link_assets());

        config.concurrent_imports = 0;
        assert!(config.validate().is_err());

        let mut config = parse(VALID);
        config.input = vec!["report.pdf".to_string()];
        assert!(config.validate().is_err());

        let mut config = parse(VALID);
        config.job_id = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = parse(VALID);
        assert!(!format!("{:?}", config).contains("service-key"));
    }
}
