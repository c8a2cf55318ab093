use crate::core::ConfigProvider;
use crate::utils::error::{ImportError, Result};
use crate::utils::validation::{self, Validate, PAYLOAD_EXTENSIONS};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub database: DatabaseConfig,
    pub import: ImportConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub api_key: String,
    pub schema: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url)
            .field("api_key", &"***")
            .field("schema", &self.schema)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    pub job_id: String,
    pub user_id: String,
    pub inputs: Vec<String>,
    pub concurrent_imports: Option<usize>,
    pub link_assets: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

fn default_formats() -> Vec<String> {
    vec!["csv".to_string(), "json".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ImportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ImportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_KEY})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ImportError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("database.url", &self.database.url)?;
        validation::validate_non_empty_string("database.api_key", &self.database.api_key)?;
        if self.database.api_key.contains("${") {
            return Err(ImportError::InvalidConfigValueError {
                field: "database.api_key".to_string(),
                value: "${...}".to_string(),
                reason: "Environment variable is not set".to_string(),
            });
        }
        validation::validate_non_empty_string("database.schema", self.schema())?;
        validation::validate_range("database.timeout_seconds", self.timeout_seconds(), 1, 600)?;

        validation::validate_non_empty_string("import.job_id", &self.import.job_id)?;
        validation::validate_non_empty_string("import.user_id", &self.import.user_id)?;
        if self.import.inputs.is_empty() {
            return Err(ImportError::MissingConfigError {
                field: "import.inputs".to_string(),
            });
        }
        validation::validate_file_extensions("import.inputs", &self.import.inputs, PAYLOAD_EXTENSIONS)?;
        validation::validate_range("import.concurrent_imports", self.concurrent_imports(), 1, 64)?;

        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_output_formats("output.formats", &self.output.formats)?;

        Ok(())
    }

    pub fn schema(&self) -> &str {
        self.database
            .schema
            .as_deref()
            .unwrap_or(crate::config::DEFAULT_SCHEMA)
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.database.timeout_seconds.unwrap_or(30)
    }

    pub fn concurrent_imports(&self) -> usize {
        self.import.concurrent_imports.unwrap_or(4)
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .is_some_and(|format| format.eq_ignore_ascii_case("json"))
    }
}

impl ConfigProvider for TomlConfig {
    fn database_url(&self) -> &str {
        &self.database.url
    }

    fn api_key(&self) -> &str {
        &self.database.api_key
    }

    fn db_schema(&self) -> &str {
        self.schema()
    }

    fn input_files(&self) -> &[String] {
        &self.import.inputs
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }

    fn concurrent_imports(&self) -> usize {
        self.concurrent_imports()
    }

    fn job_id(&self) -> &str {
        &self.import.job_id
    }

    fn user_id(&self) -> &str {
        &self.import.user_id
    }

    fn link_assets(&self) -> bool {
        self.import.link_assets.unwrap_or(true)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[database]
url = "https://project.supabase.co"
api_key = "service-key"

[import]
job_id = "job-1"
user_id = "user-1"
inputs = ["reports/switch.json", "reports/export.zip"]

[output]
path = "./output"
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.database_url(), "https://project.supabase.co");
        assert_eq!(config.db_schema(), "neta_ops");
        assert_eq!(config.timeout_seconds(), 30);
        assert_eq!(config.concurrent_imports(), 4);
        assert_eq!(config.output_formats(), ["csv", "json"]);
        assert!(config.link_assets());
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("REPORT_IMPORT_TEST_KEY", "from-env");

        let content = BASIC.replace("service-key", "${REPORT_IMPORT_TEST_KEY}");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.api_key(), "from-env");

        std::env::remove_var("REPORT_IMPORT_TEST_KEY");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let content = BASIC.replace("service-key", "${REPORT_IMPORT_UNSET_KEY}");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.api_key(), "${REPORT_IMPORT_UNSET_KEY}");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str(&BASIC.replace("https://project.supabase.co", "invalid-url")).unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str(&format!(
            "{}formats = [\"tsv\"]\n",
            BASIC
        ))
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let content = format!(
            "{}\n[monitoring]\nenabled = true\nlog_format = \"json\"\n",
            BASIC
        );
        temp_file.write_all(content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert!(config.monitoring_enabled());
        assert!(config.json_logs());
        assert_eq!(config.input_files().len(), 2);
    }
}
