use crate::utils::error::{ImportError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 匯入檔案允許的副檔名
pub const PAYLOAD_EXTENSIONS: &[&str] = &["json", "zip"];

/// 執行摘要支援的輸出格式
pub const OUTPUT_FORMATS: &[&str] = &["csv", "json"];

pub fn validate_output_formats(field_name: &str, formats: &[String]) -> Result<()> {
    if formats.is_empty() {
        return Err(ImportError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    for format in formats {
        if !OUTPUT_FORMATS.contains(&format.as_str()) {
            return Err(ImportError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    OUTPUT_FORMATS.join(", ")
                ),
            });
        }
    }
    Ok(())
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ImportError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        let extension = std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension {
            Some(ext) if allowed_set.contains(ext.as_str()) => {}
            Some(ext) => {
                return Err(ImportError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        ext,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(ImportError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("database_url", "https://project.supabase.co").is_ok());
        assert!(validate_url("database_url", "http://localhost:54321").is_ok());
        assert!(validate_url("database_url", "").is_err());
        assert!(validate_url("database_url", "invalid-url").is_err());
        assert!(validate_url("database_url", "postgres://db:5432").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("concurrent_imports", 5, 1, 64).is_ok());
        assert!(validate_range("concurrent_imports", 0, 1, 64).is_err());
        assert!(validate_range("concurrent_imports", 65, 1, 64).is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        let files = vec!["switch.json".to_string(), "export.ZIP".to_string()];
        assert!(validate_file_extensions("inputs", &files, PAYLOAD_EXTENSIONS).is_ok());

        let invalid_files = vec!["report.pdf".to_string()];
        assert!(validate_file_extensions("inputs", &invalid_files, PAYLOAD_EXTENSIONS).is_err());

        let no_extension = vec!["README".to_string()];
        assert!(validate_file_extensions("inputs", &no_extension, PAYLOAD_EXTENSIONS).is_err());
    }

    #[test]
    fn test_validate_output_formats() {
        assert!(validate_output_formats("formats", &["csv".to_string(), "json".to_string()]).is_ok());
        assert!(validate_output_formats("formats", &["tsv".to_string()]).is_err());
        assert!(validate_output_formats("formats", &[]).is_err());
    }

    #[test]
    fn test_validate_non_empty() {
        assert!(validate_non_empty_string("import.user_id", "   ").is_err());
        assert!(validate_non_empty_string("import.user_id", "u-1").is_ok());
    }
}
