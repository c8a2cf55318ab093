use crate::domain::model::InsertRow;
use crate::domain::ports::ReportStore;
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

pub const COLUMNS_PROCEDURE: &str = "get_table_columns";

/// PostgREST 介面的報告資料庫，所有請求都指定同一個 schema
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: Client,
    base_url: Url,
    api_key: String,
    schema: String,
}

impl SupabaseStore {
    pub fn new(database_url: &str, api_key: &str, schema: &str, timeout: Duration) -> Result<Self> {
        let normalized = format!("{}/", database_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|e| ImportError::InvalidConfigValueError {
            field: "database_url".to_string(),
            value: database_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
            schema: schema.to_string(),
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ImportError::ConfigError {
                message: format!("Cannot build endpoint '{}': {}", path, e),
            })
    }

    fn post(&self, url: Url) -> RequestBuilder {
        self.client
            .post(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept-Profile", &self.schema)
            .header("Content-Profile", &self.schema)
    }

    async fn read_body(response: Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("Database response status: {}", status);

        if !status.is_success() {
            return Err(ImportError::ApiStatusError {
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ReportStore for SupabaseStore {
    async fn table_columns(&self, table: &str) -> Result<Value> {
        let url = self.endpoint(&format!("rest/v1/rpc/{}", COLUMNS_PROCEDURE))?;
        tracing::debug!("📡 Describing {}.{}", self.schema, table);

        let response = self
            .post(url)
            .json(&json!({ "table_name": table }))
            .send()
            .await?;
        Self::read_body(response).await
    }

    async fn insert(&self, table: &str, row: &InsertRow) -> Result<Value> {
        let url = self.endpoint(&format!("rest/v1/{}", table))?;
        tracing::debug!("📡 Inserting into {}.{} ({} columns)", self.schema, table, row.len());

        let response = self
            .post(url)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        Self::read_body(response).await.map_err(|e| match e {
            ImportError::ApiStatusError { status, body } => ImportError::InsertError {
                table: table.to_string(),
                message: format!("HTTP {}: {}", status, body),
            },
            other => other,
        })
    }
}
