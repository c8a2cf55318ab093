use crate::domain::model::{BatchReport, InsertRow};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn database_url(&self) -> &str;
    fn api_key(&self) -> &str;
    fn db_schema(&self) -> &str;
    fn input_files(&self) -> &[String];
    fn output_path(&self) -> &str;
    /// `csv` 及/或 `json`
    fn output_formats(&self) -> &[String];
    fn concurrent_imports(&self) -> usize;
    fn job_id(&self) -> &str;
    fn user_id(&self) -> &str;
    fn link_assets(&self) -> bool;
}

/// 託管資料庫的最小介面：欄位查詢程序與單筆新增
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Calls `get_table_columns(table_name)` and returns its raw response.
    async fn table_columns(&self, table: &str) -> Result<Value>;

    /// Inserts one row and returns the stored representation.
    async fn insert(&self, table: &str, row: &InsertRow) -> Result<Value>;
}

/// 轉換結果的計數摘要，供引擎記錄進度
pub trait TransformSummary {
    fn processed(&self) -> usize;
    fn failed(&self) -> usize;
}

impl TransformSummary for BatchReport {
    fn processed(&self) -> usize {
        self.entries.len()
    }

    fn failed(&self) -> usize {
        BatchReport::failed(self)
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Input: Send;
    type Output: Send + TransformSummary;

    async fn extract(&self) -> Result<Vec<Self::Input>>;
    async fn transform(&self, data: Vec<Self::Input>) -> Result<Self::Output>;
    async fn load(&self, result: Self::Output) -> Result<String>;
}
