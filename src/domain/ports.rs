use crate::domain::model::{AggregateResult, CustomerDayStats, WriteMode};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn run_date(&self) -> NaiveDate;
    fn spool_dir(&self) -> &str;
    fn write_mode(&self) -> WriteMode;

    /// Name of the daily export on the remote host.
    fn remote_file_name(&self) -> String {
        format!("orders_{}.csv", self.run_date())
    }

    /// Name of the spooled copy on local disk.
    fn local_file_name(&self) -> String {
        "orders_temp.csv".to_string()
    }
}

/// Retrieves one file from a remote host into local storage. The
/// implementation owns the session lifecycle and must release it on
/// every exit path.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Returns the number of bytes written to `local_path`.
    async fn fetch(&self, remote_path: &str, local_path: &str) -> Result<u64>;
}

/// Appends aggregated rows to the destination table.
#[async_trait]
pub trait WarehouseSink: Send + Sync {
    /// Returns the number of rows written.
    async fn append(&self, rows: &[CustomerDayStats]) -> Result<usize>;

    /// Human-readable destination identifier for logs and summaries.
    fn destination(&self) -> String;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<u8>>;
    async fn transform(&self, data: Vec<u8>) -> Result<AggregateResult>;
    async fn load(&self, result: AggregateResult) -> Result<String>;
}
