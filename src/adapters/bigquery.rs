use crate::core::{CustomerDayStats, WarehouseSink, WriteMode};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use gcp_bigquery_client::error::BQError;
use gcp_bigquery_client::model::query_request::QueryRequest;
use gcp_bigquery_client::model::table_data_insert_all_request::TableDataInsertAllRequest;
use gcp_bigquery_client::Client;
use std::collections::BTreeSet;

impl From<BQError> for EtlError {
    fn from(error: BQError) -> Self {
        EtlError::WriteError {
            message: error.to_string(),
        }
    }
}

/// Destination addressed as `dataset.table` within one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub dataset: String,
    pub table: String,
}

impl TableSpec {
    pub fn parse(value: &str) -> Result<Self> {
        match value.split_once('.') {
            Some((dataset, table))
                if !dataset.is_empty() && !table.is_empty() && !table.contains('.') =>
            {
                Ok(Self {
                    dataset: dataset.to_string(),
                    table: table.to_string(),
                })
            }
            _ => Err(EtlError::InvalidConfigValueError {
                field: "destination_table".to_string(),
                value: value.to_string(),
                reason: "Expected the form 'dataset.table'".to_string(),
            }),
        }
    }
}

/// Streaming-insert sink for the aggregated rows. The destination
/// schema is `customerId:STRING, date:DATE, totalAmount:FLOAT,
/// avgAmount:FLOAT, medianAmount:FLOAT`; row serialization in
/// `CustomerDayStats` matches it by name.
pub struct BigQuerySink {
    client: Client,
    project_id: String,
    spec: TableSpec,
    mode: WriteMode,
}

impl BigQuerySink {
    /// Authenticate and build the sink. Uses the service account key
    /// file when given, application default credentials otherwise.
    pub async fn connect(
        project_id: impl Into<String>,
        destination_table: &str,
        service_account_key: Option<&str>,
        mode: WriteMode,
    ) -> Result<Self> {
        let spec = TableSpec::parse(destination_table)?;
        let client = match service_account_key {
            Some(key_file) => Client::from_service_account_key_file(key_file).await?,
            None => Client::from_application_default_credentials().await?,
        };

        Ok(Self {
            client,
            project_id: project_id.into(),
            spec,
            mode,
        })
    }

}

fn delete_statement(project_id: &str, spec: &TableSpec, date: NaiveDate) -> String {
    format!(
        "DELETE FROM `{}.{}.{}` WHERE date = '{}'",
        project_id, spec.dataset, spec.table, date
    )
}

#[async_trait]
impl WarehouseSink for BigQuerySink {
    async fn append(&self, rows: &[CustomerDayStats]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        tracing::debug!("First row: {}", serde_json::to_string(&rows[0])?);

        if self.mode == WriteMode::ReplaceDate {
            let dates: BTreeSet<NaiveDate> = rows.iter().map(|row| row.date).collect();
            for date in dates {
                tracing::info!("Replacing existing rows for {}", date);
                let statement = delete_statement(&self.project_id, &self.spec, date);
                self.client
                    .job()
                    .query(&self.project_id, QueryRequest::new(statement))
                    .await?;
            }
        }

        let mut request = TableDataInsertAllRequest::new();
        for row in rows {
            request.add_row(None, row)?;
        }

        let response = self
            .client
            .tabledata()
            .insert_all(&self.project_id, &self.spec.dataset, &self.spec.table, request)
            .await?;

        if let Some(errors) = response.insert_errors {
            if !errors.is_empty() {
                return Err(EtlError::WriteError {
                    message: format!("{} rows rejected by streaming insert", errors.len()),
                });
            }
        }

        Ok(rows.len())
    }

    fn destination(&self) -> String {
        format!(
            "{}.{}.{}",
            self.project_id, self.spec.dataset, self.spec.table
        )
    }
}
