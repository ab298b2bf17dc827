use crate::core::aggregate::aggregate;
use crate::core::table::{InputShape, TableReader};
use crate::core::{AggregateResult, ConfigProvider, FileSource, Pipeline, Storage, WarehouseSink};
use crate::utils::error::Result;
use std::path::Path;

/// Fetch the daily orders export, aggregate it and append the result to
/// the warehouse. Wiring is the caller's job; this type only sequences
/// the stages over the ports.
pub struct OrdersPipeline<F: FileSource, W: WarehouseSink, S: Storage, C: ConfigProvider> {
    source: F,
    sink: W,
    storage: S,
    config: C,
    reader: TableReader,
}

impl<F: FileSource, W: WarehouseSink, S: Storage, C: ConfigProvider> OrdersPipeline<F, W, S, C> {
    pub fn new(source: F, sink: W, storage: S, config: C) -> Self {
        // The upstream export is stored transposed; see TableReader.
        Self {
            source,
            sink,
            storage,
            config,
            reader: TableReader::new(InputShape::Transposed),
        }
    }

    /// Override the input orientation, for sources that already deliver
    /// row-major files.
    pub fn with_input_shape(mut self, shape: InputShape) -> Self {
        self.reader = TableReader::new(shape);
        self
    }
}

#[async_trait::async_trait]
impl<F: FileSource, W: WarehouseSink, S: Storage, C: ConfigProvider> Pipeline
    for OrdersPipeline<F, W, S, C>
{
    async fn extract(&self) -> Result<Vec<u8>> {
        let remote_name = self.config.remote_file_name();
        let local_name = self.config.local_file_name();

        std::fs::create_dir_all(self.config.spool_dir())?;
        let local_path = Path::new(self.config.spool_dir()).join(&local_name);

        tracing::debug!("Fetching {} to {}", remote_name, local_path.display());
        let bytes = self
            .source
            .fetch(&remote_name, &local_path.to_string_lossy())
            .await?;
        tracing::info!("Downloaded {} ({} bytes)", remote_name, bytes);

        self.storage.read_file(&local_name).await
    }

    async fn transform(&self, data: Vec<u8>) -> Result<AggregateResult> {
        let table = self.reader.read(&data)?;
        tracing::debug!(
            "Parsed table with columns {:?} and {} records",
            table.header,
            table.rows.len()
        );
        aggregate(&table)
    }

    async fn load(&self, result: AggregateResult) -> Result<String> {
        if result.stats.is_empty() {
            tracing::warn!("No aggregated rows for {}", self.config.run_date());
        }
        let written = self.sink.append(&result.stats).await?;
        Ok(format!(
            "{} ({} rows appended)",
            self.sink.destination(),
            written
        ))
    }
}
