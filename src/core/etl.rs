use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: RunMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::default(),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    /// Run the three stages in order. Each stage completes before the
    /// next begins; any error aborts the run.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting ETL run");

        let raw = self.pipeline.extract().await?;
        tracing::info!("Extracted {} bytes", raw.len());
        self.monitor.stage_done("extract");

        let result = self.pipeline.transform(raw).await?;
        tracing::info!(
            "Aggregated {} records into {} customer-day groups",
            result.source_records,
            result.stats.len()
        );
        self.monitor.stage_done("transform");

        let summary = self.pipeline.load(result).await?;
        tracing::info!("Loaded: {}", summary);
        self.monitor.stage_done("load");

        self.monitor.log_final_stats();
        Ok(summary)
    }
}
