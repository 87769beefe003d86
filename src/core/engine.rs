use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::HarvestMonitor;

pub struct HarvestEngine<P: Pipeline> {
    pipeline: P,
    monitor: HarvestMonitor,
}

impl<P: Pipeline> HarvestEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: HarvestMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: HarvestMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting harvest");

        tracing::info!("Extracting profiles...");
        let records = self.pipeline.extract().await?;
        tracing::info!("Extracted {} profiles", records.len());
        self.monitor.log_stats("extract");

        tracing::info!("Rendering output...");
        let output = self.pipeline.transform(records).await?;
        tracing::info!("Rendered {} records", output.records.len());
        self.monitor.log_stats("transform");

        tracing::info!("Writing output...");
        let output_path = self.pipeline.load(output).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
