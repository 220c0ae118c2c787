use crate::core::exporter::union_columns;
use crate::core::Pipeline;
use crate::domain::model::Record;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor_enabled: bool,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor_enabled,
        }
    }

    pub async fn run(&self) -> Result<String> {
        let mut monitor = SystemMonitor::new(self.monitor_enabled);
        tracing::info!("Starting HDFS data load...");

        // Extract：掃描並解析 JSON
        let records = self.pipeline.extract().await?;
        log_dataset_summary(&records);
        monitor.log_stats("Extract");

        // Transform：轉成表格
        tracing::info!("Converting to table...");
        let result = self.pipeline.transform(records).await?;
        let (rows, cols) = result.table.shape();
        tracing::info!("Table shape: ({}, {})", rows, cols);
        monitor.log_stats("Transform");

        // Load：寫出 CSV
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Data saved to {}", output_path);
        monitor.log_stats("Load");
        monitor.log_final_stats();

        Ok(output_path)
    }
}

fn log_dataset_summary(records: &[Record]) {
    let bytes: usize = records.iter().map(Record::serialized_len).sum();
    tracing::info!("Total Records: {}", records.len());
    tracing::info!("Columns: {:?}", union_columns(records));
    tracing::info!(
        "Memory Usage: {:.2} MB",
        bytes as f64 / (1024.0 * 1024.0)
    );
}
