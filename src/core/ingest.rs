use crate::core::exporter::{build_table, TabularExporter};
use crate::core::loader::RecordLoader;
use crate::core::{ConfigProvider, Pipeline, Record, Storage, TransformResult};
use crate::utils::error::Result;
use std::path::Path;

/// JSON 目錄 -> 表格 -> CSV
pub struct IngestPipeline<S: Storage, C: ConfigProvider> {
    exporter: TabularExporter<S>,
    config: C,
}

impl<S: Storage, C: ConfigProvider> IngestPipeline<S, C> {
    /// `storage` 是輸出目錄（`config.output_path()`）
    pub fn new(storage: S, config: C) -> Self {
        Self {
            exporter: TabularExporter::new(storage),
            config,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for IngestPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Record>> {
        let mut loader = RecordLoader::for_directory(self.config.source_root())
            .with_progress_interval(self.config.progress_interval());

        let report = loader.load_all().await?;
        if !report.failures.is_empty() {
            tracing::warn!(
                "⚠️ {} of {} files could not be loaded",
                report.failures.len(),
                report.discovered
            );
        }

        Ok(loader.into_records())
    }

    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
        let table = build_table(&data);
        Ok(TransformResult { table })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let file_name = self.config.output_file();
        let output_path = Path::new(self.config.output_path()).join(file_name);

        tracing::info!("Saving data to {}...", output_path.display());
        let bytes = self.exporter.export(&result.table, file_name).await?;
        tracing::debug!("Wrote {} bytes", bytes);

        Ok(output_path.to_string_lossy().into_owned())
    }
}
