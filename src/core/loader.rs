use crate::adapters::storage::LocalStorage;
use crate::core::exporter::{build_table, union_columns};
use crate::core::scanner::DirectoryScanner;
use crate::domain::model::{DatasetStats, LoadFailure, LoadReport, Record, Table};
use crate::domain::ports::Storage;
use crate::utils::error::Result;

pub const DEFAULT_PROGRESS_INTERVAL: usize = 10_000;

/// 把掃描到的 JSON 檔逐一解析成記錄；單檔失敗只記錄錯誤並略過
pub struct RecordLoader<S: Storage> {
    storage: S,
    scanner: DirectoryScanner,
    progress_interval: usize,
    data: Vec<Record>,
    report: Option<LoadReport>,
}

impl RecordLoader<LocalStorage> {
    pub fn for_directory(root: &str) -> Self {
        Self::new(LocalStorage::new(root), DirectoryScanner::new(root))
    }
}

impl<S: Storage> RecordLoader<S> {
    /// `storage` 的根目錄必須與 `scanner` 相同，掃描結果是相對路徑
    pub fn new(storage: S, scanner: DirectoryScanner) -> Self {
        Self {
            storage,
            scanner,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            data: Vec::new(),
            report: None,
        }
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.report.is_some()
    }

    pub fn records(&self) -> &[Record] {
        &self.data
    }

    pub fn into_records(self) -> Vec<Record> {
        self.data
    }

    pub fn report(&self) -> Option<&LoadReport> {
        self.report.as_ref()
    }

    pub async fn load_all(&mut self) -> Result<&LoadReport> {
        let files = self.scanner.scan()?;
        let total = files.len();
        tracing::info!("Found {} JSON files to load...", total);

        let mut data = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for (idx, path) in files.iter().enumerate() {
            match self.load_one(path).await {
                Ok(record) => data.push(record),
                Err(e) => {
                    tracing::error!("Error loading {}: {}", path, e);
                    failures.push(LoadFailure {
                        path: path.clone(),
                        error: e.to_string(),
                    });
                }
            }

            if (idx + 1) % self.progress_interval == 0 {
                tracing::info!("Loaded {}/{} files...", idx + 1, total);
            }
        }

        tracing::info!("Successfully loaded {} records", data.len());
        self.data = data;

        let report = LoadReport {
            discovered: total,
            loaded: self.data.len(),
            failures,
        };
        Ok(&*self.report.insert(report))
    }

    async fn load_one(&self, path: &str) -> Result<Record> {
        let bytes = self.storage.read_file(path).await?;
        let text = String::from_utf8(bytes).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e)
        })?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        Ok(Record::from_value(value))
    }

    async fn ensure_loaded(&mut self) -> Result<()> {
        if !self.is_loaded() {
            tracing::info!("No data loaded. Loading data first...");
            self.load_all().await?;
        }
        Ok(())
    }

    pub async fn statistics(&mut self) -> Result<DatasetStats> {
        self.ensure_loaded().await?;

        let bytes: usize = self.data.iter().map(Record::serialized_len).sum();
        Ok(DatasetStats {
            total_records: self.data.len(),
            columns: union_columns(&self.data),
            memory_usage_mb: bytes as f64 / (1024.0 * 1024.0),
        })
    }

    pub async fn to_table(&mut self) -> Result<Table> {
        self.ensure_loaded().await?;
        Ok(build_table(&self.data))
    }
}
