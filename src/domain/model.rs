use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 非物件的 JSON 文件會包在這個欄位下
pub const SCALAR_RECORD_KEY: &str = "value";

/// 一個 JSON 檔案解析後的內容，欄位順序與原文件一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(data) => Self { data },
            other => {
                let mut data = Map::new();
                data.insert(SCALAR_RECORD_KEY.to_string(), other);
                Self { data }
            }
        }
    }

    /// 緊湊 JSON 序列化後的位元組數
    pub fn serialized_len(&self) -> usize {
        serde_json::to_string(&self.data).map(|s| s.len()).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub discovered: usize,
    pub loaded: usize,
    pub failures: Vec<LoadFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailure {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    pub total_records: usize,
    pub columns: Vec<String>,
    pub memory_usage_mb: f64,
}

/// 欄位為所有記錄鍵的聯集，缺值以空字串表示
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub table: Table,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTarget {
    pub local_path: String,
    pub remote_path: String,
}

impl TransferTarget {
    pub fn new(local_path: impl Into<String>, remote_path: impl Into<String>) -> Self {
        Self {
            local_path: local_path.into(),
            remote_path: remote_path.into(),
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        std::path::Path::new(&self.local_path)
            .file_name()
            .and_then(|name| name.to_str())
    }

    /// 遠端目的地的父目錄，例如 `/data/lastfm_data.csv` -> `/data`
    pub fn remote_parent(&self) -> &str {
        match self.remote_path.rfind('/') {
            Some(0) | None => "/",
            Some(idx) => &self.remote_path[..idx],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStep {
    Stage,
    EnsureRemoteDir,
    Upload,
    Verify,
    Cleanup,
}

impl TransferStep {
    pub fn label(&self) -> &'static str {
        match self {
            TransferStep::Stage => "Copy to container",
            TransferStep::EnsureRemoteDir => "Ensure HDFS directory",
            TransferStep::Upload => "Upload to HDFS",
            TransferStep::Verify => "Verify HDFS file",
            TransferStep::Cleanup => "Remove staged file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Performed,
    /// 前置檢查發現目標已存在
    Skipped,
    /// dry-run 模式下會執行的步驟
    Planned,
    Warned(String),
    Ignored(String),
}

#[derive(Debug, Clone)]
pub struct TransferReport {
    pub target: TransferTarget,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub steps: Vec<(TransferStep, StepOutcome)>,
    pub listing: Option<String>,
}

impl TransferReport {
    pub fn outcome(&self, step: TransferStep) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, outcome)| outcome)
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFileInfo {
    pub path: String,
    pub length: u64,
}
