use crate::core::ConfigProvider;
use crate::core::loader::DEFAULT_PROGRESS_INTERVAL;
use crate::core::transfer::DEFAULT_CONTAINER;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_hdfs_path, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_LOCAL_FILE: &str = "data/lastfm_data.csv";
pub const DEFAULT_HDFS_DESTINATION: &str = "/data/lastfm_data.csv";

/// 設定檔：`[ingest]`、`[hdfs]`、`[webhdfs]` 三段，全部欄位都有預設值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub ingest: IngestSettings,
    pub hdfs: HdfsSettings,
    pub webhdfs: WebHdfsSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    pub source_root: String,
    pub output: String,
    pub progress_interval: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            source_root: "lastfm_train".to_string(),
            output: DEFAULT_LOCAL_FILE.to_string(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HdfsSettings {
    pub local_file: String,
    pub destination: String,
    pub container: String,
    pub docker_bin: String,
    pub staging_dir: String,
    pub cleanup_staged: bool,
    pub probe_timeout_secs: u64,
}

impl Default for HdfsSettings {
    fn default() -> Self {
        Self {
            local_file: DEFAULT_LOCAL_FILE.to_string(),
            destination: DEFAULT_HDFS_DESTINATION.to_string(),
            container: DEFAULT_CONTAINER.to_string(),
            docker_bin: "docker".to_string(),
            staging_dir: "/tmp".to_string(),
            cleanup_staged: false,
            probe_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebHdfsSettings {
    pub local_file: String,
    pub destination: String,
    pub url: String,
    pub user: String,
    pub overwrite: bool,
}

impl Default for WebHdfsSettings {
    fn default() -> Self {
        Self {
            local_file: DEFAULT_LOCAL_FILE.to_string(),
            destination: DEFAULT_HDFS_DESTINATION.to_string(),
            url: "http://localhost:9870".to_string(),
            user: "root".to_string(),
            overwrite: true,
        }
    }
}

impl PipelineConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 沒有指定設定檔時使用預設值
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HDFS_USER})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl IngestSettings {
    pub fn output_dir(&self) -> &str {
        match Path::new(&self.output).parent().and_then(|p| p.to_str()) {
            Some("") | None => ".",
            Some(dir) => dir,
        }
    }

    pub fn output_file_name(&self) -> &str {
        Path::new(&self.output)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("lastfm_data.csv")
    }
}

impl ConfigProvider for IngestSettings {
    fn source_root(&self) -> &str {
        &self.source_root
    }

    fn output_path(&self) -> &str {
        self.output_dir()
    }

    fn output_file(&self) -> &str {
        self.output_file_name()
    }

    fn progress_interval(&self) -> usize {
        self.progress_interval
    }
}

impl Validate for IngestSettings {
    fn validate(&self) -> Result<()> {
        validate_path("ingest.source_root", &self.source_root)?;
        validate_path("ingest.output", &self.output)?;
        if Path::new(&self.output).file_name().is_none() {
            return Err(EtlError::InvalidConfigValueError {
                field: "ingest.output".to_string(),
                value: self.output.clone(),
                reason: "Output must name a file".to_string(),
            });
        }
        validate_positive_number("ingest.progress_interval", self.progress_interval, 1)
    }
}

impl Validate for HdfsSettings {
    fn validate(&self) -> Result<()> {
        validate_path("hdfs.local_file", &self.local_file)?;
        validate_hdfs_path("hdfs.destination", &self.destination)?;
        validate_non_empty_string("hdfs.container", &self.container)?;
        validate_non_empty_string("hdfs.docker_bin", &self.docker_bin)?;
        validate_path("hdfs.staging_dir", &self.staging_dir)?;
        validate_range("hdfs.probe_timeout_secs", self.probe_timeout_secs, 1, 600)
    }
}

impl Validate for WebHdfsSettings {
    fn validate(&self) -> Result<()> {
        validate_path("webhdfs.local_file", &self.local_file)?;
        validate_hdfs_path("webhdfs.destination", &self.destination)?;
        validate_url("webhdfs.url", &self.url)?;
        validate_non_empty_string("webhdfs.user", &self.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_docker_compose_setup() {
        let config = PipelineConfig::default();
        assert_eq!(config.hdfs.container, "namenode");
        assert_eq!(config.hdfs.destination, "/data/lastfm_data.csv");
        assert_eq!(config.hdfs.local_file, config.ingest.output);
        assert_eq!(config.webhdfs.url, "http://localhost:9870");
        assert_eq!(config.webhdfs.user, "root");
        assert!(config.ingest.validate().is_ok());
        assert!(config.hdfs.validate().is_ok());
        assert!(config.webhdfs.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml_content = r#"
[ingest]
source_root = "/mnt/lastfm_train"

[hdfs]
container = "hadoop-namenode"
cleanup_staged = true
"#;

        let config = PipelineConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.ingest.source_root, "/mnt/lastfm_train");
        assert_eq!(config.ingest.progress_interval, 10_000);
        assert_eq!(config.hdfs.container, "hadoop-namenode");
        assert!(config.hdfs.cleanup_staged);
        assert_eq!(config.hdfs.staging_dir, "/tmp");
        assert!(config.webhdfs.overwrite);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LASTFM_ETL_TEST_WEBHDFS_USER", "hdfs");

        let toml_content = r#"
[webhdfs]
user = "${LASTFM_ETL_TEST_WEBHDFS_USER}"
url = "${LASTFM_ETL_TEST_UNSET_VAR}"
"#;

        let config = PipelineConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.webhdfs.user, "hdfs");
        assert_eq!(config.webhdfs.url, "${LASTFM_ETL_TEST_UNSET_VAR}");
        assert!(config.webhdfs.validate().is_err());

        std::env::remove_var("LASTFM_ETL_TEST_WEBHDFS_USER");
    }

    #[test]
    fn test_output_split() {
        let settings = IngestSettings {
            output: "data/lastfm_data.csv".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.output_dir(), "data");
        assert_eq!(settings.output_file_name(), "lastfm_data.csv");

        let settings = IngestSettings {
            output: "out.csv".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.output_dir(), ".");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let hdfs = HdfsSettings {
            destination: "data/lastfm_data.csv".to_string(),
            ..Default::default()
        };
        assert!(hdfs.validate().is_err());

        let ingest = IngestSettings {
            progress_interval: 0,
            ..Default::default()
        };
        assert!(ingest.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[ingest]\noutput = \"exports/tracks.csv\"\n")
            .unwrap();

        let config = PipelineConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.ingest.output, "exports/tracks.csv");
        assert!(PipelineConfig::from_toml_str("[ingest\n").is_err());
    }
}
