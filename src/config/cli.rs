use crate::config::toml_config::{HdfsSettings, IngestSettings, PipelineConfig, WebHdfsSettings};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "lastfm-etl")]
#[command(about = "Load Last.fm JSON records recursively and export them to CSV")]
pub struct IngestArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory scanned recursively for *.json files
    #[arg(long)]
    pub source_root: Option<String>,

    /// CSV output file
    #[arg(short, long)]
    pub output: Option<String>,

    #[arg(long)]
    pub progress_interval: Option<usize>,

    /// Number of rows to preview after loading
    #[arg(long, default_value = "5")]
    pub preview: usize,

    /// Print statistics only, skip the CSV export
    #[arg(long)]
    pub stats_only: bool,

    #[arg(long, help = "Enable CPU/memory monitoring per phase")]
    pub monitor: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl IngestArgs {
    /// CLI 參數 > 設定檔 > 預設值
    pub fn resolve(&self) -> Result<IngestSettings> {
        let mut settings = PipelineConfig::load(self.config.as_deref())?.ingest;

        if let Some(root) = &self.source_root {
            settings.source_root = root.clone();
        }
        if let Some(output) = &self.output {
            settings.output = output.clone();
        }
        if let Some(interval) = self.progress_interval {
            settings.progress_interval = interval;
        }

        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "hdfs-upload")]
#[command(about = "Upload the exported CSV into HDFS through docker exec and the hdfs CLI")]
pub struct HdfsUploadArgs {
    #[arg(short, long)]
    pub config: Option<String>,

    /// Local CSV file to upload
    #[arg(long)]
    pub local_file: Option<String>,

    /// Destination path in HDFS
    #[arg(long)]
    pub destination: Option<String>,

    /// Name of the namenode container
    #[arg(long)]
    pub container: Option<String>,

    /// Container runtime binary (docker, podman)
    #[arg(long)]
    pub docker_bin: Option<String>,

    /// Staging directory inside the container
    #[arg(long)]
    pub staging_dir: Option<String>,

    /// Remove the staged copy from the container afterwards
    #[arg(long)]
    pub cleanup: bool,

    #[arg(long)]
    pub probe_timeout_secs: Option<u64>,

    /// Run the checks and report what would be done, without changing anything
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long)]
    pub log_json: bool,
}

impl HdfsUploadArgs {
    pub fn resolve(&self) -> Result<HdfsSettings> {
        let mut settings = PipelineConfig::load(self.config.as_deref())?.hdfs;

        if let Some(local_file) = &self.local_file {
            settings.local_file = local_file.clone();
        }
        if let Some(destination) = &self.destination {
            settings.destination = destination.clone();
        }
        if let Some(container) = &self.container {
            settings.container = container.clone();
        }
        if let Some(docker_bin) = &self.docker_bin {
            settings.docker_bin = docker_bin.clone();
        }
        if let Some(staging_dir) = &self.staging_dir {
            settings.staging_dir = staging_dir.clone();
        }
        if self.cleanup {
            settings.cleanup_staged = true;
        }
        if let Some(timeout) = self.probe_timeout_secs {
            settings.probe_timeout_secs = timeout;
        }

        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "webhdfs-upload")]
#[command(about = "Upload the exported CSV into HDFS over the WebHDFS REST API")]
pub struct WebHdfsUploadArgs {
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub local_file: Option<String>,

    #[arg(long)]
    pub destination: Option<String>,

    /// Namenode web address, e.g. http://localhost:9870
    #[arg(long)]
    pub url: Option<String>,

    #[arg(long)]
    pub user: Option<String>,

    /// Fail instead of replacing an existing HDFS file
    #[arg(long)]
    pub no_overwrite: bool,

    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long)]
    pub log_json: bool,
}

impl WebHdfsUploadArgs {
    pub fn resolve(&self) -> Result<WebHdfsSettings> {
        let mut settings = PipelineConfig::load(self.config.as_deref())?.webhdfs;

        if let Some(local_file) = &self.local_file {
            settings.local_file = local_file.clone();
        }
        if let Some(destination) = &self.destination {
            settings.destination = destination.clone();
        }
        if let Some(url) = &self.url {
            settings.url = url.clone();
        }
        if let Some(user) = &self.user {
            settings.user = user.clone();
        }
        if self.no_overwrite {
            settings.overwrite = false;
        }

        settings.validate()?;
        Ok(settings)
    }
}
