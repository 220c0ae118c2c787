#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{HdfsUploadArgs, IngestArgs, WebHdfsUploadArgs};
pub use toml_config::{HdfsSettings, IngestSettings, PipelineConfig, WebHdfsSettings};
