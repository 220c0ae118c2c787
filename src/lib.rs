pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{HdfsUploadArgs, IngestArgs, WebHdfsUploadArgs};

pub use adapters::{LocalStorage, SystemCommandRunner, WebHdfsClient};
pub use core::{etl::EtlEngine, ingest::IngestPipeline};
pub use utils::error::{EtlError, Result};
