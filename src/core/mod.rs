pub mod etl;
pub mod exporter;
pub mod ingest;
pub mod loader;
pub mod rest_transfer;
pub mod scanner;
pub mod transfer;

pub use crate::domain::model::{Record, TransformResult};
pub use crate::domain::ports::{CommandRunner, ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
