// Domain layer: core models and ports (interfaces) shared by the ingest and transfer pipelines.

pub mod model;
pub mod ports;
