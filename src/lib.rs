pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{bigquery::BigQuerySink, sftp::SftpSource};
pub use config::{cli::LocalStorage, CliConfig};
pub use core::{etl::EtlEngine, pipeline::OrdersPipeline};
pub use utils::error::{EtlError, Result};
