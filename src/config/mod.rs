pub mod app_config;
pub mod source_table;

pub use app_config::{AppConfig, ConfigError};
pub use source_table::{SourceTable, SourceTableEntry};
