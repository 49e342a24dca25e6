pub mod aws;
pub mod config;
pub mod event;
pub mod monitoring;
pub mod utils;

pub use config::AppConfig;
pub use monitoring::{EventDispatcher, InvocationResult};
pub use utils::AppError;
