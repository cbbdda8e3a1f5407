pub mod service;

pub use service::{app_data_dir, LogFormat, ServiceConfig};
