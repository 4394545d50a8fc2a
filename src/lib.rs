pub mod api;
pub mod config;
pub mod error;
pub mod kite;
pub mod service;
pub mod types;

pub use config::Config;
pub use error::AutologinError;
pub use types::kite::KiteSession;
