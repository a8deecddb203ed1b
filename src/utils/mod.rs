//! Shared utilities: data rate parsing and configuration validation.

pub mod data_rate;
pub mod validation;

pub use data_rate::parse_data_rate;
pub use validation::{validate_log_level, validate_loopback_prefixes};
