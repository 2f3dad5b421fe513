pub mod format;
pub mod validation;

pub use format::{format_bytes, format_rate, format_uptime};
