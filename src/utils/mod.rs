//! Utility modules: developer logs and numeric conversions.
pub mod devlog;
pub mod num;
