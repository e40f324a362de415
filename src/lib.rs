//! imessage-otp library
//!
//! Pulls the verification code out of the most recent message in the macOS
//! Messages database and serves it on a loopback HTTP endpoint.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial library structure

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod output;
pub mod server;

pub use extract::{CodeExtractor, ExtractionResult, ExtractionStatus, KeywordSet};
