//! File parsing modules
//!
//! Contains parsers for playlist files inspected offline.

pub mod m3u8_parser;

// Re-export commonly used parsers
pub use m3u8_parser::*;
