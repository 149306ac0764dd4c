//! Core business logic module
//!
//! This module contains the domain models, input classification, batch file
//! parsing, task building and submission for the task builder.

pub mod batch_parser;
pub mod config;
pub mod dispatcher;
pub mod error_handling;
pub mod input_classifier;
pub mod models;
pub mod notice;
pub mod task_builder;




// Re-export commonly used types
pub use config::AppConfig;
pub use task_builder::TaskOptionBuilder;
