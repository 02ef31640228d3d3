//! DOCX Translator - Russian/Kazakh document translation service
//!
//! Translates the text of `.docx` documents while preserving paragraph and
//! table structure and run-level formatting. Exposes an HTTP upload endpoint
//! and a CLI for local files.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;
pub mod processors;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    client::{Translate, TranslationClient},
    config::TranslatorConfig,
    errors::TranslationError,
    models::Direction,
};

pub use crate::processors::docx::DocxProcessor;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
