//! Report module - summary text and the model-written README

mod client;
mod generator;
mod summary;

use thiserror::Error;

pub use client::{ChatClient, ChatMessage, OpenAiClient};
pub use generator::{ReportGenerator, README_FILE};
pub use summary::SummaryBuilder;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Failed to write {}: {}", .path.display(), .source)]
    Write {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}
