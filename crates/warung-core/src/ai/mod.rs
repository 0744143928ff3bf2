//! Chat-completion provider integration and prompt/parse helpers.

mod client;
mod json;

pub mod insights;
pub mod normalizer;

pub use client::{ChatClient, CompletionProvider, CompletionRequest};
pub use json::extract_json_object;
