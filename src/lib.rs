//! scopeline - incremental TextMate-style tokenization
//!
//! This crate provides the core types and logic for tokenizing editor
//! buffers line by line, caching grammar state per buffer so that edits only
//! re-tokenize from the first changed line, and resolving token scopes to
//! highlight groups.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod syntax;
pub mod tracing;

// Re-export commonly used types
pub use config::HighlightConfig;
pub use syntax::{BufferId, IncrementalTokenizer, ScopeResolver, Token};
