// src/models/mod.rs

//! Domain models for newslaunch.
//!
//! Article previews, search parameters and results, and the application
//! configuration.

mod article;
mod config;
mod search;

// Re-export all public types
pub use article::{
    ArticlePreview, FIELD_ALIASES, PREVIEW_MAX_CHARS, truncate_hard, truncate_preview,
};
pub use config::{AppConfig, GuardianConfig, KinesisConfig, LoggingConfig};
pub use search::{
    DATE_FORMAT, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, OrderBy, SearchParams, SearchResults,
};
