//! Shared error model, configuration and identifier helpers for adpt.
//!
//! This crate is the foundation depended on by the other adpt crates.
//! It provides:
//! - [`AdptError`], the unified error type
//! - Configuration ([`AppConfig`], [`RemoteConfig`], [`LayoutConfig`], config loading)
//! - Slug helpers ([`slug`], [`document_id`]) and [`check_target_directory`]

pub mod config;
pub mod error;
pub mod ids;
pub mod target_dir;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_LOCALE_URL_TEMPLATE, DEFAULT_SCHEMA_URL, LANG_PLACEHOLDER, LayoutConfig,
    RemoteConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{AdptError, Result};
pub use ids::{document_id, slug};
pub use target_dir::check_target_directory;
