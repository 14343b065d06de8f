//! Document configuration and master document assembly for adpt.
//!
//! A [`DocumentConfiguration`] is loaded (and schema-checked) or built up
//! incrementally, then handed to a [`DocumentAssembler`] that renders the
//! AsciiDoc master document. [`build::build_document`] writes it to disk
//! together with any missing fragments.

pub mod assembler;
pub mod author;
pub mod build;
pub mod configuration;
pub mod fetch;
pub mod schema;

pub use assembler::{AssembleOptions, DocumentAssembler};
pub use author::Author;
pub use configuration::{
    Chapter, ConfigSource, Copyright, DocumentConfiguration, DocumentType, FILE_NAME,
};
pub use fetch::{Fetcher, HttpFetcher};
pub use schema::DocumentSchema;
