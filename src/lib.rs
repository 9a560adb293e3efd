//! # Gist Storage
//!
//! A virtual filesystem backend that stores files as entries inside a
//! single GitHub Gist:
//! - Thin async client for the Gist REST API (create, update, download,
//!   list, delete)
//! - Filesystem-shaped adapter (exists, read, write, delete, move, copy,
//!   list, metadata) over the flat gist namespace
//! - Lazy whole-gist listing cache, invalidated on every mutation
//! - Optional auto-creation of the backing gist on first write
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gist_storage::{FilesystemAdapter, GistAdapter, GistClient, GistConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GistConfig::builder()
//!         .token("ghp_xxxxxxxxxxxx")
//!         .gist_id("a1b2c3d4e5")
//!         .build()?;
//!
//!     let adapter = GistAdapter::new(GistClient::new(config)?);
//!
//!     adapter.write("hello.txt", "Hello, World!").await?;
//!     let content = adapter.read("hello.txt").await?;
//!     println!("{}", content);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod types;

// HTTP client
pub mod client;

// Filesystem adapter
pub mod adapter;

// Re-exports for convenience
pub use adapter::{FileAttributes, FilesystemAdapter, GistAdapter, Visibility};
pub use client::GistClient;
pub use config::{GistConfig, GistConfigBuilder};
pub use errors::{GistError, GistErrorKind, GistResult};
pub use types::*;
