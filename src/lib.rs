//! # libws - Library Workspace Manager
//!
//! `libws` manages a local workspace of independently versioned libraries
//! published in a remote registry. It clones a library together with its
//! whole dependency tree and runs git operations across every checkout in
//! the workspace.
//!
//! ## Features
//!
//! - **Dependency resolution**: Walk the registry's dependency graph and
//!   collect every library exactly once, reporting unknown names per branch
//! - **Step-by-step batches**: Clone, pull and push one repository at a time
//!   so progress can be shown between steps
//! - **Parallel operations**: Status, commit and diff across all checkouts at once
//! - **Combined patches**: Diffs rerooted under each repository's directory
//!
//! ## Quick Start
//!
//! ```bash
//! # Clone a library and everything it depends on
//! libws clone H5P.Column
//!
//! # Pull every checkout in the current directory
//! libws pull
//!
//! # One patch for the whole workspace
//! libws diff -o workspace.patch
//! ```
//!
//! ## Architecture
//!
//! The crate is organized using clean architecture principles:
//!
//! - [`domain`]: Core entities (libraries, registry, repositories, operations)
//! - [`application`]: Dependency resolution, batch queue and use cases
//! - [`infrastructure`]: Registry access, git subprocesses, file system
//! - [`presentation`]: CLI interface and user interaction
//! - [`common`]: Shared error handling
//!
//! ## Examples
//!
//! ```rust,no_run
//! use libws::application::services::DependencyResolver;
//! use libws::infrastructure::registry::{RegistryClient, RegistryClientConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = RegistryClient::new(RegistryClientConfig::new(
//!     "https://registry.example.org/libraries.json",
//! ))?;
//! let resolver = DependencyResolver::new(Arc::new(client));
//!
//! let resolution = resolver.resolve(&["H5P.Column"]).await?;
//! for library in resolution.collection.iter() {
//!     println!("{} {}", library.machine_name, library.version());
//! }
//! for error in &resolution.errors {
//!     eprintln!("{}", error);
//! }
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::LibwsError;
pub use crate::common::result::LibwsResult as Result;
