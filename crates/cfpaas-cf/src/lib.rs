//! Cloud Foundry client for cfpaas
//!
//! This crate implements the `PaasClient` trait on top of the `cf` CLI,
//! using `cf curl` for the Cloud Controller v3 reads the CLI does not
//! expose directly.
//!
//! # Requirements
//!
//! - `cf` CLI v8 must be installed and on `PATH`
//! - Each session logs in with its own `CF_HOME`; the user's own CLI login
//!   is never touched
//!
//! # Example
//!
//! ```ignore
//! use cfpaas_cf::CfClientFactory;
//! use cfpaas_core::{ClientCache, LocationConfig};
//!
//! let cache = ClientCache::new(CfClientFactory);
//! let client = cache.client(&location, true).await?;
//! let url = client.deploy(&descriptor).await?;
//! ```

pub mod api;
pub mod artifact;
pub mod cli;
pub mod client;
pub mod error;

pub use artifact::{Artifact, ArtifactFetcher, ArtifactSource};
pub use cli::CfCli;
pub use client::{CfClient, CfClientFactory};
pub use error::{CfError, Result};
