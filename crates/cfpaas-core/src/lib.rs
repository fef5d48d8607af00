//! cfpaas core
//!
//! Drivers that deploy and manage Cloud Foundry applications and backing
//! services on behalf of an external orchestration layer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │            orchestration layer / CLI             │
//! └───────┬──────────────────────────▲──────────────┘
//!         │ start/stop/restart/...   │ on_state_changed
//! ┌───────▼──────────────────────────┴──────────────┐
//! │                  cfpaas-core                     │
//! │  ApplicationDriver   ServiceDriver               │
//! │  ReconcilePlan       readiness wait              │
//! │  trait PaasClient    ClientCache                 │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │   cfpaas-cf   │  (cf CLI session)
//! └───────────────┘
//! ```

pub mod archive;
pub mod attribute;
pub mod client;
pub mod driver;
pub mod error;
pub mod location;
pub mod model;
pub mod reconcile;
pub mod service;
pub mod wait;

// Re-exports
pub use archive::archive_name_from_url;
pub use attribute::{Attribute, AttributeSink, AttributeStore, Lifecycle};
pub use client::PaasClient;
pub use driver::{ApplicationDriver, DriverState};
pub use error::{PaasError, PlatformErrorKind, Result};
pub use location::{ClientCache, ClientFactory, LocationConfig, LocationKey};
pub use model::{
    AppStatus, ApplicationDescriptor, Credentials, EnvMap, MAX_START_TIMEOUT_SECS,
    RemoteApplicationState, ResourceProfile, ServiceDescriptor,
};
pub use reconcile::{ProfileUpdate, ReconcilePlan, reconcile};
pub use service::{BindingHook, ServiceDriver};
pub use wait::{ReadinessConfig, wait_until_running};
