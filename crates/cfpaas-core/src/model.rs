//! Application and service descriptors, resource profiles and observed state

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Environment variables of an application
pub type EnvMap = BTreeMap<String, String>;

/// Opaque credentials returned by the platform after binding a service
pub type Credentials = serde_json::Map<String, serde_json::Value>;

pub const DEFAULT_MEMORY_MB: u32 = 512;
pub const DEFAULT_DISK_MB: u32 = 1024;
pub const DEFAULT_INSTANCES: u32 = 1;
pub const DEFAULT_START_TIMEOUT_SECS: u64 = 120;
pub const MAX_START_TIMEOUT_SECS: u64 = 24 * 60 * 60;

fn default_memory() -> u32 {
    DEFAULT_MEMORY_MB
}
fn default_disk() -> u32 {
    DEFAULT_DISK_MB
}
fn default_instances() -> u32 {
    DEFAULT_INSTANCES
}
fn default_start_timeout() -> u64 {
    DEFAULT_START_TIMEOUT_SECS
}

/// Desired configuration of one Cloud Foundry application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDescriptor {
    /// Application name, unique per space
    pub name: String,

    /// Artifact location (http(s) URL, file URL or local path)
    pub artifact: String,

    #[serde(default)]
    pub buildpack: Option<String>,

    /// Route domain; the org's default domain when absent
    #[serde(default)]
    pub domain: Option<String>,

    /// Route host name; the application name when absent
    #[serde(default)]
    pub host: Option<String>,

    /// Memory in MB
    #[serde(default = "default_memory")]
    pub memory: u32,

    /// Disk quota in MB
    #[serde(default = "default_disk")]
    pub disk: u32,

    #[serde(default = "default_instances")]
    pub instances: u32,

    #[serde(default)]
    pub env: EnvMap,

    /// Budget for the post-deploy readiness poll
    #[serde(default = "default_start_timeout")]
    pub start_timeout_secs: u64,
}

impl ApplicationDescriptor {
    pub fn new(name: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artifact: artifact.into(),
            buildpack: None,
            domain: None,
            host: None,
            memory: DEFAULT_MEMORY_MB,
            disk: DEFAULT_DISK_MB,
            instances: DEFAULT_INSTANCES,
            env: EnvMap::new(),
            start_timeout_secs: DEFAULT_START_TIMEOUT_SECS,
        }
    }

    pub fn with_buildpack(mut self, buildpack: impl Into<String>) -> Self {
        self.buildpack = Some(buildpack.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_start_timeout(mut self, timeout: Duration) -> Self {
        self.start_timeout_secs = timeout.as_secs();
        self
    }

    /// Host part of the route
    pub fn route_host(&self) -> &str {
        match self.host.as_deref() {
            Some(host) if !host.trim().is_empty() => host,
            _ => &self.name,
        }
    }

    /// Explicitly requested domain, ignoring blank values
    pub fn requested_domain(&self) -> Option<&str> {
        self.domain.as_deref().filter(|d| !d.trim().is_empty())
    }

    pub fn start_timeout(&self) -> Duration {
        Duration::from_secs(self.start_timeout_secs)
    }

    /// The resource profile this descriptor asks for
    pub fn desired_profile(&self) -> ResourceProfile {
        ResourceProfile {
            memory: self.memory,
            disk: self.disk,
            instances: self.instances,
            env: self.env.clone(),
        }
    }
}

/// Desired configuration of one backing service instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Marketplace offering (e.g. "cleardb")
    pub offering: String,

    pub plan: String,

    /// Instance name; generated when unset
    #[serde(default)]
    pub instance_name: Option<String>,
}

impl ServiceDescriptor {
    pub fn new(offering: impl Into<String>, plan: impl Into<String>) -> Self {
        Self {
            offering: offering.into(),
            plan: plan.into(),
            instance_name: None,
        }
    }

    pub fn with_instance_name(mut self, name: impl Into<String>) -> Self {
        self.instance_name = Some(name.into());
        self
    }

    /// The configured instance name, or `<offering>-<random>` when unset or blank
    pub fn resolve_instance_name(&self) -> String {
        match self.instance_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => {
                let id = uuid::Uuid::new_v4().simple().to_string();
                format!("{}-{}", self.offering, &id[..8])
            }
        }
    }
}

/// Memory, disk, instance count and environment of an application
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceProfile {
    pub memory: u32,
    pub disk: u32,
    pub instances: u32,
    pub env: EnvMap,
}

/// Remote status of an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    Running,
    Starting,
    Stopped,
    Other(String),
}

impl std::fmt::Display for AppStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppStatus::Running => write!(f, "running"),
            AppStatus::Starting => write!(f, "starting"),
            AppStatus::Stopped => write!(f, "stopped"),
            AppStatus::Other(s) => write!(f, "{}", s.to_lowercase()),
        }
    }
}

/// Last observed state of a remote application
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteApplicationState {
    pub url: Option<String>,
    pub running: bool,
    pub profile: ResourceProfile,
}
