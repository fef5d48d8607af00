//! Observable attributes reported back to the orchestration layer

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// Attribute published by a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    RootUrl,
    MainUri,
    ServiceUp,
    ProcessRunning,
    AllocatedMemory,
    AllocatedDisk,
    Instances,
    Env,
    ServiceState,
    ServiceInstanceName,
    ServiceCredentials,
}

impl Attribute {
    pub fn key(&self) -> &'static str {
        match self {
            Attribute::RootUrl => "webapp.url",
            Attribute::MainUri => "main.uri",
            Attribute::ServiceUp => "service.isUp",
            Attribute::ProcessRunning => "service.process.isRunning",
            Attribute::AllocatedMemory => "cloudfoundry.profile.memory.allocated",
            Attribute::AllocatedDisk => "cloudfoundry.profile.disk.allocated",
            Attribute::Instances => "cloudfoundry.profile.instances",
            Attribute::Env => "cloudfoundry.application.env",
            Attribute::ServiceState => "service.state",
            Attribute::ServiceInstanceName => "cloudfoundry.service.instance.name",
            Attribute::ServiceCredentials => "cloudfoundry.service.credentials",
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Aggregate lifecycle state, published as [`Attribute::ServiceState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Lifecycle {
    Created,
    Starting,
    Running,
    Stopping,
    Stopped,
    Destroyed,
    OnFire,
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lifecycle::Created => write!(f, "created"),
            Lifecycle::Starting => write!(f, "starting"),
            Lifecycle::Running => write!(f, "running"),
            Lifecycle::Stopping => write!(f, "stopping"),
            Lifecycle::Stopped => write!(f, "stopped"),
            Lifecycle::Destroyed => write!(f, "destroyed"),
            Lifecycle::OnFire => write!(f, "on-fire"),
        }
    }
}

impl From<Lifecycle> for Value {
    fn from(state: Lifecycle) -> Self {
        Value::String(state.to_string())
    }
}

/// Receiver of attribute changes; `Value::Null` clears an attribute
pub trait AttributeSink: Send + Sync {
    fn on_state_changed(&self, attribute: Attribute, value: Value);
}

/// In-memory attribute table
#[derive(Debug, Default)]
pub struct AttributeStore {
    values: RwLock<HashMap<Attribute, Value>>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_raw(&self, attribute: Attribute) -> Option<Value> {
        self.values
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&attribute)
            .cloned()
    }

    pub fn get<T: serde::de::DeserializeOwned>(&self, attribute: Attribute) -> Option<T> {
        self.get_raw(attribute)
            .and_then(|v| serde_json::from_value(v).ok())
    }

    pub fn lifecycle(&self) -> Option<Lifecycle> {
        self.get(Attribute::ServiceState)
    }

    /// Attributes keyed by their published names
    pub fn snapshot(&self) -> HashMap<&'static str, Value> {
        self.values
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(k, v)| (k.key(), v.clone()))
            .collect()
    }
}

impl AttributeSink for AttributeStore {
    fn on_state_changed(&self, attribute: Attribute, value: Value) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        if value.is_null() {
            values.remove(&attribute);
        } else {
            values.insert(attribute, value);
        }
    }
}
