//! Blueprint: the location plus the applications and services to manage

use crate::error::{ConfigError, Result};
use cfpaas_core::{ApplicationDescriptor, LocationConfig, MAX_START_TIMEOUT_SECS, ServiceDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Environment variables consulted for location fields left empty in the file
pub const LOCATION_ENV_VARS: [&str; 5] = [
    "CF_API",
    "CF_ORG",
    "CF_SPACE",
    "CF_USERNAME",
    "CF_PASSWORD",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub applications: Vec<ApplicationSpec>,

    #[serde(default)]
    pub services: Vec<ServiceDescriptor>,
}

/// An application and the service instances bound to it after start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSpec {
    #[serde(flatten)]
    pub descriptor: ApplicationDescriptor,

    /// Instance names from `services`
    #[serde(default)]
    pub services: Vec<String>,
}

impl Blueprint {
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Read, fill the location from the environment and validate
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut blueprint: Blueprint =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        blueprint.fill_location(|key| std::env::var(key).ok());
        blueprint.validate()?;

        tracing::debug!(
            "Loaded {} with {} applications and {} services",
            path.display(),
            blueprint.applications.len(),
            blueprint.services.len()
        );
        Ok(blueprint)
    }

    /// Fill empty location fields from `CF_API`, `CF_ORG`, `CF_SPACE`,
    /// `CF_USERNAME` and `CF_PASSWORD`
    pub fn fill_location(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let location = &mut self.location;
        let fields = [
            &mut location.endpoint,
            &mut location.org,
            &mut location.space,
            &mut location.identity,
            &mut location.credential,
        ];
        for (field, key) in fields.into_iter().zip(LOCATION_ENV_VARS) {
            if field.trim().is_empty() {
                if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                    *field = value;
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.location
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("location: {}", e)))?;

        let mut app_names = HashSet::new();
        for app in &self.applications {
            if app.descriptor.name.trim().is_empty() {
                return Err(ConfigError::Invalid("application without a name".into()));
            }
            if app.descriptor.artifact.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "application {} has no artifact",
                    app.descriptor.name
                )));
            }
            let timeout = app.descriptor.start_timeout_secs;
            if timeout == 0 || timeout > MAX_START_TIMEOUT_SECS {
                return Err(ConfigError::Invalid(format!(
                    "application {} start_timeout_secs must be between 1 and {}, got {}",
                    app.descriptor.name, MAX_START_TIMEOUT_SECS, timeout
                )));
            }
            if !app_names.insert(app.descriptor.name.as_str()) {
                return Err(ConfigError::DuplicateName {
                    kind: "application",
                    name: app.descriptor.name.clone(),
                });
            }
        }

        let mut instance_names = HashSet::new();
        for service in &self.services {
            // Generated names change on every load and could not be found again
            let Some(name) = named(service) else {
                return Err(ConfigError::Invalid(format!(
                    "service {} ({}) needs an instance_name",
                    service.offering, service.plan
                )));
            };
            if !instance_names.insert(name) {
                return Err(ConfigError::DuplicateName {
                    kind: "service instance",
                    name: name.to_string(),
                });
            }
        }

        for app in &self.applications {
            for service in &app.services {
                if !instance_names.contains(service.as_str()) {
                    return Err(ConfigError::UnknownService {
                        app: app.descriptor.name.clone(),
                        service: service.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn application(&self, name: &str) -> Option<&ApplicationSpec> {
        self.applications.iter().find(|a| a.descriptor.name == name)
    }

    /// Service by explicit instance name
    pub fn service(&self, instance_name: &str) -> Option<&ServiceDescriptor> {
        self.services
            .iter()
            .find(|s| named(s) == Some(instance_name))
    }
}

fn named(service: &ServiceDescriptor) -> Option<&str> {
    service
        .instance_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
}
