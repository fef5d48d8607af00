//! Resource profile reconciliation
//!
//! Every profile change may restage the application on the platform, so a
//! plan only contains the calls whose desired value differs from the
//! observed one.

use crate::client::PaasClient;
use crate::error::Result;
use crate::model::{EnvMap, ResourceProfile};

/// A single remote update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileUpdate {
    Memory(u32),
    Disk(u32),
    Instances(u32),
    /// Full replacement of the environment
    Env(EnvMap),
}

impl std::fmt::Display for ProfileUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileUpdate::Memory(mb) => write!(f, "memory={}MB", mb),
            ProfileUpdate::Disk(mb) => write!(f, "disk={}MB", mb),
            ProfileUpdate::Instances(n) => write!(f, "instances={}", n),
            ProfileUpdate::Env(env) => write!(f, "env({} vars)", env.len()),
        }
    }
}

/// Ordered set of updates bringing an application to its desired profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub updates: Vec<ProfileUpdate>,
}

impl ReconcilePlan {
    /// Compare desired and observed values
    ///
    /// An empty desired environment never produces an update: the platform
    /// starts applications with an empty environment anyway.
    pub fn new(desired: &ResourceProfile, observed: &ResourceProfile) -> Self {
        let mut updates = Vec::new();

        if desired.memory != observed.memory {
            updates.push(ProfileUpdate::Memory(desired.memory));
        }
        if desired.disk != observed.disk {
            updates.push(ProfileUpdate::Disk(desired.disk));
        }
        if desired.instances != observed.instances {
            updates.push(ProfileUpdate::Instances(desired.instances));
        }
        if !desired.env.is_empty() && desired.env != observed.env {
            updates.push(ProfileUpdate::Env(desired.env.clone()));
        }

        Self { updates }
    }

    pub fn has_changes(&self) -> bool {
        !self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Issue the planned calls in order
    pub async fn apply(&self, client: &dyn PaasClient, name: &str) -> Result<()> {
        for update in &self.updates {
            tracing::info!("Updating {}: {}", name, update);
            match update {
                ProfileUpdate::Memory(mb) => client.set_memory(name, *mb).await?,
                ProfileUpdate::Disk(mb) => client.set_disk_quota(name, *mb).await?,
                ProfileUpdate::Instances(n) => client.set_instances(name, *n).await?,
                ProfileUpdate::Env(env) => client.set_env(name, env).await?,
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for ReconcilePlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.updates.is_empty() {
            return write!(f, "no changes");
        }
        let parts: Vec<String> = self.updates.iter().map(|u| u.to_string()).collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Plan and apply in one step, returning what was applied
pub async fn reconcile(
    client: &dyn PaasClient,
    name: &str,
    desired: &ResourceProfile,
    observed: &ResourceProfile,
) -> Result<ReconcilePlan> {
    let plan = ReconcilePlan::new(desired, observed);
    if plan.has_changes() {
        plan.apply(client, name).await?;
    } else {
        tracing::debug!("Profile of {} already up to date", name);
    }
    Ok(plan)
}
