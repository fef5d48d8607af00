//! Application lifecycle driver

use crate::attribute::{Attribute, AttributeSink, Lifecycle};
use crate::client::PaasClient;
use crate::error::{PaasError, Result};
use crate::model::{AppStatus, ApplicationDescriptor, EnvMap, RemoteApplicationState, ResourceProfile};
use crate::reconcile::{ReconcilePlan, reconcile};
use crate::wait::{ReadinessConfig, wait_until_running};
use serde_json::{Value, json};
use std::sync::Arc;

/// Lifecycle state of a driven application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    NotDeployed,
    Deploying,
    Running,
    Restarting,
    Stopping,
    Stopped,
    /// A transition failed after the application may have been created remotely
    Failed,
    Destroyed,
}

impl std::fmt::Display for DriverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverState::NotDeployed => write!(f, "not-deployed"),
            DriverState::Deploying => write!(f, "deploying"),
            DriverState::Running => write!(f, "running"),
            DriverState::Restarting => write!(f, "restarting"),
            DriverState::Stopping => write!(f, "stopping"),
            DriverState::Stopped => write!(f, "stopped"),
            DriverState::Failed => write!(f, "failed"),
            DriverState::Destroyed => write!(f, "destroyed"),
        }
    }
}

/// Drives one Cloud Foundry application through its lifecycle
///
/// The driver owns the descriptor for the lifetime of the deployment and
/// mirrors the remote state into [`RemoteApplicationState`]. Attribute changes
/// are reported to the sink; running attributes are only published once every
/// remote call of a transition has succeeded.
pub struct ApplicationDriver {
    descriptor: ApplicationDescriptor,
    sink: Arc<dyn AttributeSink>,
    client: Option<Arc<dyn PaasClient>>,
    readiness: ReadinessConfig,
    state: DriverState,
    observed: RemoteApplicationState,
}

impl ApplicationDriver {
    pub fn new(descriptor: ApplicationDescriptor, sink: Arc<dyn AttributeSink>) -> Self {
        let readiness = ReadinessConfig::default().with_timeout(descriptor.start_timeout());
        let driver = Self {
            descriptor,
            sink,
            client: None,
            readiness,
            state: DriverState::NotDeployed,
            observed: RemoteApplicationState::default(),
        };
        driver.publish(Attribute::ServiceState, Lifecycle::Created.into());
        driver
    }

    /// Attach an existing session, e.g. to manage an application deployed earlier
    pub fn with_client(mut self, client: Arc<dyn PaasClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_readiness(mut self, readiness: ReadinessConfig) -> Self {
        self.readiness = readiness;
        self
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &ApplicationDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn observed(&self) -> &RemoteApplicationState {
        &self.observed
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running && self.observed.running
    }

    /// Deploy, reconcile the profile, start and wait until running
    ///
    /// The first location is used; none is a configuration error.
    pub async fn start(&mut self, locations: &[Arc<dyn PaasClient>]) -> Result<()> {
        let client = locations.first().cloned().ok_or_else(|| {
            PaasError::Configuration(format!(
                "no PaaS location supplied to start {}",
                self.descriptor.name
            ))
        })?;
        self.client = Some(Arc::clone(&client));

        self.state = DriverState::Deploying;
        self.publish(Attribute::ServiceState, Lifecycle::Starting.into());
        tracing::info!("Deploying {} from {}", self.name(), self.descriptor.artifact);

        let url = match client.deploy(&self.descriptor).await {
            Ok(url) => url,
            Err(e) => {
                self.fail(DriverState::NotDeployed, &e);
                return Err(e);
            }
        };

        if let Err(e) = self.bring_up(client.as_ref(), url).await {
            self.fail(DriverState::Failed, &e);
            return Err(e);
        }
        Ok(())
    }

    async fn bring_up(&mut self, client: &dyn PaasClient, url: String) -> Result<()> {
        let name = self.descriptor.name.clone();

        let observed = client.profile(&name).await?;
        let plan = reconcile(client, &name, &self.descriptor.desired_profile(), &observed).await?;
        tracing::debug!("Reconciled {}: {}", name, plan);

        client.start(&name).await?;
        wait_until_running(client, &name, &self.readiness).await?;

        let profile = client.profile(&name).await?;
        self.observed = RemoteApplicationState {
            url: Some(url),
            running: true,
            profile,
        };
        self.state = DriverState::Running;
        self.publish_running();
        tracing::info!("{} is running at {}", name, self.observed.url.as_deref().unwrap_or("-"));
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        let client = self.require_client()?;
        self.state = DriverState::Stopping;
        self.publish(Attribute::ServiceState, Lifecycle::Stopping.into());

        if let Err(e) = client.stop(self.name()).await {
            self.fail(DriverState::Failed, &e);
            return Err(e);
        }

        self.state = DriverState::Stopped;
        self.observed.running = false;
        self.clear_running();
        self.publish(Attribute::ServiceState, Lifecycle::Stopped.into());
        tracing::info!("Stopped {}", self.name());
        Ok(())
    }

    /// Restart without re-checking the profile
    pub async fn restart(&mut self) -> Result<()> {
        let client = self.require_client()?;
        self.state = DriverState::Restarting;
        self.publish(Attribute::ServiceState, Lifecycle::Starting.into());

        if let Err(e) = client.restart(self.name()).await {
            self.fail(DriverState::Failed, &e);
            return Err(e);
        }

        self.state = DriverState::Running;
        self.observed.running = true;
        self.publish(Attribute::ServiceUp, json!(true));
        self.publish(Attribute::ProcessRunning, json!(true));
        self.publish(Attribute::ServiceState, Lifecycle::Running.into());
        tracing::info!("Restarted {}", self.name());
        Ok(())
    }

    /// Best-effort stop, then delete; an absent application is not an error
    pub async fn delete(&mut self) -> Result<()> {
        let Some(client) = self.client.clone() else {
            tracing::debug!("{} was never deployed, nothing to delete", self.name());
            self.mark_destroyed();
            return Ok(());
        };

        if let Err(e) = client.stop(self.name()).await {
            if !e.is_not_found() {
                tracing::warn!("Ignoring failure to stop {} before delete: {}", self.name(), e);
            }
        }

        match client.delete(self.name()).await {
            Ok(()) => tracing::info!("Deleted {}", self.name()),
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} already absent", self.name());
            }
            Err(e) => {
                self.fail(DriverState::Failed, &e);
                return Err(e);
            }
        }

        self.mark_destroyed();
        Ok(())
    }

    pub async fn set_memory(&mut self, memory: u32) -> Result<()> {
        self.descriptor.memory = memory;
        let mut desired = self.live_profile().await?;
        desired.memory = memory;
        self.apply_profile(desired).await
    }

    pub async fn set_disk_quota(&mut self, disk: u32) -> Result<()> {
        self.descriptor.disk = disk;
        let mut desired = self.live_profile().await?;
        desired.disk = disk;
        self.apply_profile(desired).await
    }

    pub async fn set_instances(&mut self, instances: u32) -> Result<()> {
        self.descriptor.instances = instances;
        let mut desired = self.live_profile().await?;
        desired.instances = instances;
        self.apply_profile(desired).await
    }

    /// Merge variables into the current remote environment and push the full map
    ///
    /// Empty input is a no-op; use [`clear_env`](Self::clear_env) to remove
    /// every variable.
    pub async fn set_env(&mut self, additions: EnvMap) -> Result<()> {
        if additions.is_empty() {
            tracing::debug!("No environment variables to set on {}", self.name());
            return Ok(());
        }

        let mut desired = self.live_profile().await?;
        desired.env.extend(additions);
        self.descriptor.env = desired.env.clone();
        self.apply_profile(desired).await
    }

    /// Remove every environment variable of the application
    pub async fn clear_env(&mut self) -> Result<()> {
        let current = self.live_profile().await?;
        self.descriptor.env.clear();
        if current.env.is_empty() {
            return Ok(());
        }

        let client = self.require_client()?;
        tracing::info!("Clearing environment of {}", self.name());
        client.set_env(self.name(), &EnvMap::new()).await?;
        let profile = client.profile(self.name()).await?;
        self.observe_profile(profile);
        Ok(())
    }

    /// Re-read status, route and profile from the platform
    pub async fn refresh(&mut self) -> Result<()> {
        let client = self.require_client()?;
        let name = self.descriptor.name.clone();

        if !client.is_deployed(&name).await? {
            self.state = DriverState::NotDeployed;
            self.observed = RemoteApplicationState::default();
            self.clear_running();
            return Ok(());
        }

        let status = client.status(&name).await?;
        let url = client.url(&name).await?;
        let profile = client.profile(&name).await?;

        self.observed = RemoteApplicationState {
            url,
            running: status == AppStatus::Running,
            profile,
        };

        if self.observed.running {
            self.state = DriverState::Running;
            self.publish_running();
        } else {
            self.state = DriverState::Stopped;
            self.clear_running();
            self.observe_profile(self.observed.profile.clone());
            self.publish(Attribute::ServiceState, Lifecycle::Stopped.into());
        }
        Ok(())
    }

    /// Profile as the platform reports it now; setters plan against this
    async fn live_profile(&mut self) -> Result<ResourceProfile> {
        let client = self.require_client()?;
        let profile = client.profile(self.name()).await?;
        self.observed.profile = profile.clone();
        Ok(profile)
    }

    async fn apply_profile(&mut self, desired: ResourceProfile) -> Result<()> {
        let client = self.require_client()?;
        let plan = ReconcilePlan::new(&desired, &self.observed.profile);
        if !plan.has_changes() {
            tracing::debug!("{} already has the requested profile", self.name());
            return Ok(());
        }

        plan.apply(client.as_ref(), self.name()).await?;
        let profile = client.profile(self.name()).await?;
        self.observe_profile(profile);
        Ok(())
    }

    fn require_client(&self) -> Result<Arc<dyn PaasClient>> {
        self.client.clone().ok_or_else(|| {
            PaasError::Configuration(format!(
                "{} has no PaaS location; start it first",
                self.descriptor.name
            ))
        })
    }

    fn observe_profile(&mut self, profile: ResourceProfile) {
        self.publish(Attribute::AllocatedMemory, json!(profile.memory));
        self.publish(Attribute::AllocatedDisk, json!(profile.disk));
        self.publish(Attribute::Instances, json!(profile.instances));
        self.publish(Attribute::Env, json!(profile.env));
        self.observed.profile = profile;
    }

    fn publish_running(&mut self) {
        let url = self.observed.url.clone().map(Value::String).unwrap_or(Value::Null);
        self.publish(Attribute::RootUrl, url.clone());
        self.publish(Attribute::MainUri, url);
        self.observe_profile(self.observed.profile.clone());
        self.publish(Attribute::ServiceUp, json!(true));
        self.publish(Attribute::ProcessRunning, json!(true));
        self.publish(Attribute::ServiceState, Lifecycle::Running.into());
    }

    fn clear_running(&self) {
        self.publish(Attribute::ServiceUp, Value::Null);
        self.publish(Attribute::ProcessRunning, Value::Null);
    }

    fn fail(&mut self, state: DriverState, error: &PaasError) {
        tracing::warn!("{} failed while {}: {}", self.descriptor.name, self.state, error);
        self.state = state;
        self.observed.running = false;
        self.clear_running();
        self.publish(Attribute::ServiceState, Lifecycle::OnFire.into());
    }

    fn mark_destroyed(&mut self) {
        self.state = DriverState::Destroyed;
        self.observed = RemoteApplicationState::default();
        for attribute in [
            Attribute::RootUrl,
            Attribute::MainUri,
            Attribute::ServiceUp,
            Attribute::ProcessRunning,
        ] {
            self.publish(attribute, Value::Null);
        }
        self.publish(Attribute::ServiceState, Lifecycle::Destroyed.into());
    }

    fn publish(&self, attribute: Attribute, value: Value) {
        self.sink.on_state_changed(attribute, value);
    }
}
