//! Backing service lifecycle driver

use crate::attribute::{Attribute, AttributeSink, Lifecycle};
use crate::client::PaasClient;
use crate::error::{PaasError, Result};
use crate::model::{Credentials, ServiceDescriptor};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Extra work to run once a service has been bound to an application
#[async_trait]
pub trait BindingHook: Send + Sync {
    async fn after_binding(&self, app: &str, credentials: &Credentials) -> Result<()>;
}

/// Drives one marketplace service instance
pub struct ServiceDriver {
    descriptor: ServiceDescriptor,
    instance_name: String,
    sink: Arc<dyn AttributeSink>,
    client: Option<Arc<dyn PaasClient>>,
    hook: Option<Arc<dyn BindingHook>>,
    created: bool,
    bindings: BTreeMap<String, Credentials>,
}

impl ServiceDriver {
    /// The instance name is resolved once here, generating one when unset
    pub fn new(descriptor: ServiceDescriptor, sink: Arc<dyn AttributeSink>) -> Self {
        let instance_name = descriptor.resolve_instance_name();
        let driver = Self {
            descriptor,
            instance_name,
            sink,
            client: None,
            hook: None,
            created: false,
            bindings: BTreeMap::new(),
        };
        driver.publish(Attribute::ServiceState, Lifecycle::Created.into());
        driver
    }

    /// Attach an existing session, e.g. to manage an instance created earlier
    pub fn with_client(mut self, client: Arc<dyn PaasClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_binding_hook(mut self, hook: Arc<dyn BindingHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    /// Credentials of every application this driver bound
    pub fn bindings(&self) -> &BTreeMap<String, Credentials> {
        &self.bindings
    }

    /// Create the instance in the first location
    ///
    /// The name is checked up front so a collision is reported as
    /// [`PaasError::DuplicateService`] and the existing instance is left alone.
    pub async fn create(&mut self, locations: &[Arc<dyn PaasClient>]) -> Result<()> {
        let client = locations.first().cloned().ok_or_else(|| {
            PaasError::Configuration(format!(
                "no PaaS location supplied to create {}",
                self.instance_name
            ))
        })?;
        self.client = Some(Arc::clone(&client));
        self.publish(Attribute::ServiceState, Lifecycle::Starting.into());

        if let Err(e) = self.provision(client.as_ref()).await {
            tracing::warn!("Creating service {} failed: {}", self.instance_name, e);
            self.clear_running();
            self.publish(Attribute::ServiceState, Lifecycle::OnFire.into());
            return Err(e);
        }

        self.created = true;
        self.publish(Attribute::ServiceInstanceName, json!(self.instance_name));
        self.publish(Attribute::ServiceUp, json!(true));
        self.publish(Attribute::ProcessRunning, json!(true));
        self.publish(Attribute::ServiceState, Lifecycle::Running.into());
        Ok(())
    }

    async fn provision(&self, client: &dyn PaasClient) -> Result<()> {
        if client.service_instance_exists(&self.instance_name).await? {
            return Err(PaasError::DuplicateService(self.instance_name.clone()));
        }

        tracing::info!(
            "Creating service {} ({} / {})",
            self.instance_name,
            self.descriptor.offering,
            self.descriptor.plan
        );
        client
            .create_service_instance(
                &self.descriptor.offering,
                &self.descriptor.plan,
                &self.instance_name,
            )
            .await
    }

    pub async fn exists(&self) -> Result<bool> {
        let client = self.require_client()?;
        client.service_instance_exists(&self.instance_name).await
    }

    /// Bind to an application, run the hook, then publish the credentials
    ///
    /// A failing hook leaves the remote binding in place but nothing is
    /// recorded or published; unbind to remove it.
    pub async fn bind(&mut self, app: &str) -> Result<Credentials> {
        let client = self.require_client()?;
        tracing::info!("Binding {} to {}", self.instance_name, app);
        let credentials = client.bind_service(&self.instance_name, app).await?;

        if let Some(hook) = &self.hook {
            hook.after_binding(app, &credentials).await?;
        }

        self.bindings.insert(app.to_string(), credentials.clone());
        self.publish_credentials();
        Ok(credentials)
    }

    pub async fn unbind(&mut self, app: &str) -> Result<()> {
        let client = self.require_client()?;
        tracing::info!("Unbinding {} from {}", self.instance_name, app);
        client.unbind_service(&self.instance_name, app).await?;

        self.bindings.remove(app);
        self.publish_credentials();
        Ok(())
    }

    /// Delete the instance; an absent instance is not an error
    pub async fn delete(&mut self) -> Result<()> {
        if let Some(client) = self.client.clone() {
            if client.service_instance_exists(&self.instance_name).await? {
                tracing::info!("Deleting service {}", self.instance_name);
                match client.delete_service_instance(&self.instance_name).await {
                    Ok(()) => {}
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e),
                }
            } else {
                tracing::debug!("Service {} already absent", self.instance_name);
            }
        }

        self.created = false;
        self.bindings.clear();
        self.clear_running();
        self.publish(Attribute::ServiceCredentials, Value::Null);
        self.publish(Attribute::ServiceState, Lifecycle::Destroyed.into());
        Ok(())
    }

    fn require_client(&self) -> Result<Arc<dyn PaasClient>> {
        self.client.clone().ok_or_else(|| {
            PaasError::Configuration(format!(
                "service {} has no PaaS location; create it first",
                self.instance_name
            ))
        })
    }

    fn publish_credentials(&self) {
        let value = if self.bindings.is_empty() {
            Value::Null
        } else {
            json!(self.bindings)
        };
        self.publish(Attribute::ServiceCredentials, value);
    }

    fn clear_running(&self) {
        self.publish(Attribute::ServiceUp, Value::Null);
        self.publish(Attribute::ProcessRunning, Value::Null);
    }

    fn publish(&self, attribute: Attribute, value: Value) {
        self.sink.on_state_changed(attribute, value);
    }
}
