use crate::sink::ConsoleSink;
use anyhow::Context as _;
use cfpaas_cf::CfClientFactory;
use cfpaas_config::{ApplicationSpec, Blueprint};
use cfpaas_core::{ApplicationDriver, ClientCache, PaasClient, ServiceDescriptor, ServiceDriver};
use std::path::PathBuf;
use std::sync::Arc;

/// Loaded blueprint plus the session cache shared by a command
pub struct Context {
    pub blueprint: Blueprint,
    pub path: PathBuf,
    cache: ClientCache<CfClientFactory>,
}

impl Context {
    pub fn new(blueprint: Blueprint, path: PathBuf) -> Self {
        Self {
            blueprint,
            path,
            cache: ClientCache::new(CfClientFactory),
        }
    }

    pub async fn client(&self) -> anyhow::Result<Arc<dyn PaasClient>> {
        let location = &self.blueprint.location;
        self.cache
            .client(location, true)
            .await
            .with_context(|| format!("connecting to {} as {}", location.endpoint, location.identity))
    }

    pub fn target(&self) -> String {
        format!("{} / {}", self.blueprint.location.org, self.blueprint.location.space)
    }

    /// One application, or all of them when no name is given
    pub fn applications(&self, name: Option<&str>) -> anyhow::Result<Vec<&ApplicationSpec>> {
        match name {
            Some(name) => Ok(vec![self.application(name)?]),
            None => Ok(self.blueprint.applications.iter().collect()),
        }
    }

    pub fn application(&self, name: &str) -> anyhow::Result<&ApplicationSpec> {
        self.blueprint.application(name).ok_or_else(|| {
            anyhow::anyhow!("application '{}' is not in {}", name, self.path.display())
        })
    }

    pub fn service(&self, instance: &str) -> anyhow::Result<&ServiceDescriptor> {
        self.blueprint.service(instance).ok_or_else(|| {
            anyhow::anyhow!(
                "service instance '{}' is not in {}",
                instance,
                self.path.display()
            )
        })
    }

    /// Driver for an application deployed by an earlier run
    pub async fn attach_application(
        &self,
        spec: &ApplicationSpec,
    ) -> anyhow::Result<(ApplicationDriver, Arc<ConsoleSink>)> {
        let client = self.client().await?;
        let sink = Arc::new(ConsoleSink::new(&spec.descriptor.name));
        let mut driver =
            ApplicationDriver::new(spec.descriptor.clone(), sink.clone()).with_client(client);
        driver
            .refresh()
            .await
            .with_context(|| format!("reading state of {}", spec.descriptor.name))?;
        Ok((driver, sink))
    }

    /// Driver for a named service instance
    pub async fn attach_service(&self, instance: &str) -> anyhow::Result<ServiceDriver> {
        let descriptor = self.service(instance)?.clone();
        let client = self.client().await?;
        let sink = Arc::new(ConsoleSink::new(instance));
        Ok(ServiceDriver::new(descriptor, sink).with_client(client))
    }
}
