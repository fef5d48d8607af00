//! `PaasClient` implementation over a cf CLI session

use crate::api::{
    self, App, Binding, BindingDetails, Domain, EnvironmentVariables, Process, Resources, Route,
};
use crate::artifact::ArtifactFetcher;
use crate::cli::CfCli;
use crate::error::{CfError, Result, deployment_error};
use async_trait::async_trait;
use cfpaas_core::{
    AppStatus, ApplicationDescriptor, ClientFactory, Credentials, EnvMap, LocationConfig,
    PaasClient, PaasError, ResourceProfile,
};
use std::sync::Arc;

/// One logged-in org/space
pub struct CfClient {
    cli: CfCli,
    org: String,
    artifacts: ArtifactFetcher,
}

impl CfClient {
    pub async fn connect(location: &LocationConfig) -> Result<Self> {
        let cli = CfCli::login(location).await?;
        Ok(Self {
            cli,
            org: location.org.clone(),
            artifacts: ArtifactFetcher::new()?,
        })
    }

    async fn app_guid(&self, name: &str) -> Result<String> {
        let guid = self.cli.run(&["app", name, "--guid"]).await?;
        Ok(guid.trim().to_string())
    }

    async fn app(&self, name: &str) -> Result<App> {
        let guid = self.app_guid(name).await?;
        self.cli.get_as(&format!("/v3/apps/{}", guid)).await
    }

    async fn resolve_domain(&self, requested: Option<&str>) -> Result<String> {
        match requested {
            Some(domain) => {
                let found: Resources<Domain> = self
                    .cli
                    .get_as(&format!("/v3/domains?names={}", domain))
                    .await?;
                found
                    .resources
                    .into_iter()
                    .next()
                    .map(|d| d.name)
                    .ok_or_else(|| CfError::DomainNotFound(domain.to_string()))
            }
            None => {
                let org = self.cli.run(&["org", self.org.as_str(), "--guid"]).await?;
                let domain: Domain = self
                    .cli
                    .get_as(&format!("/v3/organizations/{}/domains/default", org.trim()))
                    .await?;
                Ok(domain.name)
            }
        }
    }

    async fn push(&self, app: &ApplicationDescriptor) -> Result<String> {
        let artifact = self.artifacts.fetch(&app.artifact).await?;
        let domain = self.resolve_domain(app.requested_domain()).await?;

        let path = artifact.path().to_string_lossy().to_string();
        let args = push_args(app, &path);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        tracing::info!("Pushing {} ({}MB, {} instances)", app.name, app.memory, app.instances);
        self.cli.run(&args).await?;

        let host = app.route_host();
        self.cli
            .run(&["map-route", app.name.as_str(), domain.as_str(), "--hostname", host])
            .await?;

        Ok(format!("https://{}.{}", host, domain))
    }

    async fn scale(&self, name: &str, scale: Scale) -> Result<()> {
        tracing::info!("Scaling {}: {}", name, scale);
        let args = scale_args(name, scale);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.cli.run(&args).await?;
        Ok(())
    }

    async fn replace_env(&self, name: &str, env: &EnvMap) -> Result<()> {
        let app = self.app(name).await?;
        let path = format!("/v3/apps/{}/environment_variables", app.guid);
        let current: EnvironmentVariables = self.cli.get_as(&path).await?;

        tracing::info!("Setting {} environment variables on {}", env.len(), name);
        self.cli
            .patch(&path, &api::env_patch(env, &current.into_env()))
            .await?;

        if app.state == "STARTED" {
            tracing::info!("Restaging {} to apply the environment", name);
            self.cli.run(&["restage", name]).await?;
        }
        Ok(())
    }

    async fn credentials(&self, instance: &str, app: &str) -> Result<Credentials> {
        let bindings: Resources<Binding> = self
            .cli
            .get_as(&format!(
                "/v3/service_credential_bindings?service_instance_names={}&app_names={}",
                instance, app
            ))
            .await?;
        let binding = bindings.resources.into_iter().next().ok_or_else(|| {
            CfError::UnexpectedResponse(format!("no binding between {} and {}", instance, app))
        })?;

        let details: BindingDetails = self
            .cli
            .get_as(&format!(
                "/v3/service_credential_bindings/{}/details",
                binding.guid
            ))
            .await?;
        Ok(details.credentials)
    }
}

/// One dimension of `cf scale`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scale {
    Memory(u32),
    Disk(u32),
    Instances(u32),
}

impl std::fmt::Display for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scale::Memory(mb) => write!(f, "memory={}MB", mb),
            Scale::Disk(mb) => write!(f, "disk={}MB", mb),
            Scale::Instances(n) => write!(f, "instances={}", n),
        }
    }
}

/// Memory and disk changes restart the app, hence `-f`
pub(crate) fn scale_args(name: &str, scale: Scale) -> Vec<String> {
    let mut args = vec!["scale".to_string(), name.to_string()];
    match scale {
        Scale::Memory(mb) => args.extend(["-m".to_string(), format!("{}M", mb), "-f".to_string()]),
        Scale::Disk(mb) => args.extend(["-k".to_string(), format!("{}M", mb), "-f".to_string()]),
        Scale::Instances(n) => args.extend(["-i".to_string(), n.to_string()]),
    }
    args
}

/// Arguments for creating the app without starting it or mapping a route
pub(crate) fn push_args(app: &ApplicationDescriptor, path: &str) -> Vec<String> {
    let mut args = vec![
        "push".to_string(),
        app.name.clone(),
        "-p".to_string(),
        path.to_string(),
        "-m".to_string(),
        format!("{}M", app.memory),
        "-k".to_string(),
        format!("{}M", app.disk),
        "-i".to_string(),
        app.instances.to_string(),
    ];
    if let Some(buildpack) = app.buildpack.as_deref().filter(|b| !b.trim().is_empty()) {
        args.push("-b".to_string());
        args.push(buildpack.to_string());
    }
    args.push("--no-start".to_string());
    args.push("--no-route".to_string());
    args
}

#[async_trait]
impl PaasClient for CfClient {
    async fn deploy(&self, app: &ApplicationDescriptor) -> cfpaas_core::Result<String> {
        self.push(app)
            .await
            .map_err(|e| deployment_error(&app.name, e))
    }

    async fn start(&self, name: &str) -> cfpaas_core::Result<()> {
        tracing::info!("Starting {}", name);
        self.cli.run(&["start", name]).await?;
        Ok(())
    }

    async fn stop(&self, name: &str) -> cfpaas_core::Result<()> {
        tracing::info!("Stopping {}", name);
        self.cli.run(&["stop", name]).await?;
        Ok(())
    }

    async fn restart(&self, name: &str) -> cfpaas_core::Result<()> {
        tracing::info!("Restarting {}", name);
        self.cli.run(&["restart", name]).await?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> cfpaas_core::Result<()> {
        // `cf delete` succeeds for absent apps
        self.app_guid(name).await?;
        tracing::info!("Deleting {}", name);
        self.cli.run(&["delete", name, "-f", "-r"]).await?;
        Ok(())
    }

    async fn is_deployed(&self, name: &str) -> cfpaas_core::Result<bool> {
        match self.app_guid(name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn status(&self, name: &str) -> cfpaas_core::Result<AppStatus> {
        let app = self.app(name).await?;
        let stats: Resources<api::InstanceStats> = if app.state == "STARTED" {
            self.cli
                .get_as(&format!("/v3/apps/{}/processes/web/stats", app.guid))
                .await?
        } else {
            Resources {
                resources: Vec::new(),
            }
        };
        Ok(api::app_status(&app.state, &stats.resources))
    }

    async fn url(&self, name: &str) -> cfpaas_core::Result<Option<String>> {
        let guid = self.app_guid(name).await?;
        let routes: Resources<Route> = self
            .cli
            .get_as(&format!("/v3/apps/{}/routes", guid))
            .await?;
        Ok(routes
            .resources
            .into_iter()
            .next()
            .map(|r| api::route_url(&r.url)))
    }

    async fn profile(&self, name: &str) -> cfpaas_core::Result<ResourceProfile> {
        let guid = self.app_guid(name).await?;
        let process: Process = self
            .cli
            .get_as(&format!("/v3/apps/{}/processes/web", guid))
            .await?;
        let env: EnvironmentVariables = self
            .cli
            .get_as(&format!("/v3/apps/{}/environment_variables", guid))
            .await?;

        Ok(ResourceProfile {
            memory: process.memory_in_mb,
            disk: process.disk_in_mb,
            instances: process.instances,
            env: env.into_env(),
        })
    }

    async fn set_memory(&self, name: &str, memory_mb: u32) -> cfpaas_core::Result<()> {
        Ok(self.scale(name, Scale::Memory(memory_mb)).await?)
    }

    async fn set_disk_quota(&self, name: &str, disk_mb: u32) -> cfpaas_core::Result<()> {
        Ok(self.scale(name, Scale::Disk(disk_mb)).await?)
    }

    async fn set_instances(&self, name: &str, instances: u32) -> cfpaas_core::Result<()> {
        Ok(self.scale(name, Scale::Instances(instances)).await?)
    }

    async fn set_env(&self, name: &str, env: &EnvMap) -> cfpaas_core::Result<()> {
        Ok(self.replace_env(name, env).await?)
    }

    async fn service_instance_exists(&self, instance: &str) -> cfpaas_core::Result<bool> {
        match self.cli.run(&["service", instance, "--guid"]).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_service_instance(
        &self,
        offering: &str,
        plan: &str,
        instance: &str,
    ) -> cfpaas_core::Result<()> {
        tracing::info!("Creating service {} ({} / {})", instance, offering, plan);
        self.cli
            .run(&["create-service", offering, plan, instance, "--wait"])
            .await?;
        Ok(())
    }

    async fn delete_service_instance(&self, instance: &str) -> cfpaas_core::Result<()> {
        if !self.service_instance_exists(instance).await? {
            return Err(PaasError::not_found(format!(
                "Service instance {} not found",
                instance
            )));
        }
        tracing::info!("Deleting service {}", instance);
        self.cli
            .run(&["delete-service", instance, "-f", "--wait"])
            .await?;
        Ok(())
    }

    async fn bind_service(&self, instance: &str, app: &str) -> cfpaas_core::Result<Credentials> {
        tracing::info!("Binding {} to {}", instance, app);
        self.cli
            .run(&["bind-service", app, instance, "--wait"])
            .await?;
        Ok(self.credentials(instance, app).await?)
    }

    async fn unbind_service(&self, instance: &str, app: &str) -> cfpaas_core::Result<()> {
        tracing::info!("Unbinding {} from {}", instance, app);
        self.cli
            .run(&["unbind-service", app, instance, "--wait"])
            .await?;
        Ok(())
    }
}

/// Opens [`CfClient`] sessions for a [`ClientCache`](cfpaas_core::ClientCache)
#[derive(Debug, Clone, Copy, Default)]
pub struct CfClientFactory;

#[async_trait]
impl ClientFactory for CfClientFactory {
    async fn connect(&self, location: &LocationConfig) -> cfpaas_core::Result<Arc<dyn PaasClient>> {
        let client = CfClient::connect(location).await?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_args() {
        let app = ApplicationDescriptor::new("my-app", "https://host/build/app-1.2.3.war?sig=abc")
            .with_buildpack("java_buildpack");
        let args = push_args(&app, "/tmp/cfpaas-artifact-x/app-1.2.3.war");
        assert_eq!(
            args,
            vec![
                "push",
                "my-app",
                "-p",
                "/tmp/cfpaas-artifact-x/app-1.2.3.war",
                "-m",
                "512M",
                "-k",
                "1024M",
                "-i",
                "1",
                "-b",
                "java_buildpack",
                "--no-start",
                "--no-route",
            ]
        );
    }

    #[test]
    fn test_push_args_without_buildpack() {
        let mut app = ApplicationDescriptor::new("worker", "/srv/worker.jar").with_buildpack(" ");
        app.instances = 3;
        let args = push_args(&app, "/srv/worker.jar");
        assert!(!args.contains(&"-b".to_string()));
        assert!(args.windows(2).any(|w| w[0] == "-i" && w[1] == "3"));
    }

    #[test]
    fn test_scale_args() {
        assert_eq!(
            scale_args("shop", Scale::Memory(1024)),
            vec!["scale", "shop", "-m", "1024M", "-f"]
        );
        assert_eq!(
            scale_args("shop", Scale::Disk(2048)),
            vec!["scale", "shop", "-k", "2048M", "-f"]
        );
        assert_eq!(
            scale_args("shop", Scale::Instances(4)),
            vec!["scale", "shop", "-i", "4"]
        );
    }
}
