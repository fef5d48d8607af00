#![allow(dead_code)]

use async_trait::async_trait;
use cfpaas_core::{
    AppStatus, ApplicationDescriptor, Credentials, EnvMap, PaasClient, PaasError, ReadinessConfig,
    ResourceProfile, Result,
};
use serde_json::json;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Remote call recorded by the fake platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Deploy(String),
    Start(String),
    Stop(String),
    Restart(String),
    Delete(String),
    SetMemory(String, u32),
    SetDisk(String, u32),
    SetInstances(String, u32),
    SetEnv(String, EnvMap),
    CreateService(String),
    DeleteService(String),
    Bind(String, String),
    Unbind(String, String),
}

#[derive(Debug, Clone)]
pub struct FakeApp {
    pub profile: ResourceProfile,
    pub status: AppStatus,
    pub url: String,
    polls_until_running: u32,
}

#[derive(Default)]
struct Platform {
    apps: HashMap<String, FakeApp>,
    services: HashMap<String, (String, String)>,
    bindings: BTreeSet<(String, String)>,
    calls: Vec<Call>,
    domains: Vec<String>,
    polls_until_running: u32,
    never_runs: bool,
    deploy_profile: Option<ResourceProfile>,
}

/// In-memory Cloud Foundry space
pub struct FakePaas {
    platform: Mutex<Platform>,
}

pub const DEFAULT_DOMAIN: &str = "apps.example.io";

impl FakePaas {
    pub fn new() -> Self {
        Self {
            platform: Mutex::new(Platform {
                domains: vec![DEFAULT_DOMAIN.to_string(), "example.com".to_string()],
                ..Default::default()
            }),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of status polls answering "starting" after each start
    pub fn with_startup_polls(self, polls: u32) -> Self {
        self.platform.lock().unwrap().polls_until_running = polls;
        self
    }

    /// Applications never reach the running state
    pub fn never_running(self) -> Self {
        self.platform.lock().unwrap().never_runs = true;
        self
    }

    /// Profile the platform assigns on push, ignoring the requested one
    pub fn with_deploy_profile(self, profile: ResourceProfile) -> Self {
        self.platform.lock().unwrap().deploy_profile = Some(profile);
        self
    }

    pub fn add_service(&self, instance: &str, offering: &str, plan: &str) {
        self.platform
            .lock()
            .unwrap()
            .services
            .insert(instance.to_string(), (offering.to_string(), plan.to_string()));
    }

    pub fn service_offering(&self, instance: &str) -> Option<(String, String)> {
        self.platform.lock().unwrap().services.get(instance).cloned()
    }

    pub fn app(&self, name: &str) -> Option<FakeApp> {
        self.platform.lock().unwrap().apps.get(name).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.platform.lock().unwrap().calls.clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| predicate(c)).count()
    }

    pub fn reset_calls(&self) {
        self.platform.lock().unwrap().calls.clear();
    }

    fn record(&self, call: Call) {
        self.platform.lock().unwrap().calls.push(call);
    }

    fn with_app<T>(&self, name: &str, f: impl FnOnce(&mut FakeApp) -> T) -> Result<T> {
        let mut platform = self.platform.lock().unwrap();
        platform
            .apps
            .get_mut(name)
            .map(f)
            .ok_or_else(|| PaasError::not_found(format!("App {} not found", name)))
    }
}

pub fn client(fake: &Arc<FakePaas>) -> Arc<dyn PaasClient> {
    Arc::clone(fake) as Arc<dyn PaasClient>
}

pub fn fast_readiness() -> ReadinessConfig {
    ReadinessConfig {
        timeout: Duration::from_millis(200),
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        multiplier: 2.0,
    }
}

#[async_trait]
impl PaasClient for FakePaas {
    async fn deploy(&self, app: &ApplicationDescriptor) -> Result<String> {
        self.record(Call::Deploy(app.name.clone()));
        if app.artifact.contains("missing") {
            return Err(PaasError::deployment(format!(
                "artifact {} not found",
                app.artifact
            )));
        }

        let mut platform = self.platform.lock().unwrap();
        let domain = match app.requested_domain() {
            Some(domain) if platform.domains.iter().any(|d| d == domain) => domain.to_string(),
            Some(domain) => {
                return Err(PaasError::deployment(format!(
                    "domain {} does not exist",
                    domain
                )));
            }
            None => platform.domains[0].clone(),
        };

        let profile = platform.deploy_profile.clone().unwrap_or(ResourceProfile {
            memory: app.memory,
            disk: app.disk,
            instances: app.instances,
            env: EnvMap::new(),
        });
        let url = format!("https://{}.{}", app.route_host(), domain);
        platform.apps.insert(
            app.name.clone(),
            FakeApp {
                profile,
                status: AppStatus::Stopped,
                url: url.clone(),
                polls_until_running: 0,
            },
        );
        Ok(url)
    }

    async fn start(&self, name: &str) -> Result<()> {
        self.record(Call::Start(name.to_string()));
        let polls = self.platform.lock().unwrap().polls_until_running;
        self.with_app(name, |app| {
            app.status = AppStatus::Starting;
            app.polls_until_running = polls;
        })
    }

    async fn stop(&self, name: &str) -> Result<()> {
        self.record(Call::Stop(name.to_string()));
        self.with_app(name, |app| app.status = AppStatus::Stopped)
    }

    async fn restart(&self, name: &str) -> Result<()> {
        self.record(Call::Restart(name.to_string()));
        self.with_app(name, |app| app.status = AppStatus::Running)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.record(Call::Delete(name.to_string()));
        let mut platform = self.platform.lock().unwrap();
        platform
            .apps
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| PaasError::not_found(format!("App {} not found", name)))
    }

    async fn is_deployed(&self, name: &str) -> Result<bool> {
        Ok(self.platform.lock().unwrap().apps.contains_key(name))
    }

    async fn status(&self, name: &str) -> Result<AppStatus> {
        let never_runs = self.platform.lock().unwrap().never_runs;
        self.with_app(name, |app| {
            if app.status == AppStatus::Starting && !never_runs {
                if app.polls_until_running == 0 {
                    app.status = AppStatus::Running;
                } else {
                    app.polls_until_running -= 1;
                }
            }
            app.status.clone()
        })
    }

    async fn url(&self, name: &str) -> Result<Option<String>> {
        self.with_app(name, |app| Some(app.url.clone()))
    }

    async fn profile(&self, name: &str) -> Result<ResourceProfile> {
        self.with_app(name, |app| app.profile.clone())
    }

    async fn set_memory(&self, name: &str, memory_mb: u32) -> Result<()> {
        self.record(Call::SetMemory(name.to_string(), memory_mb));
        self.with_app(name, |app| app.profile.memory = memory_mb)
    }

    async fn set_disk_quota(&self, name: &str, disk_mb: u32) -> Result<()> {
        self.record(Call::SetDisk(name.to_string(), disk_mb));
        self.with_app(name, |app| app.profile.disk = disk_mb)
    }

    async fn set_instances(&self, name: &str, instances: u32) -> Result<()> {
        self.record(Call::SetInstances(name.to_string(), instances));
        self.with_app(name, |app| app.profile.instances = instances)
    }

    async fn set_env(&self, name: &str, env: &EnvMap) -> Result<()> {
        self.record(Call::SetEnv(name.to_string(), env.clone()));
        self.with_app(name, |app| app.profile.env = env.clone())
    }

    async fn service_instance_exists(&self, instance: &str) -> Result<bool> {
        Ok(self.platform.lock().unwrap().services.contains_key(instance))
    }

    async fn create_service_instance(
        &self,
        offering: &str,
        plan: &str,
        instance: &str,
    ) -> Result<()> {
        self.record(Call::CreateService(instance.to_string()));
        if offering == "no-such-offering" {
            return Err(PaasError::not_found(format!(
                "Service offering {} not found",
                offering
            )));
        }
        self.add_service(instance, offering, plan);
        Ok(())
    }

    async fn delete_service_instance(&self, instance: &str) -> Result<()> {
        self.record(Call::DeleteService(instance.to_string()));
        self.platform
            .lock()
            .unwrap()
            .services
            .remove(instance)
            .map(|_| ())
            .ok_or_else(|| PaasError::not_found(format!("Service instance {} not found", instance)))
    }

    async fn bind_service(&self, instance: &str, app: &str) -> Result<Credentials> {
        self.record(Call::Bind(instance.to_string(), app.to_string()));
        let mut platform = self.platform.lock().unwrap();
        if !platform.services.contains_key(instance) {
            return Err(PaasError::not_found(format!(
                "Service instance {} not found",
                instance
            )));
        }
        platform
            .bindings
            .insert((instance.to_string(), app.to_string()));

        let credentials = json!({
            "uri": "mysql://host.net/ad?user=b0e8f",
            "hostname": "host.net",
            "port": "3306",
            "name": instance,
        });
        Ok(credentials.as_object().cloned().unwrap_or_default())
    }

    async fn unbind_service(&self, instance: &str, app: &str) -> Result<()> {
        self.record(Call::Unbind(instance.to_string(), app.to_string()));
        let removed = self
            .platform
            .lock()
            .unwrap()
            .bindings
            .remove(&(instance.to_string(), app.to_string()));
        if removed {
            Ok(())
        } else {
            Err(PaasError::not_found(format!(
                "Binding of {} to {} not found",
                instance, app
            )))
        }
    }
}
