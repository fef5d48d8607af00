//! PaaS client trait definition

use crate::error::Result;
use crate::model::{AppStatus, ApplicationDescriptor, Credentials, EnvMap, ResourceProfile};
use async_trait::async_trait;

/// One authenticated session against a single org/space
///
/// Implementations wrap a vendor client and collapse its failures into
/// [`PaasError`](crate::PaasError). Operations on a missing application fail
/// with a not-found platform error.
#[async_trait]
pub trait PaasClient: Send + Sync {
    /// Push the artifact, create the application (not started) with the
    /// requested profile, map its route and return the reachable URL
    async fn deploy(&self, app: &ApplicationDescriptor) -> Result<String>;

    async fn start(&self, name: &str) -> Result<()>;

    async fn stop(&self, name: &str) -> Result<()>;

    async fn restart(&self, name: &str) -> Result<()>;

    async fn delete(&self, name: &str) -> Result<()>;

    async fn is_deployed(&self, name: &str) -> Result<bool>;

    async fn status(&self, name: &str) -> Result<AppStatus>;

    /// First route mapped to the application, as an https URL
    async fn url(&self, name: &str) -> Result<Option<String>>;

    /// Observed memory, disk, instances and environment
    async fn profile(&self, name: &str) -> Result<ResourceProfile>;

    async fn set_memory(&self, name: &str, memory_mb: u32) -> Result<()>;

    async fn set_disk_quota(&self, name: &str, disk_mb: u32) -> Result<()>;

    async fn set_instances(&self, name: &str, instances: u32) -> Result<()>;

    /// Replace the whole environment of the application
    async fn set_env(&self, name: &str, env: &EnvMap) -> Result<()>;

    async fn service_instance_exists(&self, instance: &str) -> Result<bool>;

    async fn create_service_instance(&self, offering: &str, plan: &str, instance: &str)
    -> Result<()>;

    async fn delete_service_instance(&self, instance: &str) -> Result<()>;

    /// Bind a service instance to an application and return the binding credentials
    async fn bind_service(&self, instance: &str, app: &str) -> Result<Credentials>;

    async fn unbind_service(&self, instance: &str, app: &str) -> Result<()>;
}
