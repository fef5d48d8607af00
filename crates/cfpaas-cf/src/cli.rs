//! cf CLI wrapper
//!
//! Every session logs in with its own `CF_HOME`, so several locations can be
//! used side by side without sharing the CLI's config and token.

use crate::api;
use crate::error::{CfError, Result};
use cfpaas_core::LocationConfig;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;

/// Authenticated cf CLI session for one org and space
pub struct CfCli {
    home: TempDir,
}

impl CfCli {
    /// Version line of the installed cf CLI
    pub async fn version() -> Result<String> {
        let output = Command::new("cf")
            .arg("version")
            .output()
            .await
            .map_err(spawn_error)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Point the CLI at the endpoint, authenticate and target the org and space
    pub async fn login(location: &LocationConfig) -> Result<Self> {
        let home = tempfile::Builder::new().prefix("cfpaas-").tempdir()?;
        let cli = Self { home };

        let mut api_args = vec!["api", location.endpoint.as_str()];
        if location.skip_ssl_validation {
            api_args.push("--skip-ssl-validation");
        }
        cli.run(&api_args).await?;

        cli.run_with_env(
            &["auth"],
            &[
                ("CF_USERNAME", location.identity.as_str()),
                ("CF_PASSWORD", location.credential.as_str()),
            ],
        )
        .await
        .map_err(|e| match e {
            CfError::CommandFailed(msg) => CfError::AuthenticationFailed(msg),
            other => other,
        })?;

        cli.run(&[
            "target",
            "-o",
            location.org.as_str(),
            "-s",
            location.space.as_str(),
        ])
        .await?;

        tracing::info!(
            "Logged in to {} as {} (org {}, space {})",
            location.endpoint,
            location.identity,
            location.org,
            location.space
        );
        Ok(cli)
    }

    /// Directory holding this session's CLI config
    pub fn home(&self) -> &Path {
        self.home.path()
    }

    /// Run a cf command and return stdout
    pub async fn run(&self, args: &[&str]) -> Result<String> {
        self.run_with_env(args, &[]).await
    }

    async fn run_with_env(&self, args: &[&str], envs: &[(&str, &str)]) -> Result<String> {
        let mut cmd = Command::new("cf");
        cmd.args(args);
        cmd.env("CF_HOME", self.home.path());
        cmd.env("CF_COLOR", "false");
        cmd.envs(envs.iter().copied());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: cf {}", args.join(" "));

        let output = cmd.output().await.map_err(spawn_error)?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CfError::CommandFailed(failure_message(&stdout, &stderr)));
        }

        Ok(stdout)
    }

    /// GET a v3 path through `cf curl`
    pub async fn get(&self, path: &str) -> Result<Value> {
        let body = self.run(&["curl", path]).await?;
        api::parse_response(&body)
    }

    pub async fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.get(path).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value> {
        let body = body.to_string();
        let response = self.run(&["curl", "-X", "PATCH", path, "-d", &body]).await?;
        api::parse_response(&response)
    }
}

fn spawn_error(err: std::io::Error) -> CfError {
    if err.kind() == std::io::ErrorKind::NotFound {
        CfError::CliNotFound
    } else {
        CfError::IoError(err)
    }
}

/// The cf CLI prints FAILED and the reason, usually on stderr
pub(crate) fn failure_message(stdout: &str, stderr: &str) -> String {
    let pick = if stderr.trim().is_empty() { stdout } else { stderr };
    let message = pick
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && *l != "FAILED")
        .collect::<Vec<_>>()
        .join(" ");

    if message.is_empty() {
        "no output".to_string()
    } else {
        message
    }
}
