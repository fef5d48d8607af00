//! Cloud Controller v3 payloads read through `cf curl`

use crate::error::{CfError, Result};
use cfpaas_core::{AppStatus, Credentials, EnvMap};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Paginated list envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Resources<T> {
    #[serde(default = "Vec::new")]
    pub resources: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEntry {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub detail: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorEnvelope {
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Domain {
    pub guid: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct App {
    pub guid: String,
    pub name: String,
    /// STARTED or STOPPED
    pub state: String,
}

/// The `web` process of an application
#[derive(Debug, Clone, Deserialize)]
pub struct Process {
    pub instances: u32,
    pub memory_in_mb: u32,
    pub disk_in_mb: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstanceStats {
    /// RUNNING, STARTING, CRASHED, DOWN
    pub state: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Binding {
    pub guid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BindingDetails {
    #[serde(default)]
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvironmentVariables {
    #[serde(default)]
    pub var: BTreeMap<String, Value>,
}

impl EnvironmentVariables {
    /// Variables as strings; non-string JSON values keep their JSON text
    pub fn into_env(self) -> EnvMap {
        self.var
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| match v {
                Value::String(s) => (k, s),
                other => (k, other.to_string()),
            })
            .collect()
    }
}

/// Parse a `cf curl` response body, surfacing Cloud Controller errors
pub fn parse_response(body: &str) -> Result<Value> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(Value::Null);
    }

    let value: Value = serde_json::from_str(body)?;
    if value.get("errors").is_some() {
        let envelope: ErrorEnvelope = serde_json::from_value(value)?;
        return Err(match envelope.errors.into_iter().next() {
            Some(e) => CfError::Api {
                code: e.code,
                title: e.title,
                detail: e.detail,
            },
            None => CfError::UnexpectedResponse("empty error list".to_string()),
        });
    }
    Ok(value)
}

/// Application status from its desired state and the web instance stats
pub fn app_status(state: &str, instances: &[InstanceStats]) -> AppStatus {
    match state {
        "STARTED" if instances.iter().any(|i| i.state == "RUNNING") => AppStatus::Running,
        "STARTED" => AppStatus::Starting,
        "STOPPED" => AppStatus::Stopped,
        other => AppStatus::Other(other.to_string()),
    }
}

/// PATCH body replacing `current` with `desired`; removed keys are set to null
pub fn env_patch(desired: &EnvMap, current: &EnvMap) -> Value {
    let mut var = Map::new();
    for key in current.keys().filter(|k| !desired.contains_key(*k)) {
        var.insert(key.clone(), Value::Null);
    }
    for (key, value) in desired {
        var.insert(key.clone(), Value::String(value.clone()));
    }
    json!({ "var": var })
}

/// Routes come back without a scheme
pub fn route_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_envelope() {
        let body = r#"{"errors":[{"detail":"App not found","title":"CF-ResourceNotFound","code":10010}]}"#;
        let err = parse_response(body).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("App not found"));
    }

    #[test]
    fn test_parse_empty_body() {
        assert_eq!(parse_response("  \n").unwrap(), Value::Null);
    }

    #[test]
    fn test_parse_resources() {
        let body = r#"{
            "pagination": {"total_results": 1},
            "resources": [{"guid": "d-1", "name": "example.com", "internal": false}]
        }"#;
        let domains: Resources<Domain> =
            serde_json::from_value(parse_response(body).unwrap()).unwrap();
        assert_eq!(domains.resources.len(), 1);
        assert_eq!(domains.resources[0].name, "example.com");
    }

    #[test]
    fn test_app_status() {
        let running = vec![
            InstanceStats {
                state: "STARTING".to_string(),
            },
            InstanceStats {
                state: "RUNNING".to_string(),
            },
        ];
        let starting = vec![InstanceStats {
            state: "STARTING".to_string(),
        }];

        assert_eq!(app_status("STARTED", &running), AppStatus::Running);
        assert_eq!(app_status("STARTED", &starting), AppStatus::Starting);
        assert_eq!(app_status("STARTED", &[]), AppStatus::Starting);
        assert_eq!(app_status("STOPPED", &running), AppStatus::Stopped);
        assert_eq!(
            app_status("CRASHED", &[]),
            AppStatus::Other("CRASHED".to_string())
        );
    }

    #[test]
    fn test_env_patch_nulls_removed_keys() {
        let current: EnvMap = [("OLD", "1"), ("KEEP", "a")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let desired: EnvMap = [("KEEP", "b"), ("NEW", "2")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let patch = env_patch(&desired, &current);
        assert_eq!(
            patch,
            json!({"var": {"OLD": null, "KEEP": "b", "NEW": "2"}})
        );

        assert_eq!(
            env_patch(&EnvMap::new(), &current),
            json!({"var": {"OLD": null, "KEEP": null}})
        );
    }

    #[test]
    fn test_environment_variables_into_env() {
        let vars: EnvironmentVariables = serde_json::from_value(json!({
            "var": {"JAVA_OPTS": "-Xmx256m", "PORT_OFFSET": 3}
        }))
        .unwrap();
        let env = vars.into_env();
        assert_eq!(env.get("JAVA_OPTS").map(String::as_str), Some("-Xmx256m"));
        assert_eq!(env.get("PORT_OFFSET").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_route_url() {
        assert_eq!(route_url("my-app.example.com"), "https://my-app.example.com");
        assert_eq!(route_url("http://legacy.example.com"), "http://legacy.example.com");
    }
}
