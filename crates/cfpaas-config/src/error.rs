use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Blueprint not found. Looked in:\n\
        - current directory: cfpaas.local.yaml, cfpaas.yaml\n\
        - ./.cfpaas/ directory\n\
        - ~/.config/cfpaas/cfpaas.yaml\n\
        Set CFPAAS_CONFIG_PATH to point at a file directly"
    )]
    ConfigFileNotFound,

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid blueprint: {0}")]
    Invalid(String),

    #[error("Application {app} binds unknown service {service}")]
    UnknownService { app: String, service: String },

    #[error("Duplicate {kind} name: {name}")]
    DuplicateName { kind: &'static str, name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
