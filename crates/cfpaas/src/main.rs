mod commands;
mod context;
mod sink;

use anyhow::Context as _;
use cfpaas_config::Blueprint;
use clap::{Parser, Subcommand};
use context::Context;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cfpaas")]
#[command(about = "Deploy and manage Cloud Foundry applications and services", long_about = None)]
struct Cli {
    /// Blueprint file (default: cfpaas.local.yaml, cfpaas.yaml, .cfpaas/, ~/.config/cfpaas/)
    #[arg(short = 'f', long = "file", env = "CFPAAS_CONFIG_PATH", global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create services, deploy and start applications
    Up {
        /// Application name (all applications when omitted)
        app: Option<String>,
    },
    /// Stop applications
    Down {
        /// Application name (all applications when omitted)
        app: Option<String>,
        /// Delete applications and their named services instead of stopping
        #[arg(short, long)]
        delete: bool,
    },
    /// Show application and service state
    Status {
        /// Application name (all applications when omitted)
        app: Option<String>,
    },
    /// Restart an application
    Restart {
        /// Application name
        app: String,
    },
    /// Change memory, disk quota or instance count
    Scale {
        /// Application name
        app: String,
        /// Memory in MB
        #[arg(short = 'm', long)]
        memory: Option<u32>,
        /// Disk quota in MB
        #[arg(short = 'k', long)]
        disk: Option<u32>,
        /// Number of instances
        #[arg(short = 'i', long)]
        instances: Option<u32>,
    },
    /// Set or clear environment variables
    Env {
        /// Application name
        app: String,
        /// KEY=VALUE pairs merged into the environment
        vars: Vec<String>,
        /// Remove every variable first
        #[arg(long)]
        clear: bool,
    },
    /// Manage service instances
    #[command(subcommand)]
    Service(ServiceCommands),
    /// Validate the blueprint without contacting the platform
    Validate,
    /// Show version
    Version,
}

#[derive(Subcommand)]
enum ServiceCommands {
    /// Create a service instance from the blueprint
    Create {
        /// Instance name
        name: String,
    },
    /// Delete a service instance
    Delete {
        /// Instance name
        name: String,
    },
    /// Bind a service instance to an application
    Bind {
        /// Instance name
        name: String,
        /// Application name
        app: String,
    },
    /// Unbind a service instance from an application
    Unbind {
        /// Instance name
        name: String,
        /// Application name
        app: String,
    },
}

fn load(file: Option<PathBuf>) -> anyhow::Result<(Blueprint, PathBuf)> {
    match file {
        Some(path) => {
            let blueprint = Blueprint::load(&path)
                .with_context(|| format!("loading {}", path.display()))?;
            Ok((blueprint, path))
        }
        None => Ok(cfpaas_config::load_blueprint()?),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; RUST_LOG=cfpaas=debug shows attribute changes
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if matches!(cli.command, Commands::Version) {
        println!("cfpaas {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let (blueprint, path) = load(cli.file)?;

    if matches!(cli.command, Commands::Validate) {
        return commands::validate::handle(&blueprint, &path);
    }

    let ctx = Context::new(blueprint, path);
    match cli.command {
        Commands::Up { app } => commands::up::handle(&ctx, app.as_deref()).await?,
        Commands::Down { app, delete } => {
            commands::down::handle(&ctx, app.as_deref(), delete).await?
        }
        Commands::Status { app } => commands::status::handle(&ctx, app.as_deref()).await?,
        Commands::Restart { app } => commands::restart::handle(&ctx, &app).await?,
        Commands::Scale {
            app,
            memory,
            disk,
            instances,
        } => commands::scale::handle(&ctx, &app, memory, disk, instances).await?,
        Commands::Env { app, vars, clear } => {
            commands::env::handle(&ctx, &app, &vars, clear).await?
        }
        Commands::Service(service) => match service {
            ServiceCommands::Create { name } => commands::service::create(&ctx, &name).await?,
            ServiceCommands::Delete { name } => commands::service::delete(&ctx, &name).await?,
            ServiceCommands::Bind { name, app } => {
                commands::service::bind(&ctx, &name, &app).await?
            }
            ServiceCommands::Unbind { name, app } => {
                commands::service::unbind(&ctx, &name, &app).await?
            }
        },
        Commands::Validate | Commands::Version => {}
    }

    Ok(())
}
