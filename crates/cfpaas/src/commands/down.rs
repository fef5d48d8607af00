use crate::context::Context;
use crate::sink::ConsoleSink;
use anyhow::Context as _;
use cfpaas_core::ApplicationDriver;
use colored::Colorize;
use std::collections::BTreeSet;
use std::sync::Arc;

pub async fn handle(ctx: &Context, app: Option<&str>, delete: bool) -> anyhow::Result<()> {
    let apps = ctx.applications(app)?;
    let verb = if delete { "Deleting" } else { "Stopping" };
    println!("{}", format!("{} in {} ...", verb, ctx.target()).yellow());

    let client = ctx.client().await?;

    for spec in &apps {
        let name = spec.descriptor.name.as_str();
        if !client.is_deployed(name).await? {
            println!("{}", format!("ℹ {} is not deployed", name).dimmed());
            continue;
        }

        let sink = Arc::new(ConsoleSink::new(name));
        let mut driver =
            ApplicationDriver::new(spec.descriptor.clone(), sink).with_client(client.clone());
        if delete {
            driver
                .delete()
                .await
                .with_context(|| format!("deleting {}", name))?;
            println!("{}", format!("✓ Deleted {}", name).green());
        } else {
            driver
                .stop()
                .await
                .with_context(|| format!("stopping {}", name))?;
            println!("{}", format!("✓ Stopped {}", name).green());
        }
    }

    if !delete {
        return Ok(());
    }

    // Only services with an explicit name can be found again
    let instances: BTreeSet<&str> = match app {
        Some(_) => apps
            .iter()
            .flat_map(|a| a.services.iter().map(String::as_str))
            .collect(),
        None => ctx
            .blueprint
            .services
            .iter()
            .filter_map(|s| s.instance_name.as_deref())
            .collect(),
    };

    for instance in instances {
        let mut driver = ctx.attach_service(instance).await?;
        if !driver.exists().await? {
            println!("{}", format!("ℹ Service {} does not exist", instance).dimmed());
            continue;
        }
        driver
            .delete()
            .await
            .with_context(|| format!("deleting service {}", instance))?;
        println!("{}", format!("✓ Deleted service {}", instance).green());
    }

    Ok(())
}
