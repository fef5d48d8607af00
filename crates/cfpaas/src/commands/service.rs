use crate::context::Context;
use crate::sink::ConsoleSink;
use anyhow::Context as _;
use cfpaas_core::{PaasError, ServiceDriver};
use colored::Colorize;
use std::sync::Arc;

pub async fn create(ctx: &Context, instance: &str) -> anyhow::Result<()> {
    let descriptor = ctx.service(instance)?.clone();
    let client = ctx.client().await?;
    println!(
        "{}",
        format!(
            "Creating {} ({} / {}) in {} ...",
            instance,
            descriptor.offering,
            descriptor.plan,
            ctx.target()
        )
        .blue()
    );

    let mut driver = ServiceDriver::new(descriptor, Arc::new(ConsoleSink::new(instance)));
    match driver.create(&[client]).await {
        Ok(()) => println!("{}", format!("✓ Created {}", instance).green().bold()),
        Err(PaasError::DuplicateService(_)) => {
            anyhow::bail!("service instance {} already exists", instance)
        }
        Err(e) => return Err(e).with_context(|| format!("creating {}", instance)),
    }
    Ok(())
}

pub async fn delete(ctx: &Context, instance: &str) -> anyhow::Result<()> {
    let mut driver = ctx.attach_service(instance).await?;
    if !driver.exists().await? {
        println!("{}", format!("ℹ Service {} does not exist", instance).dimmed());
        return Ok(());
    }
    driver.delete().await?;
    println!("{}", format!("✓ Deleted {}", instance).green().bold());
    Ok(())
}

pub async fn bind(ctx: &Context, instance: &str, app: &str) -> anyhow::Result<()> {
    ctx.application(app)?;
    let mut driver = ctx.attach_service(instance).await?;
    let credentials = driver
        .bind(app)
        .await
        .with_context(|| format!("binding {} to {}", instance, app))?;

    println!("{}", format!("✓ Bound {} to {}", instance, app).green().bold());
    // Values are secrets
    let keys: Vec<&str> = credentials.keys().map(String::as_str).collect();
    println!("  credentials: {}", keys.join(", ").dimmed());
    println!("  run `cfpaas restart {}` to pick up the binding", app);
    Ok(())
}

pub async fn unbind(ctx: &Context, instance: &str, app: &str) -> anyhow::Result<()> {
    ctx.application(app)?;
    let mut driver: ServiceDriver = ctx.attach_service(instance).await?;
    driver
        .unbind(app)
        .await
        .with_context(|| format!("unbinding {} from {}", instance, app))?;
    println!("{}", format!("✓ Unbound {} from {}", instance, app).green().bold());
    Ok(())
}
