use crate::context::Context;
use cfpaas_core::DriverState;
use colored::Colorize;

pub async fn handle(
    ctx: &Context,
    app: &str,
    memory: Option<u32>,
    disk: Option<u32>,
    instances: Option<u32>,
) -> anyhow::Result<()> {
    if memory.is_none() && disk.is_none() && instances.is_none() {
        anyhow::bail!("nothing to scale; pass --memory, --disk or --instances");
    }
    if instances == Some(0) {
        anyhow::bail!("instances must be at least 1");
    }

    let spec = ctx.application(app)?;
    let (mut driver, _) = ctx.attach_application(spec).await?;
    if driver.state() == DriverState::NotDeployed {
        anyhow::bail!("{} is not deployed; run `cfpaas up {}` first", app, app);
    }

    println!("{}", format!("Scaling {} ...", app).yellow());
    if let Some(memory) = memory {
        driver.set_memory(memory).await?;
    }
    if let Some(disk) = disk {
        driver.set_disk_quota(disk).await?;
    }
    if let Some(instances) = instances {
        driver.set_instances(instances).await?;
    }

    let profile = &driver.observed().profile;
    println!(
        "{}",
        format!(
            "✓ {}: memory {}MB, disk {}MB, instances {}",
            app, profile.memory, profile.disk, profile.instances
        )
        .green()
        .bold()
    );
    Ok(())
}
