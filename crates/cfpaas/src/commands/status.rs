use crate::context::Context;
use cfpaas_core::DriverState;
use colored::Colorize;

pub async fn handle(ctx: &Context, app: Option<&str>) -> anyhow::Result<()> {
    let apps = ctx.applications(app)?;
    println!("{}", format!("Status of {}", ctx.target()).blue());
    println!();

    for spec in apps {
        let (driver, _) = ctx.attach_application(spec).await?;
        let name = spec.descriptor.name.as_str();

        let state = match driver.state() {
            DriverState::Running => "running".green(),
            DriverState::NotDeployed => {
                println!("  {} {}", name.cyan(), "not deployed".dimmed());
                continue;
            }
            other => other.to_string().as_str().yellow(),
        };

        let observed = driver.observed();
        println!(
            "  {} {} {}",
            name.cyan(),
            state,
            observed.url.as_deref().unwrap_or("-")
        );
        println!(
            "      memory {}MB, disk {}MB, instances {}, env {}",
            observed.profile.memory,
            observed.profile.disk,
            observed.profile.instances,
            observed.profile.env.len()
        );
    }

    if app.is_some() {
        return Ok(());
    }

    let named: Vec<&str> = ctx
        .blueprint
        .services
        .iter()
        .filter_map(|s| s.instance_name.as_deref())
        .collect();
    if named.is_empty() {
        return Ok(());
    }

    println!();
    println!("Services:");
    for instance in named {
        let driver = ctx.attach_service(instance).await?;
        let status = if driver.exists().await? {
            "created".green()
        } else {
            "absent".dimmed()
        };
        println!("  {} {}", instance.cyan(), status);
    }

    Ok(())
}
