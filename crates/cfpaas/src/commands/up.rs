use crate::context::Context;
use crate::sink::ConsoleSink;
use anyhow::Context as _;
use cfpaas_core::{ApplicationDriver, Attribute, PaasError, ServiceDriver};
use colored::Colorize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub async fn handle(ctx: &Context, app: Option<&str>) -> anyhow::Result<()> {
    let apps = ctx.applications(app)?;
    println!("{}", format!("Deploying to {} ...", ctx.target()).blue());

    let client = ctx.client().await?;

    // With a single app only its own services are provisioned
    let wanted: Option<BTreeSet<&str>> = app.map(|_| {
        apps.iter()
            .flat_map(|a| a.services.iter().map(String::as_str))
            .collect()
    });

    let mut services: BTreeMap<String, ServiceDriver> = BTreeMap::new();
    for descriptor in &ctx.blueprint.services {
        let name = descriptor.instance_name.as_deref();
        if let Some(wanted) = &wanted {
            if !name.is_some_and(|n| wanted.contains(n)) {
                continue;
            }
        }

        let mut driver = ServiceDriver::new(
            descriptor.clone(),
            Arc::new(ConsoleSink::new(descriptor.offering.as_str())),
        );
        match driver.create(&[client.clone()]).await {
            Ok(()) => println!(
                "{}",
                format!(
                    "✓ Created service {} ({} / {})",
                    driver.instance_name(),
                    descriptor.offering,
                    descriptor.plan
                )
                .green()
            ),
            Err(PaasError::DuplicateService(name)) => {
                println!("{}", format!("ℹ Service {} already exists", name).dimmed())
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("creating service {}", driver.instance_name())
                });
            }
        }
        services.insert(driver.instance_name().to_string(), driver);
    }

    for spec in apps {
        let name = spec.descriptor.name.as_str();
        println!();
        println!("{}", format!("▶ {}", name).bold());
        println!("  artifact: {}", spec.descriptor.artifact.cyan());

        let sink = Arc::new(ConsoleSink::new(name));
        let mut driver = ApplicationDriver::new(spec.descriptor.clone(), sink.clone());
        driver
            .start(&[client.clone()])
            .await
            .with_context(|| format!("starting {}", name))?;

        let mut bound = false;
        for instance in &spec.services {
            let service = services
                .get_mut(instance)
                .ok_or_else(|| anyhow::anyhow!("service {} was not provisioned", instance))?;
            service
                .bind(name)
                .await
                .with_context(|| format!("binding {} to {}", instance, name))?;
            println!("  {} bound {}", "✓".green(), instance.cyan());
            bound = true;
        }

        // New bindings reach the app's environment on restart
        if bound {
            driver.restart().await?;
        }

        let url = sink
            .store()
            .get::<String>(Attribute::RootUrl)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}",
            format!("✓ {} is running at {}", name, url).green().bold()
        );
    }

    Ok(())
}
