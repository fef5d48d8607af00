use cfpaas_config::Blueprint;
use colored::Colorize;
use std::path::Path;

pub fn handle(blueprint: &Blueprint, path: &Path) -> anyhow::Result<()> {
    println!("{}", "Validating blueprint...".blue());
    println!("file: {}", path.display().to_string().cyan());
    println!("{}", "✓ Blueprint is valid".green().bold());
    println!();

    let location = &blueprint.location;
    println!("Location:");
    println!("  endpoint: {}", location.endpoint.cyan());
    println!("  target:   {} / {}", location.org, location.space);
    println!("  user:     {}", location.identity);

    println!("Applications: {}", blueprint.applications.len());
    for app in &blueprint.applications {
        let d = &app.descriptor;
        let domain = d.requested_domain().unwrap_or("(default domain)");
        println!(
            "  - {} {}MB/{}MB x{} on {}.{}",
            d.name.cyan(),
            d.memory,
            d.disk,
            d.instances,
            d.route_host(),
            domain
        );
        if !app.services.is_empty() {
            println!("      binds: {}", app.services.join(", "));
        }
    }

    println!("Services: {}", blueprint.services.len());
    for service in &blueprint.services {
        let name = service
            .instance_name
            .as_deref()
            .unwrap_or("-");
        println!(
            "  - {} ({} / {})",
            name.cyan(),
            service.offering,
            service.plan
        );
    }
    Ok(())
}
