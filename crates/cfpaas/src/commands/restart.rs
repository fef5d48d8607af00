use crate::context::Context;
use cfpaas_core::DriverState;
use colored::Colorize;

pub async fn handle(ctx: &Context, app: &str) -> anyhow::Result<()> {
    let spec = ctx.application(app)?;
    println!("{}", format!("Restarting {} ...", app).yellow());

    let (mut driver, _) = ctx.attach_application(spec).await?;
    if driver.state() == DriverState::NotDeployed {
        anyhow::bail!("{} is not deployed; run `cfpaas up {}` first", app, app);
    }

    driver.restart().await?;
    println!("{}", format!("✓ Restarted {}", app).green().bold());
    Ok(())
}
