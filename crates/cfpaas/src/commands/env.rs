use crate::context::Context;
use cfpaas_core::{DriverState, EnvMap};
use colored::Colorize;

pub async fn handle(ctx: &Context, app: &str, vars: &[String], clear: bool) -> anyhow::Result<()> {
    let additions = parse_pairs(vars)?;
    if additions.is_empty() && !clear {
        anyhow::bail!("no variables given; pass KEY=VALUE pairs or --clear");
    }

    let spec = ctx.application(app)?;
    let (mut driver, _) = ctx.attach_application(spec).await?;
    if driver.state() == DriverState::NotDeployed {
        anyhow::bail!("{} is not deployed; run `cfpaas up {}` first", app, app);
    }

    if clear {
        driver.clear_env().await?;
        println!("{}", format!("✓ Cleared environment of {}", app).green());
    }
    if !additions.is_empty() {
        let keys: Vec<String> = additions.keys().cloned().collect();
        driver.set_env(additions).await?;
        println!(
            "{}",
            format!("✓ Set {} on {}", keys.join(", "), app).green()
        );
    }

    println!(
        "  {} variables in total",
        driver.observed().profile.env.len()
    );
    Ok(())
}

/// Parse `KEY=VALUE` arguments; the value may itself contain `=`
pub fn parse_pairs(vars: &[String]) -> anyhow::Result<EnvMap> {
    vars.iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(anyhow::anyhow!("expected KEY=VALUE, got '{}'", pair)),
        })
        .collect()
}
