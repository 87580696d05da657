mod cli;

use anyhow::{Context, Result};
use chrono::Utc;
use chrono_tz::Tz;
use clap::Parser;
use miqat::prelude::*;
use miqat::{DailyResolver, SENSOR_DESCRIPTIONS};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "miqat=info".into()),
        ))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = cli::Args::parse();
    let config = args.load_config()?;
    let tz = config.tz()?;
    let deps = Dependencies::production(&config).context("Failed to build HTTP client")?;

    if args.once {
        let resolver = DailyResolver::new(&config, deps.standard, deps.http)?;
        let resolution = resolver.resolve(Utc::now()).await?;
        print_snapshot(&resolution.snapshot, tz)?;
        return Ok(());
    }

    let companion = PrayerCompanion::new(config, deps)?;
    match companion.start().await {
        Ok(snapshot) => {
            if let Some(next) = snapshot.next_prayer {
                tracing::info!(prayer = %next.prayer, at = %next.at.with_timezone(&tz), "Next prayer");
            }
        }
        Err(e) => tracing::warn!(error = %e, "First refresh failed, will retry"),
    }

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    companion.teardown();
    Ok(())
}

fn print_snapshot(snapshot: &PrayerSnapshot, tz: Tz) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&snapshot.to_values())?);
    println!();
    for description in SENSOR_DESCRIPTIONS {
        let value = match snapshot.get(description.key) {
            Some(SensorValue::Timestamp(at)) => at.with_timezone(&tz).format("%Y-%m-%d %H:%M %Z").to_string(),
            Some(SensorValue::Number(n)) => n.to_string(),
            Some(SensorValue::Text(s)) => s,
            None => "-".to_string(),
        };
        println!("{:<22} {}", description.name, value);
    }
    Ok(())
}
