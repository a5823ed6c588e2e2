use std::{path::PathBuf, time::Duration};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use reference_data::ReferenceData;
use store_client::{HttpRecordStore, RecordStore};
use url::Url;
use wizard::stats::{compute_stats, format_stats};

#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a reference-data directory and summarise it.
    CheckData {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Fetch all records and print stats for one technician.
    Stats {
        #[arg(long)]
        url: Url,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "Asia/Jakarta")]
        tz: String,
        #[arg(long, default_value_t = 20)]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("warn").init();
    let cli = Cli::parse();

    match cli.command {
        Command::CheckData { data_dir } => {
            let data = ReferenceData::load(&data_dir)
                .with_context(|| format!("failed to load '{}'", data_dir.display()))?;
            for segment in data.segments() {
                println!("segment {segment}: {} orders", data.orders(segment).len());
            }
            println!("technicians: {}", data.technicians().len());
            println!("units: {}", data.units().join(", "));
        }
        Command::Stats {
            url,
            name,
            tz,
            timeout_secs,
        } => {
            let tz: Tz = tz
                .parse()
                .map_err(|_| anyhow!("unknown time zone '{tz}'"))?;
            let store = HttpRecordStore::new(url, Duration::from_secs(timeout_secs))?;
            let records = store
                .get_all_records()
                .await
                .context("failed to fetch records")?;
            let now = Utc::now().with_timezone(&tz);
            let stats = compute_stats(&records, &name, &now);
            println!("{}", format_stats(name.trim(), &stats, &now));
        }
    }

    Ok(())
}
