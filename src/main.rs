use anyhow::Result;
use clap::Parser;
use sheetcache::{run, sheet::HttpSheetSource, Config};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Fetch spreadsheet tabs and write them as the front-end's JSON cache.
#[derive(Parser, Debug)]
struct Args {
    /// YAML config file; built-in defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the cache file(s) are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Spreadsheet to export from
    #[arg(long)]
    spreadsheet_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .init();

    // ─── 2) load config ──────────────────────────────────────────────
    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(id) = args.spreadsheet_id {
        config.spreadsheet_id = id;
    }
    config.validate()?;
    info!(
        sheets = config.sheets.len(),
        output_dir = %config.output_dir.display(),
        "fetching fresh spreadsheet data"
    );

    // ─── 3) fetch every sheet, then persist ──────────────────────────
    let source = HttpSheetSource::from_config(&config)?;
    let report = run::run(&source, &config).await?;

    for e in &report.skipped {
        warn!(sheet = e.sheet(), kind = e.kind(), "not cached: {}", e);
    }
    for path in &report.written {
        info!("cache file: {}", path.display());
    }
    info!(
        "total sheets cached: {}/{}",
        report.document.data.len(),
        config.sheets.len()
    );
    info!("timestamp: {}", report.document.timestamp);
    Ok(())
}
