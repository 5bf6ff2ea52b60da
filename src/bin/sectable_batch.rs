// src/bin/sectable_batch.rs

use anyhow::{anyhow, Result};
use sectable::{batch, config::Config};
use std::{env, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) args + config ────────────────────────────────────────────
    let mut args = env::args().skip(1);
    let (pattern, out_dir) = match (args.next(), args.next()) {
        (Some(p), Some(o)) => (p, PathBuf::from(o)),
        _ => {
            return Err(anyhow!(
                "usage: sectable_batch <GLOB> <OUT_DIR>  (e.g. 'messages/**/*.txt' parquet/)"
            ))
        }
    };
    let config = Config::from_env()?;
    info!(pattern = %pattern, out = %out_dir.display(), "startup");

    // ─── 3) parse + export ───────────────────────────────────────────
    let manifest = batch::run(&pattern, &out_dir, &config.parse)?;
    for failed in manifest.failed() {
        warn!(
            "{}: {}",
            failed.source.display(),
            failed.error.as_deref().unwrap_or("unknown error")
        );
    }

    // ─── 4) summary table ────────────────────────────────────────────
    println!("\n{: <40} {:>10} {:>10}", "File", "Sections", "Rows");
    println!("{:-<62}", "");
    for file in &manifest.files {
        let name = file.source.display().to_string();
        if file.error.is_some() {
            println!("{: <40} {:>10} {:>10}", name, "error", "-");
        } else {
            println!(
                "{: <40} {:>10} {:>10}",
                name,
                file.sections.len(),
                file.rows()
            );
        }
    }
    println!("{:-<62}", "");
    println!(
        "{: <40} {:>10} {:>10}",
        "total",
        manifest.section_count(),
        manifest.row_count()
    );

    Ok(())
}
