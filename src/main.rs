use anyhow::Result;
use sectable::{cli::Args, cli::USAGE, config::Config, output, parse_with};
use std::io::{self, Write};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    // ─── 2) args + config ────────────────────────────────────────────
    let args = Args::parse(std::env::args().skip(1))?;
    if args.help {
        println!("{}", USAGE);
        return Ok(());
    }
    let mut config = Config::from_env()?;
    args.apply(&mut config);
    debug!(?config, "effective config");

    // ─── 3) read + parse ─────────────────────────────────────────────
    let raw = args.input.read()?;
    let mut parsed = parse_with(&raw, &config.parse);
    info!(
        bytes = raw.len(),
        sections = parsed.sections.len(),
        preamble = parsed.preamble.len(),
        "parsed message"
    );

    // ─── 4) filter + render ──────────────────────────────────────────
    if let Some(pattern) = &args.section {
        parsed.sections = output::select_sections(parsed.sections, pattern);
    }
    let rendered = output::render(&parsed, &config.output)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
