use std::io::{self, BufRead};

use anyhow::Context;
use tracing::{info, warn};

use gelf_transport::{SourceLocation, Writer, WriterConfig};

/// Ship text to a GELF endpoint.
///
/// With arguments, sends them joined by spaces as a single record. Without,
/// sends every non-empty line of stdin as its own record.
fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging on stderr, stdout stays free for whatever pipes into us
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gelf_send=info,gelf_transport=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let config = WriterConfig::from_env().context("invalid GELF configuration")?;
    info!(
        address = %config.address,
        facility = %config.facility,
        compression = %config.compression.kind,
        "GELF sender starting"
    );
    let writer = Writer::from_config(config)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        writer.write_text(args.join(" ").as_bytes(), SourceLocation::new("<args>", 0))?;
        return Ok(());
    }

    let mut sent = 0u64;
    let mut dropped = 0u64;
    for (idx, line) in io::stdin().lock().lines().enumerate() {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let lineno = idx as i64 + 1;
        match writer.write_text(line.as_bytes(), SourceLocation::new("<stdin>", lineno)) {
            Ok(_) => sent += 1,
            // The socket will not recover, stop here.
            Err(e) if e.is_transmission() => {
                return Err(e).context(format!("send failed at stdin line {lineno}"));
            }
            Err(e) => {
                dropped += 1;
                warn!(line = lineno, "Dropping record: {}", e);
            }
        }
    }

    info!(sent, dropped, "GELF sender finished");
    Ok(())
}
