use anyhow::Result;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";

/// Installs the global fmt subscriber. Call once, from the binary.
pub fn init_logging(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_line_number(true)
        .with_file(true)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Level named by `LOG_LEVEL` (`trace`, `debug`, ...), INFO when unset or invalid.
pub fn level_from_env() -> Level {
    std::env::var(LOG_LEVEL_VAR)
        .ok()
        .and_then(|v| Level::from_str(v.trim()).ok())
        .unwrap_or(Level::INFO)
}
