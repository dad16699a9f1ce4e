pub mod config;
pub mod database;

pub use config::Config;
pub use database::SqliteDedupStore;

use std::path::PathBuf;

/// Returns `~/.config/slotwatch[-dev]/` based on SLOTWATCH_ENV.
///
/// Set SLOTWATCH_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SLOTWATCH_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("slotwatch-dev")
    } else {
        base_dir.join("slotwatch")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
