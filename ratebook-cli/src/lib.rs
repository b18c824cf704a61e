// All core functionality is in ratebook-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod data_dir;

// Re-export core types for convenience
pub use ratebook_core::*;

pub use data_dir::{data_dir, default_cache_dir};

/// Parse a `Column=Value` lookup criterion. Only the first `=` splits, so
/// values may contain `=` themselves.
pub fn parse_criterion(raw: &str) -> Result<(String, String), String> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{raw}'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in '{raw}'"));
    }
    Ok((column.to_string(), value.trim().to_string()))
}
