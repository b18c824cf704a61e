use anyhow::{anyhow, Result};
use std::path::PathBuf;

/// Application data directory (~/.local/share/ratebook on all Unix platforms)
pub fn data_dir() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        // On Windows, use the standard local app data location
        let base = dirs::data_local_dir()
            .ok_or_else(|| anyhow!("Could not determine local data directory"))?;
        Ok(base.join("ratebook"))
    }

    #[cfg(not(windows))]
    {
        // Same path on macOS and Linux; ~/Library/Application Support is harder to find
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
        Ok(home.join(".local").join("share").join("ratebook"))
    }
}

/// Where corpus snapshots go when `--cache-dir` is not given.
pub fn default_cache_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join("cache"))
}
