//! Initialize the configuration directory: create ~/.sheetrelay, a default config, and the public directory.
//!
//! `crates/lib/config/public/` is bundled into the binary and extracted to `<config dir>/public/`.

use anyhow::{Context, Result};
use include_dir::{include_dir, Dir};
use std::path::{Path, PathBuf};

static BUNDLED_PUBLIC: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/config/public");

/// Create the config directory and default files if they do not exist.
/// - Creates the config directory (parent of config file path).
/// - Writes `config.json` with `{}` if missing.
/// - Extracts the bundled pairing page into `public` if that directory does not exist.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        std::fs::write(config_path, b"{}")
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    }

    let public_dir = config_dir.join("public");
    if !public_dir.exists() {
        std::fs::create_dir_all(&public_dir)
            .with_context(|| format!("creating public directory {}", public_dir.display()))?;
        if let Err(e) = BUNDLED_PUBLIC.extract(&public_dir) {
            anyhow::bail!(
                "extracting bundled public files to {}: {}",
                public_dir.display(),
                e
            );
        }
        log::info!("extracted pairing page to {}", public_dir.display());
    } else {
        log::debug!("public directory already exists at {}, skipping", public_dir.display());
    }

    Ok(config_dir.to_path_buf())
}
