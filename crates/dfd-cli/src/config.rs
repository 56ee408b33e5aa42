//! Configuration file loading for the CLI.
//!
//! An optional TOML file provides defaults for the output format and the
//! background color; explicit command-line arguments win. Search order:
//! explicit path, local `dfd/config.toml`, platform config directory.

use std::fs;
use std::io;
use std::path::Path;

use directories::ProjectDirs;
use log::{debug, info};
use serde::Deserialize;

use dfd_core::error::DfdError;

/// Defaults loadable from a configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Default output format when none is given on the command line.
    #[serde(default)]
    pub format: Option<String>,

    /// Default background color when none is given on the command line.
    #[serde(default)]
    pub background_color: Option<String>,
}

/// Find and load the configuration from its usual locations, falling back
/// to defaults when no file exists.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, DfdError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("dfd/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("org", "dfd", "dfd") {
        let system_config = proj_dirs.config_dir().join("config.toml");
        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(&system_config);
        }
        debug!(path = system_config.display().to_string(); "System configuration file not found");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

fn load_config_file(path: &Path) -> Result<AppConfig, DfdError> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|err| {
        DfdError::Io(io::Error::other(format!(
            "Failed to parse TOML configuration: {err}"
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_load_explicit_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "format = \"png\"\nbackground_color = \"none\"").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.format.as_deref(), Some("png"));
        assert_eq!(config.background_color.as_deref(), Some("none"));
    }

    #[test]
    fn test_partial_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "format = \"pdf\"").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.format.as_deref(), Some("pdf"));
        assert!(config.background_color.is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "format = 17").unwrap();

        assert!(load_config(Some(file.path())).is_err());
    }

    #[test]
    fn test_missing_explicit_config_rejected() {
        assert!(load_config(Some(Path::new("/nonexistent/dfd.toml"))).is_err());
    }
}
