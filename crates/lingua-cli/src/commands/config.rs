//! `lingua config` and config loading for the other commands.

use std::path::Path;

use anyhow::{Context, Result, bail};
use lingua_core::LinguaConfig;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "lingua.toml";

/// Load `path`, or `./lingua.toml` if it exists, or built-in defaults.
pub fn load(path: Option<&Path>) -> Result<LinguaConfig> {
    match path {
        Some(path) => LinguaConfig::from_file(path).with_context(|| format!("loading {}", path.display())),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                debug!(path = %default.display(), "using config from working directory");
                Ok(LinguaConfig::from_file(default)?)
            } else {
                Ok(LinguaConfig::default())
            }
        }
    }
}

/// Print the scaffold, or write it to `path` (never overwriting).
pub fn init(path: Option<&Path>) -> Result<()> {
    let rendered = LinguaConfig::scaffold().to_toml_string()?;
    match path {
        None => print!("{rendered}"),
        Some(path) => {
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            std::fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_loadable_scaffold() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lingua.toml");
        init(Some(&path)).unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config, LinguaConfig::scaffold());
        assert_eq!(config.backend_settings().unwrap().ports, vec![5002, 5003, 5004]);
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lingua.toml");
        std::fs::write(&path, "# mine\n").unwrap();
        assert!(init(Some(&path)).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
