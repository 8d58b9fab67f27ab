//! Configuration for librasys.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (LIBRASYS_HOME, LIBRASYS_CATALOGUE, LIBRASYS_ROLE)
//! 2. Config file (.librasys/config.yaml)
//! 3. Defaults (~/.librasys)
//!
//! Config file discovery:
//! - Searches current directory and parents for .librasys/config.yaml
//! - `paths.catalogue` is relative to the project root (parent of .librasys/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::Role;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Default catalogue file name inside the home directory
pub const CATALOGUE_FILE: &str = "catalogue.txt";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .librasys/)
    pub home: Option<String>,
    /// Catalogue file (relative to the project root)
    pub catalogue: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// Role used when none is given on the command line
    pub role: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to librasys home
    pub home: PathBuf,
    /// Path to the catalogue file
    pub catalogue: PathBuf,
    /// Default session role
    pub role: Role,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".librasys").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Parse a role value, naming where it came from on failure
fn parse_role(value: &str, source: &str) -> Result<Role> {
    value
        .parse::<Role>()
        .with_context(|| format!("Invalid role in {}", source))
}

/// Merge a parsed config file (if any) with environment overrides
fn resolve(
    default_home: PathBuf,
    config_file: Option<(PathBuf, ConfigFile)>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let (home, catalogue, file_role, config_path) = match config_file {
        Some((config_path, config)) => {
            // .librasys/ and the project root above it
            let librasys_dir = config_path.parent().unwrap_or(Path::new("."));
            let base_dir = librasys_dir.parent().unwrap_or(Path::new("."));

            let home = match env("LIBRASYS_HOME") {
                Some(env_home) => PathBuf::from(env_home),
                None => config
                    .paths
                    .home
                    .as_deref()
                    .map(|h| resolve_path(librasys_dir, h))
                    .unwrap_or_else(|| default_home.clone()),
            };

            let catalogue = config
                .paths
                .catalogue
                .as_deref()
                .map(|c| resolve_path(base_dir, c));

            (home, catalogue, config.session.role, Some(config_path))
        }
        None => {
            let home = env("LIBRASYS_HOME")
                .map(PathBuf::from)
                .unwrap_or(default_home);
            (home, None, None, None)
        }
    };

    let catalogue = env("LIBRASYS_CATALOGUE")
        .map(PathBuf::from)
        .or(catalogue)
        .unwrap_or_else(|| home.join(CATALOGUE_FILE));

    let role = match (env("LIBRASYS_ROLE"), file_role) {
        (Some(role), _) => parse_role(&role, "LIBRASYS_ROLE")?,
        (None, Some(role)) => parse_role(&role, "config file")?,
        (None, None) => Role::default(),
    };

    Ok(ResolvedConfig {
        home,
        catalogue,
        role,
        config_file: config_path,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".librasys");

    let config_file = match find_config_file() {
        Some(path) => {
            let config = load_config_file(&path)?;
            Some((path, config))
        }
        None => None,
    };

    resolve(default_home, config_file, |key| std::env::var(key).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Get the catalogue file path
pub fn catalogue_path() -> Result<PathBuf> {
    Ok(config()?.catalogue.clone())
}

/// Get the default session role
pub fn default_role() -> Result<Role> {
    Ok(config()?.role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn write_config(temp: &TempDir, yaml: &str) -> PathBuf {
        let librasys_dir = temp.path().join(".librasys");
        std::fs::create_dir_all(&librasys_dir).unwrap();
        let config_path = librasys_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "{}", yaml).unwrap();
        config_path
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = resolve(PathBuf::from("/home/u/.librasys"), None, env_from(&[])).unwrap();

        assert_eq!(config.home, PathBuf::from("/home/u/.librasys"));
        assert_eq!(
            config.catalogue,
            PathBuf::from("/home/u/.librasys/catalogue.txt")
        );
        assert_eq!(config.role, Role::Client);
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(
            &temp,
            r#"
version: "1.0"
paths:
  home: ./state
  catalogue: data/media.txt
session:
  role: admin
"#,
        );

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.paths.home, Some("./state".to_string()));
        assert_eq!(config.paths.catalogue, Some("data/media.txt".to_string()));
        assert_eq!(config.session.role, Some("admin".to_string()));

        let resolved = resolve(
            PathBuf::from("/unused"),
            Some((config_path.clone(), config)),
            env_from(&[]),
        )
        .unwrap();
        assert_eq!(resolved.home, temp.path().join(".librasys").join("./state"));
        assert_eq!(resolved.catalogue, temp.path().join("data/media.txt"));
        assert_eq!(resolved.role, Role::Admin);
        assert_eq!(resolved.config_file, Some(config_path));
    }

    #[test]
    fn test_env_overrides_config_file() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(
            &temp,
            "version: \"1.0\"\npaths:\n  catalogue: media.txt\nsession:\n  role: admin\n",
        );
        let config = load_config_file(&config_path).unwrap();

        let resolved = resolve(
            PathBuf::from("/unused"),
            Some((config_path, config)),
            env_from(&[
                ("LIBRASYS_CATALOGUE", "/tmp/other.txt"),
                ("LIBRASYS_ROLE", "super-admin"),
            ]),
        )
        .unwrap();
        assert_eq!(resolved.catalogue, PathBuf::from("/tmp/other.txt"));
        assert_eq!(resolved.role, Role::SuperAdmin);
    }

    #[test]
    fn test_invalid_role_is_rejected() {
        let result = resolve(
            PathBuf::from("/home/u/.librasys"),
            None,
            env_from(&[("LIBRASYS_ROLE", "librarian")]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/./subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
