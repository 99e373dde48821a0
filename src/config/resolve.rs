use std::env;
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, PkgOrderConfig, ResolverSettings};

const CONFIG_FILE_NAMES: [&str; 2] = ["pkgorder.toml", ".pkgorder.toml"];

#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// File the settings came from, `None` when built-in defaults were used.
    pub path: Option<PathBuf>,
    pub settings: ResolverSettings,
}

pub fn load_config_with_override(
    start: impl AsRef<Path>,
    config_path: Option<PathBuf>,
) -> Result<LoadedConfig, ConfigError> {
    let explicit = config_path.or_else(|| env::var("PKGORDER_CONFIG").ok().map(PathBuf::from));

    let path = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(ConfigError::ConfigNotFound(path));
            }
            Some(path)
        }
        None => find_config_from(start.as_ref()),
    };

    let mut settings = match path.as_deref() {
        Some(path) => read_config(path)?.settings(),
        None => ResolverSettings::default(),
    };
    apply_env_overrides(&mut settings)?;

    Ok(LoadedConfig { path, settings })
}

pub fn read_config(path: &Path) -> Result<PkgOrderConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

fn find_config_from(start: &Path) -> Option<PathBuf> {
    for ancestor in start.ancestors() {
        for name in CONFIG_FILE_NAMES {
            let candidate = ancestor.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

fn apply_env_overrides(settings: &mut ResolverSettings) -> Result<(), ConfigError> {
    if let Ok(value) = env::var("PKGORDER_CYCLE_CHECK") {
        settings.cycle_check = value.parse()?;
    }
    if let Ok(value) = env::var("PKGORDER_STRICT_FOREST") {
        settings.strict_forest = parse_bool("strict_forest", &value)?;
    }
    if let Ok(value) = env::var("PKGORDER_MAX_SCOPE") {
        settings.max_scope = value.parse()?;
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
