pub mod resolve;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config at {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// How a traversal decides that it has run into a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleCheck {
    /// Any package met again while it is still on the traversal path.
    #[default]
    Path,
    /// Only a dependency that lists the package being expanded.
    Adjacent,
}

/// Which packages compete in the max-dependencies scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxScope {
    #[default]
    All,
    Roots,
}

impl FromStr for CycleCheck {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "path" => Ok(CycleCheck::Path),
            "adjacent" => Ok(CycleCheck::Adjacent),
            _ => Err(ConfigError::InvalidValue {
                key: "cycle_check".to_string(),
                value: input.to_string(),
            }),
        }
    }
}

impl FromStr for MaxScope {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(MaxScope::All),
            "roots" => Ok(MaxScope::Roots),
            _ => Err(ConfigError::InvalidValue {
                key: "max_scope".to_string(),
                value: input.to_string(),
            }),
        }
    }
}

impl fmt::Display for CycleCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleCheck::Path => f.write_str("path"),
            CycleCheck::Adjacent => f.write_str("adjacent"),
        }
    }
}

impl fmt::Display for MaxScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxScope::All => f.write_str("all"),
            MaxScope::Roots => f.write_str("roots"),
        }
    }
}

/// Knobs read by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverSettings {
    pub cycle_check: CycleCheck,
    /// Reject whole-graph orders when edges outnumber vertices minus one.
    pub strict_forest: bool,
    pub max_scope: MaxScope,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PkgOrderConfig {
    #[serde(default)]
    pub resolver: Option<ResolverConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub cycle_check: Option<CycleCheck>,
    #[serde(default)]
    pub strict_forest: Option<bool>,
    #[serde(default)]
    pub max_scope: Option<MaxScope>,
}

impl PkgOrderConfig {
    pub fn settings(&self) -> ResolverSettings {
        let defaults = ResolverSettings::default();
        let Some(resolver) = self.resolver.as_ref() else {
            return defaults;
        };
        ResolverSettings {
            cycle_check: resolver.cycle_check.unwrap_or(defaults.cycle_check),
            strict_forest: resolver.strict_forest.unwrap_or(defaults.strict_forest),
            max_scope: resolver.max_scope.unwrap_or(defaults.max_scope),
        }
    }
}
