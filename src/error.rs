use thiserror::Error;

use crate::config::ConfigError;
use crate::graph::resolve::ResolveError;
use crate::manifest::ManifestError;

#[derive(Debug, Error)]
pub enum PkgOrderError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PkgOrderError>;
