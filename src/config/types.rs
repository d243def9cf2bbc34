//! Configuration types for the duty engine.
//!
//! This module contains the structures deserialized from the YAML
//! configuration file.

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;

use crate::models::MemberProfile;

/// HTTP adapter settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// The socket address the server listens on.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

/// Storage settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Where the store snapshot is persisted; memory-only when absent.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

/// The complete engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// HTTP adapter settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Member profiles supplied by the identity collaborator.
    #[serde(default)]
    pub roster: Vec<MemberProfile>,
}
