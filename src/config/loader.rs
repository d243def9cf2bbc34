//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from a YAML file.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::{MemberId, MemberProfile};

use super::types::EngineConfig;

/// Loads and provides access to the engine configuration.
///
/// # File Structure
///
/// ```text
/// server:
///   bind: "127.0.0.1:3000"
/// storage:
///   snapshot_path: "./data/duty.json"
/// roster:
///   - id: 1
///     display_name: "Rosa Vidal"
///     badge_number: "SEC-014"
/// ```
///
/// Every section is optional.
///
/// # Example
///
/// ```no_run
/// use duty_engine::config::ConfigLoader;
/// use duty_engine::models::MemberId;
///
/// let loader = ConfigLoader::load("./config/duty-engine.yaml").unwrap();
/// if let Some(profile) = loader.profile(MemberId(1)) {
///     println!("Member 1 is {}", profile.display_name);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified file.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - The file is missing
    /// - The file contains invalid YAML
    /// - The roster lists the same member id twice
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::from_yaml(&content, &path_str)
    }

    /// Parses configuration from YAML text; `origin` names it in errors.
    pub fn from_yaml(content: &str, origin: &str) -> EngineResult<Self> {
        let config: EngineConfig =
            serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
                path: origin.to_string(),
                message: e.to_string(),
            })?;

        let mut seen = HashSet::new();
        for profile in &config.roster {
            if !seen.insert(profile.id) {
                return Err(EngineError::ConfigParseError {
                    path: origin.to_string(),
                    message: format!("duplicate roster member id {}", profile.id),
                });
            }
        }

        Ok(Self { config })
    }

    /// Returns the full configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the roster in file order.
    pub fn roster(&self) -> &[MemberProfile] {
        &self.config.roster
    }

    /// Looks up a member's profile.
    pub fn profile(&self, member_id: MemberId) -> Option<&MemberProfile> {
        self.config.roster.iter().find(|p| p.id == member_id)
    }
}
