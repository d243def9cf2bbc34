//! Application state for the duty engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::engine::DutyEngine;
use crate::error::{EngineError, EngineResult};
use crate::models::{MemberId, MemberProfile};

/// Shared application state.
///
/// Holds the engine and the loaded configuration, whose roster provides
/// display names and the weekly report ordering.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<DutyEngine>,
    config: Arc<ConfigLoader>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(engine: DutyEngine, config: ConfigLoader) -> Self {
        Self {
            engine: Arc::new(engine),
            config: Arc::new(config),
        }
    }

    /// Returns the engine.
    pub fn engine(&self) -> &DutyEngine {
        &self.engine
    }

    /// Returns the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns a shared handle to the configuration loader.
    pub fn shared_config(&self) -> Arc<ConfigLoader> {
        Arc::clone(&self.config)
    }

    /// Runs `f` against the engine on the blocking thread pool.
    ///
    /// Store operations hold a mutex and may write the snapshot file, so
    /// they stay off the async workers.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or a storage error if the task panicked
    /// or was cancelled.
    pub async fn run<T, F>(&self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&DutyEngine) -> EngineResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || f(&engine))
            .await
            .map_err(|e| EngineError::storage(format!("engine task failed: {}", e)))?
    }

    /// Looks up a roster profile.
    pub fn profile(&self, member_id: MemberId) -> Option<&MemberProfile> {
        self.config.profile(member_id)
    }
}
