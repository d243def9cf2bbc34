//! JSON snapshot persistence for the store.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::tables::{Tables, TablesSnapshot};

/// Loads tables from `path`, or `None` when no snapshot exists yet.
pub(super) fn load(path: &Path) -> EngineResult<Option<Tables>> {
    if !path.exists() {
        return Ok(None);
    }

    let path_str = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| {
        EngineError::storage(format!("failed to read snapshot {}: {}", path_str, e))
    })?;
    let snapshot: TablesSnapshot = serde_json::from_str(&content).map_err(|e| {
        EngineError::storage(format!("failed to parse snapshot {}: {}", path_str, e))
    })?;

    debug!(path = %path_str, "Snapshot loaded");
    Tables::from_snapshot(snapshot).map(Some)
}

/// Writes tables to `path`.
///
/// The snapshot is written beside the target and renamed over it, so a
/// crash mid-write leaves the previous snapshot intact.
pub(super) fn save(path: &Path, tables: &Tables) -> EngineResult<()> {
    let path_str = path.display().to_string();
    let json = serde_json::to_string(&tables.to_snapshot()).map_err(|e| {
        EngineError::storage(format!("failed to serialize snapshot {}: {}", path_str, e))
    })?;

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, json).map_err(|e| {
        EngineError::storage(format!(
            "failed to write snapshot {}: {}",
            tmp_path.display(),
            e
        ))
    })?;
    fs::rename(&tmp_path, path).map_err(|e| {
        EngineError::storage(format!("failed to replace snapshot {}: {}", path_str, e))
    })?;

    debug!(path = %path_str, "Snapshot written");
    Ok(())
}
