//! Configuration loading for the duty engine.
//!
//! This module loads the YAML configuration: the HTTP bind address, the
//! optional snapshot path of the store, and the member roster supplied by
//! the identity collaborator.
//!
//! # Example
//!
//! ```no_run
//! use duty_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/duty-engine.yaml").unwrap();
//! println!("Roster has {} members", config.roster().len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{EngineConfig, ServerConfig, StorageConfig};
