//! `engine_client`
//!
//! Application wiring around the asset core:
//! - JSON configuration
//! - Directory-backed byte provider (stand-in for the real archive)
//! - World-cell batch loading with per-asset degradation

pub mod config;
pub mod provider;
pub mod world;

pub use config::ClientConfig;
pub use provider::DirProvider;
pub use world::CellLoader;
