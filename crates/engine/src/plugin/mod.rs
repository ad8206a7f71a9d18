//! Plugin orchestration across kinds.

use plugin_core::{PlugType, Registered};

use crate::error::ConfigError;

mod extension;
pub mod manager;

pub use extension::ExtensionManager;
pub use manager::PluginManager;

/// What the orchestrator needs from a kind-specific manager.
pub trait KindManager {
    /// Whether entries of `plug_type` belong to this manager.
    fn accepts(&self, plug_type: PlugType) -> bool;

    fn add_plugin(&mut self, plugin: &Registered) -> Result<(), ConfigError>;

    fn instantiate_all(&mut self) -> Result<(), ConfigError>;

    fn release_all(&mut self);

    /// Releases and then forgets every added descriptor.
    fn clear(&mut self);

    /// `(name, version)` of every added descriptor.
    fn dump(&self) -> Vec<(&'static str, u32)>;
}
