use std::sync::Arc;

use plugin_core::{Api, LibraryHandle, Lifecycle, PlugType, Registered};
use tracing::debug;

use super::KindManager;
use crate::error::ConfigError;

struct Entry {
    key: String,
    plug_type: PlugType,
    api: Api,
    lifecycle: Arc<Lifecycle>,
    _library: Option<Arc<dyn LibraryHandle>>,
}

/// Hosts every non-codec kind. These descriptors carry only lifecycle
/// hooks, so bringing one up means running its process-init.
#[derive(Default)]
pub struct ExtensionManager {
    entries: Vec<Entry>,
}

impl ExtensionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every live extension's thread-init hook.
    pub fn thread_init(&self) {
        for entry in self.live() {
            if let Some(tinit) = entry.api.tinit() {
                tinit();
            }
        }
    }

    pub fn thread_term(&self) {
        for entry in self.live() {
            if let Some(tterm) = entry.api.tterm() {
                tterm();
            }
        }
    }

    fn live(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.entries.iter().filter(|e| e.lifecycle.is_live())
    }

    /// Added keys of one kind, in registration order.
    pub fn keys_of(&self, plug_type: PlugType) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.plug_type == plug_type)
            .map(|e| e.key.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KindManager for ExtensionManager {
    fn accepts(&self, plug_type: PlugType) -> bool {
        plug_type != PlugType::Codec
    }

    fn add_plugin(&mut self, plugin: &Registered) -> Result<(), ConfigError> {
        if !self.accepts(plugin.plug_type) || self.entries.iter().any(|e| e.key == plugin.key) {
            return Ok(());
        }
        debug!(stage = "add", plugin = %plugin.key, version = plugin.api.version());
        self.entries.push(Entry {
            key: plugin.key.clone(),
            plug_type: plugin.plug_type,
            api: plugin.api,
            lifecycle: plugin.lifecycle.clone(),
            _library: plugin.library().cloned(),
        });
        Ok(())
    }

    fn instantiate_all(&mut self) -> Result<(), ConfigError> {
        for entry in &self.entries {
            entry.lifecycle.process_init(&entry.api);
        }
        Ok(())
    }

    fn release_all(&mut self) {
        for entry in &self.entries {
            entry.lifecycle.process_term(&entry.api);
        }
    }

    fn clear(&mut self) {
        self.release_all();
        self.entries.clear();
    }

    fn dump(&self) -> Vec<(&'static str, u32)> {
        self.entries
            .iter()
            .map(|e| (e.api.name(), e.api.version()))
            .collect()
    }
}
