use std::collections::HashSet;

use loader::{load_plugins, Discover, LoadReport};
use plugin_core::{CodecApi, LinkType, PluginListing, PluginRegistry};
use tracing::info;

use super::{ExtensionManager, KindManager};
use crate::codec::{CodecManager, CodecThread};
use crate::error::ConfigError;

/// Sequences plugin bring-up and shutdown: registry, then the kind
/// managers, then release in reverse.
pub struct PluginManager {
    registry: PluginRegistry,
    codecs: CodecManager,
    extensions: ExtensionManager,
}

impl PluginManager {
    /// Creates an empty manager. `default_codec` fills slot 0.
    pub fn new(default_codec: &'static CodecApi) -> Self {
        Self::with_registry(PluginRegistry::new(), default_codec)
    }

    pub fn with_registry(registry: PluginRegistry, default_codec: &'static CodecApi) -> Self {
        Self {
            registry,
            codecs: CodecManager::new(default_codec),
            extensions: ExtensionManager::new(),
        }
    }

    /// Runs `loaders` into the registry and hands every accepted entry to
    /// the manager for its kind.
    pub fn load(
        &mut self,
        loaders: &mut [&mut dyn Discover],
        disabled: &HashSet<String>,
    ) -> Result<LoadReport, ConfigError> {
        let report = load_plugins(&mut self.registry, loaders, disabled);
        self.adopt()?;
        Ok(report)
    }

    /// Hands every registry entry to the manager that accepts its kind.
    pub fn adopt(&mut self) -> Result<(), ConfigError> {
        for plugin in self.registry.iter() {
            let managers: [&mut dyn KindManager; 2] = [&mut self.codecs, &mut self.extensions];
            for manager in managers {
                if manager.accepts(plugin.plug_type) {
                    manager.add_plugin(plugin)?;
                }
            }
        }
        Ok(())
    }

    /// Instantiates every added plugin.
    pub fn instantiate(&mut self) -> Result<(), ConfigError> {
        self.codecs.instantiate_all()?;
        self.extensions.instantiate_all()?;
        info!(
            stage = "instantiate",
            codecs = self.codecs.len(),
            extensions = self.extensions.len(),
            "plugins ready"
        );
        Ok(())
    }

    /// Sets up the calling worker: codec thread state first, then the
    /// thread-init hook of every live extension. Nothing runs when no codec
    /// decodes `link_type`.
    pub fn thread_init(
        &self,
        link_type: LinkType,
        num_layers: u8,
    ) -> Result<CodecThread<'_>, ConfigError> {
        let thread = self.codecs.thread_init(link_type, num_layers)?;
        self.extensions.thread_init();
        Ok(thread)
    }

    /// Undoes [`PluginManager::thread_init`] in reverse order.
    pub fn thread_term(&self, thread: CodecThread<'_>) {
        self.extensions.thread_term();
        self.codecs.thread_term(thread);
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn codecs(&self) -> &CodecManager {
        &self.codecs
    }

    pub fn codecs_mut(&mut self) -> &mut CodecManager {
        &mut self.codecs
    }

    pub fn extensions(&self) -> &ExtensionManager {
        &self.extensions
    }

    pub fn list(&self) -> Vec<PluginListing> {
        self.registry.list()
    }

    pub fn show(&self) -> Vec<(String, &'static str)> {
        self.registry.show()
    }

    /// `(name, version)` per added plugin, codecs first.
    pub fn dump(&self) -> Vec<(&'static str, u32)> {
        let mut out = self.codecs.dump();
        out.extend(self.extensions.dump());
        out
    }

    /// Releases extensions, then codecs, then the registry and its
    /// libraries. Added descriptors are forgotten, so a later
    /// `instantiate` only brings up the default codec. Safe to call more
    /// than once.
    pub fn release(&mut self) {
        KindManager::clear(&mut self.extensions);
        self.codecs.clear();
        self.registry.teardown();
    }
}

impl Drop for PluginManager {
    fn drop(&mut self) {
        self.release();
    }
}
