//! Discovers plugin descriptors and feeds them to the registry.
//!
//! A loader only produces candidates; validation and version arbitration
//! belong to [`PluginRegistry`]. Built-in lists are always offered first so
//! that a newer dynamically loaded descriptor can supersede a built-in one.

use std::collections::HashSet;

use plugin_core::{Api, Origin, PluginRegistry};
use tracing::{debug, info};

mod dylib;
mod walk;

pub use dylib::{Dylib, DylibLoader, LIB_EXT};
pub use walk::library_files;

/// A descriptor offered for registration.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub api: Api,
    pub origin: Origin,
}

/// A strategy for finding candidate descriptors.
pub trait Discover {
    /// Candidates in the order they should be registered.
    fn discover(&mut self) -> Vec<Candidate>;
}

/// Descriptor lists compiled into the host.
#[derive(Debug, Default, Clone)]
pub struct StaticLoader {
    lists: Vec<&'static [Api]>,
}

impl StaticLoader {
    pub fn new(lists: Vec<&'static [Api]>) -> Self {
        Self { lists }
    }

    pub fn push(&mut self, list: &'static [Api]) -> &mut Self {
        self.lists.push(list);
        self
    }
}

impl Discover for StaticLoader {
    fn discover(&mut self) -> Vec<Candidate> {
        self.lists
            .iter()
            .flat_map(|list| list.iter())
            .map(|api| Candidate {
                api: *api,
                origin: Origin::Static,
            })
            .collect()
    }
}

/// Outcome of [`load_plugins`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub offered: usize,
    pub accepted: usize,
    pub disabled: usize,
}

/// Runs every loader in order and registers what they find.
///
/// `disabled` holds `type::name` keys the operator switched off; matching
/// candidates are dropped before registration.
pub fn load_plugins(
    registry: &mut PluginRegistry,
    loaders: &mut [&mut dyn Discover],
    disabled: &HashSet<String>,
) -> LoadReport {
    let mut report = LoadReport::default();
    for loader in loaders.iter_mut() {
        for candidate in loader.discover() {
            report.offered += 1;
            if let Some(plug_type) = candidate.api.plug_type() {
                let key = format!("{}::{}", plug_type, candidate.api.name());
                if disabled.contains(&key) {
                    debug!(stage = "load", plugin = %key, "plugin disabled");
                    report.disabled += 1;
                    continue;
                }
            }
            if registry.register(candidate.api, candidate.origin) {
                report.accepted += 1;
            }
        }
    }
    info!(
        stage = "load",
        offered = report.offered,
        accepted = report.accepted,
        disabled = report.disabled,
        plugins = registry.len()
    );
    report
}
