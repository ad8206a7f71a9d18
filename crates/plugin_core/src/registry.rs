//! Process-wide plugin registry.
//!
//! Provides a [`PluginRegistry`] that validates candidate descriptors
//! against the host ABI and keeps only the highest-ranked descriptor per
//! `type::name` key. Entries backed by a shared library hold a counted
//! reference to its handle; the handle is released as soon as the last
//! entry it backs is superseded or unloaded.
//!
//! Registration happens single-threaded during startup. Once worker
//! threads run, the registry is only read.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::Api;
use crate::kind::PlugType;
use crate::API_OPTIONS;

/// An open shared library that descriptors were read from.
///
/// Dropping the last `Arc` to a handle closes the library.
pub trait LibraryHandle: Send + Sync + fmt::Debug {
    fn path(&self) -> &Path;
}

/// Where a candidate descriptor came from.
#[derive(Debug, Clone)]
pub enum Origin {
    /// Compiled into the host.
    Static,
    /// Exported by a dynamically loaded library.
    Library(Arc<dyn LibraryHandle>),
}

impl Origin {
    /// Source label shown in listings.
    pub fn source(&self) -> String {
        match self {
            Origin::Static => "static".to_string(),
            Origin::Library(lib) => lib.path().display().to_string(),
        }
    }
}

/// Why a candidate descriptor was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("{plugin}: unknown plugin type {plug_type}")]
    UnknownType { plugin: String, plug_type: u32 },
    #[error("{plugin}: size mismatch; expected {expected}, got {actual}")]
    SizeMismatch {
        plugin: String,
        expected: u32,
        actual: u32,
    },
    #[error("{plugin}: version mismatch; expected {expected}, got {actual}")]
    VersionMismatch {
        plugin: String,
        expected: u32,
        actual: u32,
    },
    #[error("{plugin}: incompatible builds")]
    IncompatibleBuild { plugin: String },
    #[error("{plugin}: v{incumbent} from {holder} is kept over v{candidate}")]
    Outranked {
        plugin: String,
        incumbent: u32,
        candidate: u32,
        holder: String,
    },
}

/// Tracks whether a descriptor's process-init hook has run without a
/// matching process-term.
#[derive(Debug, Default)]
pub struct Lifecycle {
    live: AtomicBool,
}

impl Lifecycle {
    /// Runs the process-init hook unless it already ran.
    pub fn process_init(&self, api: &Api) {
        if !self.live.swap(true, Ordering::AcqRel) {
            if let Some(pinit) = api.pinit() {
                pinit();
            }
        }
    }

    /// Runs the process-term hook if process-init ran.
    pub fn process_term(&self, api: &Api) {
        if self.live.swap(false, Ordering::AcqRel) {
            if let Some(pterm) = api.pterm() {
                pterm();
            }
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

/// An accepted descriptor with its provenance.
#[derive(Debug, Clone)]
pub struct Registered {
    pub key: String,
    pub api: Api,
    pub plug_type: PlugType,
    /// `"static"` or the library path.
    pub source: String,
    pub lifecycle: Arc<Lifecycle>,
    library: Option<Arc<dyn LibraryHandle>>,
}

impl Registered {
    /// The library the descriptor lives in. Holders of the descriptor keep
    /// a clone so the library stays open while they can reach it.
    pub fn library(&self) -> Option<&Arc<dyn LibraryHandle>> {
        self.library.as_ref()
    }
}

/// One line of [`PluginRegistry::list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginListing {
    pub key: String,
    pub version: u32,
    pub source: String,
}

#[derive(Debug)]
struct RefCount {
    handle: Arc<dyn LibraryHandle>,
    count: u32,
}

/// Keeps the best-known descriptor for every `type::name` key.
pub struct PluginRegistry {
    plugins: IndexMap<String, Registered>,
    libraries: IndexMap<PathBuf, RefCount>,
    build_options: Option<&'static str>,
}

fn set_key(plug_type: PlugType, name: &str) -> String {
    format!("{}::{}", plug_type.name(), name)
}

// Plugins are linked eagerly when loaded, so missing symbols never reach
// this point. Shared structs must still be laid out identically, which
// requires identical build options.
fn compatible_builds(host: Option<&str>, plugin: Option<&str>) -> bool {
    match (host, plugin) {
        (None, None) => true,
        (Some(h), Some(p)) => h == p,
        _ => false,
    }
}

impl PluginRegistry {
    /// Empty registry checking against this host's build options.
    pub fn new() -> Self {
        Self::with_build_options(API_OPTIONS)
    }

    /// Empty registry checking against an explicit build fingerprint.
    pub fn with_build_options(build_options: Option<&'static str>) -> Self {
        Self {
            plugins: IndexMap::new(),
            libraries: IndexMap::new(),
            build_options,
        }
    }

    /// Validates the ABI fields of `api` against the host.
    pub fn check(&self, api: &Api) -> Result<PlugType, RejectReason> {
        let base = api.base();
        let plugin = base.name.to_string();
        let plug_type =
            PlugType::try_from(base.plug_type).map_err(|plug_type| RejectReason::UnknownType {
                plugin: plugin.clone(),
                plug_type,
            })?;
        let sym = plug_type.symbol();

        // The declared size and the size of the struct actually handed over
        // must both match what the host expects for this type.
        if base.size != sym.size || api.layout_size() != sym.size {
            return Err(RejectReason::SizeMismatch {
                plugin,
                expected: sym.size,
                actual: base.size,
            });
        }
        if base.api_version != sym.version {
            return Err(RejectReason::VersionMismatch {
                plugin,
                expected: sym.version,
                actual: base.api_version,
            });
        }
        if !compatible_builds(self.build_options, base.options) {
            return Err(RejectReason::IncompatibleBuild { plugin });
        }
        Ok(plug_type)
    }

    /// Offers a candidate descriptor. Returns whether it was accepted.
    ///
    /// Rejections are logged and never fatal. A descriptor replaces an
    /// existing one with the same key only when its version is strictly
    /// higher.
    pub fn register(&mut self, api: Api, origin: Origin) -> bool {
        let source = origin.source();
        let plug_type = match self.check(&api) {
            Ok(t) => t,
            Err(reason) => {
                warn!(stage = "register", source = %source, "{reason}");
                return false;
            }
        };

        let key = set_key(plug_type, api.name());
        if let Some(existing) = self.plugins.get(&key) {
            if existing.api.version() >= api.version() {
                let reason = RejectReason::Outranked {
                    plugin: key.clone(),
                    incumbent: existing.api.version(),
                    candidate: api.version(),
                    holder: existing.source.clone(),
                };
                warn!(stage = "register", source = %source, "{reason}");
                return false;
            }
            debug!(
                stage = "register",
                plugin = %key,
                old = existing.api.version(),
                new = api.version(),
                "superseding plugin"
            );
            existing.lifecycle.process_term(&existing.api);
            let library = existing.library.as_ref().map(|h| h.path().to_path_buf());
            self.release_library(library.as_deref());
        }

        let library = match origin {
            Origin::Static => None,
            Origin::Library(handle) => {
                self.libraries
                    .entry(handle.path().to_path_buf())
                    .or_insert_with(|| RefCount {
                        handle: handle.clone(),
                        count: 0,
                    })
                    .count += 1;
                Some(handle)
            }
        };

        debug!(stage = "register", plugin = %key, version = api.version(), source = %source);
        self.plugins.insert(
            key.clone(),
            Registered {
                key,
                api,
                plug_type,
                source,
                lifecycle: Arc::new(Lifecycle::default()),
                library,
            },
        );
        true
    }

    fn release_library(&mut self, path: Option<&Path>) {
        let Some(path) = path else { return };
        let Some(rc) = self.libraries.get_mut(path) else {
            return;
        };
        rc.count = rc.count.saturating_sub(1);
        if rc.count == 0 {
            debug!(stage = "unload", library = %path.display(), "last entry released");
            self.libraries.shift_remove(path);
        }
    }

    /// Looks up the live descriptor for `plug_type::name`.
    pub fn resolve(&self, plug_type: PlugType, name: &str) -> Option<Api> {
        self.get(plug_type, name).map(|r| r.api)
    }

    /// Registry entry for `plug_type::name`.
    pub fn get(&self, plug_type: PlugType, name: &str) -> Option<&Registered> {
        self.plugins.get(&set_key(plug_type, name))
    }

    /// Visits every entry of one type in registration order.
    pub fn for_each_of_kind<F>(&self, plug_type: PlugType, mut visitor: F)
    where
        F: FnMut(&Registered),
    {
        self.of_kind(plug_type).for_each(|r| visitor(r));
    }

    /// Entries of one type in registration order.
    pub fn of_kind(&self, plug_type: PlugType) -> impl Iterator<Item = &Registered> + '_ {
        self.plugins
            .values()
            .filter(move |r| r.plug_type == plug_type)
    }

    /// Every entry in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Registered> + '_ {
        self.plugins.values()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Number of live entries backed by the library at `path`.
    pub fn library_refs(&self, path: &Path) -> u32 {
        self.libraries.get(path).map_or(0, |rc| rc.count)
    }

    /// Number of libraries currently held open.
    pub fn open_libraries(&self) -> usize {
        self.libraries.len()
    }

    /// Lists `type::name`, version and source of every entry, sorted by key.
    pub fn list(&self) -> Vec<PluginListing> {
        let mut out: Vec<PluginListing> = self
            .plugins
            .values()
            .map(|r| PluginListing {
                key: r.key.clone(),
                version: r.api.version(),
                source: r.source.clone(),
            })
            .collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        out
    }

    /// Key and help text of every entry, sorted by key.
    pub fn show(&self) -> Vec<(String, &'static str)> {
        let mut out: Vec<(String, &'static str)> = self
            .plugins
            .values()
            .map(|r| (r.key.clone(), r.api.base().help))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Runs pending process-term hooks in registration order, releases
    /// every library reference and empties the registry.
    pub fn teardown(&mut self) {
        if self.plugins.is_empty() && self.libraries.is_empty() {
            return;
        }
        info!(stage = "teardown", plugins = self.plugins.len());
        for r in self.plugins.values() {
            r.lifecycle.process_term(&r.api);
        }
        self.plugins.clear();
        for (path, rc) in self.libraries.drain(..) {
            debug!(stage = "unload", library = %path.display(), refs = rc.count, "closing library");
            drop(rc.handle);
        }
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PluginRegistry {
    fn drop(&mut self) {
        self.teardown();
    }
}
