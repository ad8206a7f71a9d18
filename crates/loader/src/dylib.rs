//! Native shared-library plugins.
//!
//! Every library found on the search path is opened eagerly and asked for
//! its descriptor list under [`PLUGIN_SYMBOL`]. The unsafe surface is kept
//! to this file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;
use plugin_core::api::PLUGIN_SYMBOL;
use plugin_core::{Api, LibraryHandle, Origin};
use tracing::{debug, info, warn};

use crate::walk::library_files;
use crate::{Candidate, Discover};

#[cfg(target_os = "macos")]
pub const LIB_EXT: &str = "dylib";
#[cfg(windows)]
pub const LIB_EXT: &str = "dll";
#[cfg(not(any(target_os = "macos", windows)))]
pub const LIB_EXT: &str = "so";

/// An open plugin library. Closed when the last reference is dropped.
pub struct Dylib {
    path: PathBuf,
    _lib: Library,
}

impl fmt::Debug for Dylib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dylib").field("path", &self.path).finish()
    }
}

impl LibraryHandle for Dylib {
    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Dylib {
    fn drop(&mut self) {
        debug!(library = %self.path.display(), "closing plugin library");
    }
}

/// Discovers plugins in shared libraries under a colon-separated search
/// path.
#[derive(Debug, Default, Clone)]
pub struct DylibLoader {
    roots: Vec<PathBuf>,
}

impl DylibLoader {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Splits `paths` on `:` and ignores empty segments.
    pub fn from_search_path(paths: &str) -> Self {
        Self::new(
            paths
                .split(':')
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect(),
        )
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn load_lib(file: &Path) -> Option<Vec<Candidate>> {
        // SAFETY: loading runs the library's initialisers. Only files on the
        // operator-configured plugin path are opened, during single-threaded
        // startup.
        let lib = match unsafe { Library::new(file) } {
            Ok(lib) => lib,
            Err(e) => {
                warn!(stage = "load", library = %file.display(), error = %e);
                return None;
            }
        };

        // SAFETY: `vigil_plugins` is a `static &[Api]` emitted by
        // `export_plugins!`. The slice and everything it points to live
        // inside the library, which stays open while any registry entry
        // holds the `Dylib` handle created below. Layout agreement is checked
        // by the registry before a descriptor is accepted.
        let apis: &'static [Api] = unsafe {
            match lib.get::<*const &'static [Api]>(PLUGIN_SYMBOL) {
                Ok(sym) => **sym,
                Err(e) => {
                    warn!(stage = "load", library = %file.display(), error = %e);
                    return None;
                }
            }
        };

        let handle: Arc<dyn LibraryHandle> = Arc::new(Dylib {
            path: file.to_path_buf(),
            _lib: lib,
        });
        info!(stage = "load", library = %file.display(), plugins = apis.len());
        Some(
            apis.iter()
                .map(|api| Candidate {
                    api: *api,
                    origin: Origin::Library(handle.clone()),
                })
                .collect(),
        )
    }
}

impl Discover for DylibLoader {
    fn discover(&mut self) -> Vec<Candidate> {
        let mut out = Vec::new();
        for root in &self.roots {
            let files = match library_files(root, LIB_EXT) {
                Ok(files) => files,
                Err(e) => {
                    warn!(
                        stage = "load",
                        path = %root.display(),
                        error = %e,
                        "skipping plugin path"
                    );
                    continue;
                }
            };
            for file in files {
                if let Some(candidates) = Self::load_lib(&file) {
                    out.extend(candidates);
                }
            }
        }
        out
    }
}
