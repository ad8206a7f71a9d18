//! Live codec instances and the protocol dispatch table.
//!
//! The manager is built and mutated during single-threaded startup and
//! shutdown. In between it is shared read-only by every worker, each of
//! which holds its own [`CodecThread`].

use std::iter;
use std::sync::{Arc, Mutex, PoisonError};

use plugin_core::{
    Api, Codec, CodecApi, LibraryHandle, Lifecycle, LinkType, PlugType, ProtocolId, Registered,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::plugin::KindManager;

mod decode;
mod ids;
mod stats;
mod table;
mod thread;

pub use decode::{Decoded, Layer, StopReason};
pub use ids::{IdPool, IP_ID_COUNT};
pub use stats::DecodeStats;
pub use table::{Slot, MAX_CODECS};
pub use thread::CodecThread;

use table::DispatchTable;

struct CodecApiWrapper {
    key: String,
    api: &'static CodecApi,
    lifecycle: Arc<Lifecycle>,
    slot: Option<Slot>,
    // Keeps the library `api` points into open.
    _library: Option<Arc<dyn LibraryHandle>>,
}

impl CodecApiWrapper {
    fn new(key: String, api: &'static CodecApi, lifecycle: Arc<Lifecycle>) -> Self {
        Self {
            key,
            api,
            lifecycle,
            slot: None,
            _library: None,
        }
    }
}

/// One row of [`CodecManager::instances`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodecInfo {
    pub slot: u8,
    pub name: String,
    pub version: u32,
    pub protocol_ids: Vec<ProtocolId>,
    pub link_types: Vec<LinkType>,
}

/// Owns every instantiated codec and the protocol id to slot mapping.
pub struct CodecManager {
    default: CodecApiWrapper,
    codecs: Vec<CodecApiWrapper>,
    table: DispatchTable,
    totals: Mutex<DecodeStats>,
}

fn check_hooks(api: &CodecApi) -> Result<(), ConfigError> {
    for (present, hook) in [(api.ctor.is_some(), "ctor"), (api.dtor.is_some(), "dtor")] {
        if !present {
            return Err(ConfigError::MissingHook {
                plugin: api.base.name.to_string(),
                hook,
            });
        }
    }
    Ok(())
}

fn instantiate(table: &mut DispatchTable, wrap: &mut CodecApiWrapper) -> Result<Slot, ConfigError> {
    if let Some(slot) = wrap.slot {
        return Ok(slot);
    }
    check_hooks(wrap.api)?;
    if table.is_full() {
        return Err(ConfigError::CapacityExceeded { max: MAX_CODECS });
    }
    wrap.lifecycle.process_init(&Api::Codec(wrap.api));
    let slot = table.insert(wrap.api)?;
    wrap.slot = Some(slot);
    Ok(slot)
}

fn release(table: &mut DispatchTable, wrap: &mut CodecApiWrapper) {
    let Some(slot) = wrap.slot.take() else {
        return;
    };
    wrap.lifecycle.process_term(&Api::Codec(wrap.api));
    if let Some(instance) = table.take(slot) {
        debug!(stage = "release", codec = %wrap.key, slot = %slot);
        (instance.dtor)(instance.codec);
    }
}

impl CodecManager {
    /// Creates a manager around the reserved default codec. The default is
    /// not part of the plugin list; its hooks are run here.
    pub fn new(default: &'static CodecApi) -> Self {
        let key = format!("{}::{}", PlugType::Codec, default.base.name);
        Self {
            default: CodecApiWrapper::new(key, default, Arc::new(Lifecycle::default())),
            codecs: Vec::new(),
            table: DispatchTable::new(),
            totals: Mutex::new(DecodeStats::default()),
        }
    }

    /// Adds a registered codec descriptor. Non-codec entries are ignored and
    /// a key that was already added is skipped.
    pub fn add_plugin(&mut self, plugin: &Registered) -> Result<(), ConfigError> {
        let Some(api) = plugin.api.as_codec() else {
            return Ok(());
        };
        check_hooks(api)?;
        if self.codecs.iter().any(|w| w.key == plugin.key) {
            return Ok(());
        }
        debug!(stage = "add", codec = %plugin.key, version = api.base.version);
        self.codecs.push(CodecApiWrapper {
            _library: plugin.library().cloned(),
            ..CodecApiWrapper::new(plugin.key.clone(), api, plugin.lifecycle.clone())
        });
        Ok(())
    }

    /// Instantiates the default codec and then every added codec that is
    /// not live yet. Slot 0 aliases the default once this returns.
    pub fn instantiate_all(&mut self) -> Result<(), ConfigError> {
        let slot = instantiate(&mut self.table, &mut self.default)?;
        self.table.set_default(slot);
        for wrap in &mut self.codecs {
            instantiate(&mut self.table, wrap)?;
        }
        info!(stage = "instantiate", codecs = self.table.len(), "codecs ready");
        Ok(())
    }

    /// Instantiates one added codec by exact name.
    pub fn instantiate_named(&mut self, name: &str) -> Result<Slot, ConfigError> {
        let wrap = self
            .codecs
            .iter_mut()
            .find(|w| w.api.base.name == name)
            .ok_or_else(|| ConfigError::NotRegistered {
                plugin: name.to_string(),
            })?;
        instantiate(&mut self.table, wrap)
    }

    /// Slot of the codec claiming `id`, or `None` when no codec claims it.
    #[inline]
    pub fn lookup(&self, id: ProtocolId) -> Option<Slot> {
        self.table.claimant(id)
    }

    /// First live codec, from slot 1 upwards, whose name is a
    /// case-insensitive prefix of `keyword`.
    pub fn lookup_by_name(&self, keyword: &str) -> Option<Slot> {
        let keyword = keyword.as_bytes();
        self.table.iter().find_map(|(slot, inst)| {
            let name = inst.codec.name().as_bytes();
            keyword
                .get(..name.len())
                .is_some_and(|k| k.eq_ignore_ascii_case(name))
                .then_some(slot)
        })
    }

    /// The codec in `slot`. Slot 0 resolves to the default codec.
    #[inline]
    pub fn codec(&self, slot: Slot) -> Option<&dyn Codec> {
        self.table.get(slot).map(|i| i.codec.as_ref())
    }

    /// Picks the codec that decodes raw frames of `link_type`. When more
    /// than one claims it the highest slot wins.
    pub fn elect_grinder(&self, link_type: LinkType) -> Result<Slot, ConfigError> {
        let mut grinder: Option<Slot> = None;
        for (slot, inst) in self.table.iter() {
            if !inst.link_types.contains(&link_type) {
                continue;
            }
            if let Some(prev) = grinder.filter(|&prev| prev != slot) {
                warn!(
                    stage = "thread_init",
                    previous = self.name_of(prev),
                    chosen = inst.codec.name(),
                    link_type,
                    "two codecs registered as the raw decoder; using the later one"
                );
            }
            grinder = Some(slot);
        }
        grinder.ok_or(ConfigError::NoGrinder { link_type })
    }

    fn name_of(&self, slot: Slot) -> &str {
        self.codec(slot).map_or("?", |c| c.name())
    }

    fn live(&self) -> impl Iterator<Item = &CodecApiWrapper> + '_ {
        iter::once(&self.default)
            .chain(self.codecs.iter())
            .filter(|w| w.slot.is_some())
    }

    /// Sets up the calling worker. Elects the grinder, runs every live
    /// codec's thread-init hook and fills a fresh identifier pool. No hook
    /// runs when the election fails.
    pub fn thread_init(
        &self,
        link_type: LinkType,
        num_layers: u8,
    ) -> Result<CodecThread<'_>, ConfigError> {
        let grinder = self.elect_grinder(link_type)?;
        for wrap in self.live() {
            if let Some(tinit) = wrap.api.tinit {
                tinit();
            }
        }
        debug!(
            stage = "thread_init",
            grinder = self.name_of(grinder),
            link_type,
            max_layers = num_layers
        );
        Ok(CodecThread::new(self, grinder, num_layers))
    }

    /// Tears down a worker: flushes its counters into the totals and runs
    /// every live codec's thread-term hook.
    pub fn thread_term(&self, ctx: CodecThread<'_>) {
        let stats = ctx.stats();
        self.totals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(&stats);
        for wrap in self.live() {
            if let Some(tterm) = wrap.api.tterm {
                tterm();
            }
        }
        debug!(stage = "thread_term", frames = stats.frames);
    }

    /// Runs process-term and then the destructor for every live codec and
    /// empties the dispatch table. Added descriptors are kept, so
    /// `instantiate_all` can bring them back.
    pub fn release_all(&mut self) {
        for wrap in self.codecs.iter_mut().chain(iter::once(&mut self.default)) {
            release(&mut self.table, wrap);
        }
        self.table.clear();
    }

    /// Releases every live codec and forgets the added descriptors, dropping
    /// their library references. Only the default codec remains.
    pub fn clear(&mut self) {
        self.release_all();
        self.codecs.clear();
    }

    pub(crate) fn fold_hits(&self, hits: &[u64], stats: &mut DecodeStats) {
        for (slot, inst) in self.table.iter() {
            let count = hits.get(slot.index()).copied().unwrap_or(0);
            if count > 0 {
                *stats
                    .by_codec
                    .entry(inst.codec.name().to_string())
                    .or_default() += count;
            }
        }
    }

    /// `(name, version)` of every added codec.
    pub fn dump(&self) -> Vec<(&'static str, u32)> {
        self.codecs
            .iter()
            .map(|w| (w.api.base.name, w.api.base.version))
            .collect()
    }

    /// Live codecs in slot order.
    pub fn instances(&self) -> Vec<CodecInfo> {
        self.table
            .iter()
            .map(|(slot, inst)| CodecInfo {
                slot: slot.index() as u8,
                name: inst.codec.name().to_string(),
                version: inst.api.base.version,
                protocol_ids: inst.protocol_ids.clone(),
                link_types: inst.link_types.clone(),
            })
            .collect()
    }

    /// Counters flushed by every `thread_term` so far.
    pub fn totals(&self) -> DecodeStats {
        self.totals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of live codecs, the default included.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }
}

impl KindManager for CodecManager {
    fn accepts(&self, plug_type: PlugType) -> bool {
        plug_type == PlugType::Codec
    }

    fn add_plugin(&mut self, plugin: &Registered) -> Result<(), ConfigError> {
        CodecManager::add_plugin(self, plugin)
    }

    fn instantiate_all(&mut self) -> Result<(), ConfigError> {
        CodecManager::instantiate_all(self)
    }

    fn release_all(&mut self) {
        CodecManager::release_all(self)
    }

    fn clear(&mut self) {
        CodecManager::clear(self)
    }

    fn dump(&self) -> Vec<(&'static str, u32)> {
        CodecManager::dump(self)
    }
}

impl Drop for CodecManager {
    fn drop(&mut self) {
        self.release_all();
    }
}
