//! Per-worker decode context.

use plugin_core::{Codec, ProtocolId};

use super::ids::IdPool;
use super::stats::DecodeStats;
use super::table::Slot;
use super::CodecManager;

/// State owned by one worker thread between
/// [`CodecManager::thread_init`] and [`CodecManager::thread_term`].
///
/// The context borrows its manager, so the codecs it resolves cannot be
/// released while any worker is still running.
pub struct CodecThread<'m> {
    pub(super) manager: &'m CodecManager,
    pub(super) grinder: Slot,
    pub(super) max_layers: u8,
    pub(super) ids: IdPool,
    pub(super) stats: DecodeStats,
    pub(super) hits: Vec<u64>,
}

impl<'m> CodecThread<'m> {
    pub(super) fn new(manager: &'m CodecManager, grinder: Slot, max_layers: u8) -> Self {
        Self {
            manager,
            grinder,
            max_layers,
            ids: IdPool::new(),
            stats: DecodeStats::default(),
            hits: vec![0; usize::from(u8::MAX) + 1],
        }
    }

    /// Entry codec for raw frames of the configured link type.
    #[inline]
    pub fn grinder(&self) -> Slot {
        self.grinder
    }

    /// Bound on nested decode depth.
    #[inline]
    pub fn max_layers(&self) -> u8 {
        self.max_layers
    }

    #[inline]
    pub fn lookup(&self, id: ProtocolId) -> Option<Slot> {
        self.manager.lookup(id)
    }

    #[inline]
    pub fn codec(&self, slot: Slot) -> Option<&'m dyn Codec> {
        self.manager.codec(slot)
    }

    pub fn manager(&self) -> &'m CodecManager {
        self.manager
    }

    /// Next identifier from this thread's pool.
    #[inline]
    pub fn next_ip_id(&mut self) -> u16 {
        self.ids.next_id()
    }

    /// Regenerates the identifier pool.
    pub fn reseed(&mut self) {
        self.ids.reseed();
    }

    /// Counters accumulated on this thread since `thread_init`.
    pub fn stats(&self) -> DecodeStats {
        let mut stats = self.stats.clone();
        self.manager.fold_hits(&self.hits, &mut stats);
        stats
    }
}
