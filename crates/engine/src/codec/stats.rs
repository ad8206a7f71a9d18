use std::collections::BTreeMap;

use serde::Serialize;

/// Decode counters. Kept per thread and flushed into the manager's totals
/// by `thread_term`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodeStats {
    pub frames: u64,
    pub layers: u64,
    /// Frames that stopped on a protocol id no codec claims.
    pub unclaimed: u64,
    /// Frames a codec refused to decode.
    pub failed: u64,
    /// Frames cut short by the layer bound.
    pub depth_exceeded: u64,
    /// Layers decoded, by codec name.
    pub by_codec: BTreeMap<String, u64>,
}

impl DecodeStats {
    pub fn merge(&mut self, other: &DecodeStats) {
        self.frames += other.frames;
        self.layers += other.layers;
        self.unclaimed += other.unclaimed;
        self.failed += other.failed;
        self.depth_exceeded += other.depth_exceeded;
        for (name, count) in &other.by_codec {
            *self.by_codec.entry(name.clone()).or_default() += count;
        }
    }
}
