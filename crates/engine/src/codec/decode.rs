//! Walks a raw frame through the dispatch table.

use plugin_core::{CodecData, ProtocolId};
use serde::Serialize;

use super::table::Slot;
use super::thread::CodecThread;

/// One decoded header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Layer<'m> {
    pub codec: &'m str,
    pub offset: usize,
    pub len: usize,
}

/// Why decoding stopped. Whatever follows the last layer is payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "protocol_id")]
pub enum StopReason {
    /// The last codec reported no inner protocol.
    Finished,
    /// The next protocol id has no claiming codec.
    Unclaimed(ProtocolId),
    /// A codec rejected its bytes.
    DecodeFailed,
    /// The layer bound was reached.
    MaxLayers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decoded<'m> {
    pub layers: Vec<Layer<'m>>,
    pub payload_offset: usize,
    pub stop: StopReason,
}

impl<'m> CodecThread<'m> {
    /// Decodes `raw` starting at the grinder, following each layer's next
    /// protocol id until a codec ends the chain, an id is unclaimed, a codec
    /// fails or `max_layers` headers have been decoded.
    pub fn decode(&mut self, raw: &[u8]) -> Decoded<'m> {
        let manager = self.manager;
        let mut layers = Vec::new();
        let mut offset = 0;
        let mut slot: Slot = self.grinder;

        let stop = loop {
            if layers.len() >= usize::from(self.max_layers) {
                break StopReason::MaxLayers;
            }
            let Some(codec) = manager.codec(slot) else {
                break StopReason::DecodeFailed;
            };
            let rest = &raw[offset..];
            let mut data = CodecData::default();
            if !codec.decode(rest, &mut data) || data.lyr_len > rest.len() {
                break StopReason::DecodeFailed;
            }
            layers.push(Layer {
                codec: codec.name(),
                offset,
                len: data.lyr_len,
            });
            self.hits[slot.index()] += 1;
            offset += data.lyr_len;

            match data.next_prot_id {
                None => break StopReason::Finished,
                Some(id) => match manager.lookup(id) {
                    Some(next) => slot = next,
                    None => break StopReason::Unclaimed(id),
                },
            }
        };

        self.stats.frames += 1;
        self.stats.layers += layers.len() as u64;
        match stop {
            StopReason::Finished => {}
            StopReason::Unclaimed(_) => self.stats.unclaimed += 1,
            StopReason::DecodeFailed => self.stats.failed += 1,
            StopReason::MaxLayers => self.stats.depth_exceeded += 1,
        }

        Decoded {
            layers,
            payload_offset: offset,
            stop,
        }
    }
}
