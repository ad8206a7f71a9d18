//! Slot arena of live codecs and the protocol-id dispatch array.
//!
//! Slots are `u8` handles. Slot 0 is reserved: it aliases the default codec,
//! which also occupies a regular slot. The dispatch array covers the whole
//! `ProtocolId` range and stores the claiming slot, so resolving the next
//! layer is a single index.

use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroU8;

use plugin_core::{Codec, CodecApi, CodecDtor, LinkType, ProtocolId, MAX_PROTOCOL_ID};
use tracing::debug;

use crate::error::ConfigError;

/// Live codecs fit in slots `1..=MAX_CODECS`.
pub const MAX_CODECS: usize = u8::MAX as usize;

/// Handle to a live codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(u8);

impl Slot {
    /// The default codec.
    pub const DEFAULT: Slot = Slot(0);

    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) struct Instance {
    pub codec: Box<dyn Codec>,
    pub dtor: CodecDtor,
    pub api: &'static CodecApi,
    pub protocol_ids: Vec<ProtocolId>,
    pub link_types: Vec<LinkType>,
}

pub(crate) struct DispatchTable {
    // Index 0 stays empty; the default alias is resolved by `get`.
    instances: Vec<Option<Instance>>,
    proto_map: Box<[Option<NonZeroU8>]>,
    default_slot: Option<Slot>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self {
            instances: vec![None],
            proto_map: vec![None; MAX_PROTOCOL_ID].into_boxed_slice(),
            default_slot: None,
        }
    }

    /// Builds a codec from `api` into the next free slot and claims its
    /// protocol ids. Nothing is claimed when an error is returned.
    pub fn insert(&mut self, api: &'static CodecApi) -> Result<Slot, ConfigError> {
        let plugin = || api.base.name.to_string();
        let ctor = api.ctor.ok_or_else(|| ConfigError::MissingHook {
            plugin: plugin(),
            hook: "ctor",
        })?;
        let dtor = api.dtor.ok_or_else(|| ConfigError::MissingHook {
            plugin: plugin(),
            hook: "dtor",
        })?;

        let codec = ctor();
        let protocol_ids = codec.protocol_ids();
        // A codec listing an id twice collides with itself.
        let mut listed = HashSet::new();
        let clash = protocol_ids.iter().find_map(|&id| match self.claimant(id) {
            Some(slot) => Some((id, self.name(slot))),
            None => (!listed.insert(id)).then(|| (id, codec.name())),
        });
        if let Some((id, existing)) = clash {
            let existing = existing.to_string();
            let conflicting = codec.name().to_string();
            dtor(codec);
            return Err(ConfigError::DuplicateProtocolId {
                id,
                existing,
                conflicting,
            });
        }

        let index = self.instances.len();
        let raw = match u8::try_from(index).ok().and_then(NonZeroU8::new) {
            Some(raw) => raw,
            None => {
                dtor(codec);
                return Err(ConfigError::CapacityExceeded { max: MAX_CODECS });
            }
        };
        for &id in &protocol_ids {
            self.proto_map[usize::from(id)] = Some(raw);
        }
        let link_types = codec.data_link_types();
        debug!(
            stage = "instantiate",
            codec = codec.name(),
            slot = index,
            protocol_ids = ?protocol_ids,
            link_types = ?link_types
        );
        self.instances.push(Some(Instance {
            codec,
            dtor,
            api,
            protocol_ids,
            link_types,
        }));
        Ok(Slot(raw.get()))
    }

    pub fn is_full(&self) -> bool {
        self.instances.len() > MAX_CODECS
    }

    pub fn set_default(&mut self, slot: Slot) {
        self.default_slot = Some(slot);
    }

    #[inline]
    pub fn claimant(&self, id: ProtocolId) -> Option<Slot> {
        self.proto_map[usize::from(id)].map(|s| Slot(s.get()))
    }

    fn resolve(&self, slot: Slot) -> Option<Slot> {
        if slot == Slot::DEFAULT {
            self.default_slot
        } else {
            Some(slot)
        }
    }

    #[inline]
    pub fn get(&self, slot: Slot) -> Option<&Instance> {
        let slot = self.resolve(slot)?;
        self.instances.get(slot.index())?.as_ref()
    }

    fn name(&self, slot: Slot) -> &str {
        self.get(slot).map_or("?", |i| i.codec.name())
    }

    /// Live instances in slot order, excluding the slot 0 alias.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &Instance)> + '_ {
        self.instances
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(i, inst)| inst.as_ref().map(|inst| (Slot(i as u8), inst)))
    }

    /// Removes the instance in `slot` without running its destructor.
    pub fn take(&mut self, slot: Slot) -> Option<Instance> {
        if slot == Slot::DEFAULT {
            return None;
        }
        self.instances.get_mut(slot.index())?.take()
    }

    /// Empties every slot and unclaims every protocol id.
    pub fn clear(&mut self) {
        self.instances.truncate(1);
        self.proto_map.fill(None);
        self.default_slot = None;
    }

    pub fn len(&self) -> usize {
        self.instances.iter().flatten().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugin_core::{BaseApi, CodecData};

    struct Claims(&'static str, Vec<ProtocolId>);

    impl Codec for Claims {
        fn name(&self) -> &str {
            self.0
        }

        fn protocol_ids(&self) -> Vec<ProtocolId> {
            self.1.clone()
        }

        fn decode(&self, _raw: &[u8], _data: &mut CodecData) -> bool {
            false
        }
    }

    fn drop_codec(_cd: Box<dyn Codec>) {}

    fn new_arp() -> Box<dyn Codec> {
        Box::new(Claims("arp", vec![0x0806]))
    }

    fn new_rarp() -> Box<dyn Codec> {
        Box::new(Claims("rarp", vec![0x8035, 0x0806]))
    }

    fn new_twice() -> Box<dyn Codec> {
        Box::new(Claims("twice", vec![0x88cc, 0x88b5, 0x88cc]))
    }

    static ARP: CodecApi = CodecApi {
        base: BaseApi::codec("arp", "", 1),
        pinit: None,
        pterm: None,
        tinit: None,
        tterm: None,
        ctor: Some(new_arp),
        dtor: Some(drop_codec),
    };

    static RARP: CodecApi = CodecApi {
        base: BaseApi::codec("rarp", "", 1),
        pinit: None,
        pterm: None,
        tinit: None,
        tterm: None,
        ctor: Some(new_rarp),
        dtor: Some(drop_codec),
    };

    #[test]
    fn failed_claim_leaves_table_untouched() {
        let mut table = DispatchTable::new();
        let arp = table.insert(&ARP).unwrap();
        assert_eq!(arp, Slot(1));

        let err = table.insert(&RARP).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateProtocolId {
                id: 0x0806,
                existing: "arp".into(),
                conflicting: "rarp".into(),
            }
        );
        assert_eq!(table.claimant(0x8035), None);
        assert_eq!(table.len(), 1);
    }

    static TWICE: CodecApi = CodecApi {
        base: BaseApi::codec("twice", "", 1),
        pinit: None,
        pterm: None,
        tinit: None,
        tterm: None,
        ctor: Some(new_twice),
        dtor: Some(drop_codec),
    };

    #[test]
    fn repeated_id_in_one_codec_is_rejected() {
        let mut table = DispatchTable::new();
        let err = table.insert(&TWICE).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateProtocolId {
                id: 0x88cc,
                existing: "twice".into(),
                conflicting: "twice".into(),
            }
        );
        assert_eq!(table.claimant(0x88b5), None);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn slot_zero_follows_default() {
        let mut table = DispatchTable::new();
        assert!(table.get(Slot::DEFAULT).is_none());
        let slot = table.insert(&ARP).unwrap();
        table.set_default(slot);
        assert_eq!(table.get(Slot::DEFAULT).unwrap().codec.name(), "arp");
        assert!(table.take(Slot::DEFAULT).is_none());
        assert_eq!(table.iter().count(), 1);
    }

    #[test]
    fn clear_unclaims_everything() {
        let mut table = DispatchTable::new();
        table.insert(&ARP).unwrap();
        table.clear();
        assert_eq!(table.claimant(0x0806), None);
        assert_eq!(table.len(), 0);
        assert_eq!(table.insert(&RARP).unwrap(), Slot(1));
    }
}
