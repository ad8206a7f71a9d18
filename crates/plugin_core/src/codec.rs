//! The decoder interface codec plugins implement.

/// Numeric protocol identifier: an EtherType or an IP protocol number.
/// Both live in the same space.
pub type ProtocolId = u16;

/// Link-layer type as reported by the capture layer (a DLT value).
pub type LinkType = i32;

/// Number of distinct protocol identifiers.
pub const MAX_PROTOCOL_ID: usize = 1 << 16;

/// Default bound on nested decode depth.
pub const DEFAULT_LAYER_MAX: u8 = 40;

/// Result of decoding one layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecData {
    /// Bytes consumed by this layer's header.
    pub lyr_len: usize,
    /// Protocol carried by the remaining bytes, or `None` when decoding
    /// ends here.
    pub next_prot_id: Option<ProtocolId>,
}

/// A decoder for one protocol layer.
///
/// Instances are built once per process by their descriptor's constructor
/// and shared read-only by every worker thread.
pub trait Codec: Send + Sync {
    /// Name used in diagnostics and by name-based lookup.
    fn name(&self) -> &str;

    /// Protocol identifiers this codec decodes.
    fn protocol_ids(&self) -> Vec<ProtocolId> {
        Vec::new()
    }

    /// Link-layer types for which this codec can decode raw frames.
    fn data_link_types(&self) -> Vec<LinkType> {
        Vec::new()
    }

    /// Decodes the header at the start of `raw`. Returns `false` when the
    /// bytes are not a valid instance of this protocol.
    fn decode(&self, raw: &[u8], data: &mut CodecData) -> bool;
}

/// Well-known protocol identifiers and link types.
pub mod ids {
    use super::{LinkType, ProtocolId};

    pub const IPPROTO_ICMP: ProtocolId = 1;
    pub const IPPROTO_TCP: ProtocolId = 6;
    pub const IPPROTO_UDP: ProtocolId = 17;
    pub const IPPROTO_ICMPV6: ProtocolId = 58;

    pub const ETHERTYPE_IPV4: ProtocolId = 0x0800;
    pub const ETHERTYPE_ARP: ProtocolId = 0x0806;
    pub const ETHERTYPE_8021Q: ProtocolId = 0x8100;
    pub const ETHERTYPE_IPV6: ProtocolId = 0x86DD;

    pub const DLT_NULL: LinkType = 0;
    pub const DLT_EN10MB: LinkType = 1;
    pub const DLT_RAW: LinkType = 12;
}
