//! Codecs compiled into the host.
//!
//! Each codec only decodes its header length and the protocol it carries;
//! deeper inspection happens further up the pipeline.

use plugin_core::{Api, CodecApi};

pub mod ip;
pub mod link;
pub mod misc;
pub mod root;

/// Codec used for slot 0. Not part of [`BUILTIN_CODECS`]; the codec manager
/// instantiates it directly.
pub static DEFAULT_CODEC: &CodecApi = &misc::default::API;

/// Built-in codec descriptors, in registration order.
pub static BUILTIN_CODECS: &[Api] = &[
    Api::Codec(&root::null::API),
    Api::Codec(&root::eth::API),
    Api::Codec(&link::vlan::API),
    Api::Codec(&ip::ipv4::API),
    Api::Codec(&ip::ipv6::API),
    Api::Codec(&ip::tcp::API),
    Api::Codec(&ip::udp::API),
    Api::Codec(&ip::icmp4::API),
];
