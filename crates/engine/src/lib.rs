//! Codec dispatch and plugin orchestration for Vigil.
//!
//! [`PluginManager`] brings plugins up from a [`plugin_core::PluginRegistry`]
//! and tears them down again. [`CodecManager`] owns the live codecs and the
//! protocol dispatch table; workers reach it through a [`CodecThread`].

pub mod codec;
pub mod error;
pub mod lanes;
pub mod plugin;

pub use codec::{
    CodecInfo, CodecManager, CodecThread, DecodeStats, Decoded, Layer, Slot, StopReason,
    IP_ID_COUNT, MAX_CODECS,
};
pub use error::ConfigError;
pub use lanes::{run_lanes, LaneConfig};
pub use plugin::{ExtensionManager, KindManager, PluginManager};
