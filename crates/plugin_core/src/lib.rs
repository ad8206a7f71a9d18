//! Shared primitives for building and hosting Vigil plugins.
//!
//! Loading plugins is a three step process:
//!
//! 1. Loaders discover candidate descriptors, built-in or exported by shared
//!    libraries.
//! 2. [`PluginRegistry`] validates every candidate against the host ABI and
//!    keeps only the latest version of each.
//! 3. Type-specific managers turn the surviving descriptors into live
//!    instances.

pub mod api;
pub mod codec;
pub mod kind;
pub mod registry;

pub use api::{Api, BaseApi, CodecApi, CodecCtor, CodecDtor, ExtensionApi, LifecycleFn};
pub use codec::{Codec, CodecData, LinkType, ProtocolId, DEFAULT_LAYER_MAX, MAX_PROTOCOL_ID};
pub use kind::{PlugType, Symbol};
pub use registry::{
    LibraryHandle, Lifecycle, Origin, PluginListing, PluginRegistry, Registered, RejectReason,
};

/// Build-options fingerprint of this host: crate version, compiler and
/// target. Descriptors use the default Rust layout, so only a plugin built
/// with the same toolchain can be read safely. Descriptors must carry the
/// same value to be accepted.
pub const API_OPTIONS: Option<&str> = Some(concat!(
    "vigil-api-",
    env!("CARGO_PKG_VERSION"),
    "/",
    env!("VIGIL_RUSTC_VERSION"),
    "/",
    env!("VIGIL_TARGET")
));
