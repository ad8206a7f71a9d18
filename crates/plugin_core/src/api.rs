//! Capability descriptors.
//!
//! A descriptor is the immutable record a plugin author hands to the host.
//! Built-in descriptors live in `static` items; descriptors exported by a
//! shared library stay valid for as long as the library handle backing
//! their registry entry is open.

use std::mem::size_of;

use crate::codec::Codec;
use crate::kind::{PlugType, CODEC_API_VERSION};
use crate::API_OPTIONS;

/// Hook run once per process or once per worker thread.
pub type LifecycleFn = fn();

/// Builds a live codec instance.
pub type CodecCtor = fn() -> Box<dyn Codec>;

/// Destroys a codec instance built by the matching [`CodecCtor`].
pub type CodecDtor = fn(Box<dyn Codec>);

/// Fields shared by every descriptor, checked against the host's ABI
/// expectations before the descriptor is accepted.
#[derive(Debug, Clone, Copy)]
pub struct BaseApi {
    /// Raw [`PlugType`] discriminant. Kept raw because dynamically loaded
    /// descriptors may carry values this host does not know.
    pub plug_type: u32,
    /// Size of the full descriptor struct the author compiled against.
    pub size: u32,
    pub api_version: u32,
    /// Plugin revision; the higher one wins when two share a name.
    pub version: u32,
    /// Build-options fingerprint. Must equal the host's [`API_OPTIONS`].
    pub options: Option<&'static str>,
    pub name: &'static str,
    pub help: &'static str,
}

impl BaseApi {
    /// Header for a codec built against this host.
    pub const fn codec(name: &'static str, help: &'static str, version: u32) -> Self {
        Self {
            plug_type: PlugType::Codec as u32,
            size: size_of::<CodecApi>() as u32,
            api_version: CODEC_API_VERSION,
            version,
            options: API_OPTIONS,
            name,
            help,
        }
    }

    /// Header for any non-codec plugin type built against this host.
    pub const fn extension(
        plug_type: PlugType,
        name: &'static str,
        help: &'static str,
        version: u32,
    ) -> Self {
        Self {
            plug_type: plug_type as u32,
            size: size_of::<ExtensionApi>() as u32,
            api_version: crate::kind::BASE_API_VERSION,
            version,
            options: API_OPTIONS,
            name,
            help,
        }
    }
}

/// Descriptor for a protocol decoder.
#[derive(Debug, Clone, Copy)]
pub struct CodecApi {
    pub base: BaseApi,
    pub pinit: Option<LifecycleFn>,
    pub pterm: Option<LifecycleFn>,
    pub tinit: Option<LifecycleFn>,
    pub tterm: Option<LifecycleFn>,
    /// Mandatory.
    pub ctor: Option<CodecCtor>,
    /// Mandatory.
    pub dtor: Option<CodecDtor>,
}

/// Descriptor shape for inspectors, actions, options, search engines,
/// shared-object rules and loggers.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionApi {
    pub base: BaseApi,
    pub pinit: Option<LifecycleFn>,
    pub pterm: Option<LifecycleFn>,
    pub tinit: Option<LifecycleFn>,
    pub tterm: Option<LifecycleFn>,
}

/// A descriptor of any plugin type.
#[derive(Debug, Clone, Copy)]
pub enum Api {
    Codec(&'static CodecApi),
    Extension(&'static ExtensionApi),
}

impl Api {
    pub fn base(&self) -> &'static BaseApi {
        match self {
            Api::Codec(api) => &api.base,
            Api::Extension(api) => &api.base,
        }
    }

    pub fn name(&self) -> &'static str {
        self.base().name
    }

    pub fn version(&self) -> u32 {
        self.base().version
    }

    /// Plugin type declared in the header, if the host knows it.
    pub fn plug_type(&self) -> Option<PlugType> {
        PlugType::try_from(self.base().plug_type).ok()
    }

    /// Size of the descriptor struct behind this variant.
    pub(crate) fn layout_size(&self) -> u32 {
        match self {
            Api::Codec(_) => size_of::<CodecApi>() as u32,
            Api::Extension(_) => size_of::<ExtensionApi>() as u32,
        }
    }

    pub fn pinit(&self) -> Option<LifecycleFn> {
        match self {
            Api::Codec(api) => api.pinit,
            Api::Extension(api) => api.pinit,
        }
    }

    pub fn pterm(&self) -> Option<LifecycleFn> {
        match self {
            Api::Codec(api) => api.pterm,
            Api::Extension(api) => api.pterm,
        }
    }

    pub fn tinit(&self) -> Option<LifecycleFn> {
        match self {
            Api::Codec(api) => api.tinit,
            Api::Extension(api) => api.tinit,
        }
    }

    pub fn tterm(&self) -> Option<LifecycleFn> {
        match self {
            Api::Codec(api) => api.tterm,
            Api::Extension(api) => api.tterm,
        }
    }

    pub fn as_codec(&self) -> Option<&'static CodecApi> {
        match self {
            Api::Codec(api) => Some(api),
            Api::Extension(_) => None,
        }
    }
}

/// Name of the symbol a shared library exports its descriptor list under.
pub const PLUGIN_SYMBOL: &[u8] = b"vigil_plugins";

/// Exports a descriptor list from a plugin shared library.
///
/// ```ignore
/// plugin_core::export_plugins![Api::Codec(&MY_CODEC)];
/// ```
#[macro_export]
macro_rules! export_plugins {
    ($($api:expr),* $(,)?) => {
        #[no_mangle]
        #[allow(non_upper_case_globals)]
        pub static vigil_plugins: &[$crate::Api] = &[$($api),*];
    };
}
