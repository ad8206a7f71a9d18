//! Plugin types and the ABI each one is expected to carry.

use std::fmt;
use std::mem::size_of;

use serde::Serialize;

use crate::api::{CodecApi, ExtensionApi};

/// Base version shared by every plugin API. The low 16 bits carry the
/// per-type revision.
pub const BASE_API_VERSION: u32 = 1 << 16;

pub const CODEC_API_VERSION: u32 = BASE_API_VERSION;
pub const INSPECT_API_VERSION: u32 = BASE_API_VERSION;
pub const ACTION_API_VERSION: u32 = BASE_API_VERSION;
pub const IPS_API_VERSION: u32 = BASE_API_VERSION;
pub const SEARCH_API_VERSION: u32 = BASE_API_VERSION;
pub const SO_API_VERSION: u32 = BASE_API_VERSION;
pub const LOG_API_VERSION: u32 = BASE_API_VERSION;

/// Extension point a descriptor plugs into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum PlugType {
    Codec = 0,
    Inspector = 1,
    IpsAction = 2,
    IpsOption = 3,
    SearchEngine = 4,
    SoRule = 5,
    Logger = 6,
}

/// What the host expects from descriptors of one plugin type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub name: &'static str,
    pub version: u32,
    pub size: u32,
}

// Order must follow the `PlugType` discriminants.
static SYMBOLS: [Symbol; PlugType::COUNT] = [
    Symbol {
        name: "codec",
        version: CODEC_API_VERSION,
        size: size_of::<CodecApi>() as u32,
    },
    Symbol {
        name: "inspector",
        version: INSPECT_API_VERSION,
        size: size_of::<ExtensionApi>() as u32,
    },
    Symbol {
        name: "ips_action",
        version: ACTION_API_VERSION,
        size: size_of::<ExtensionApi>() as u32,
    },
    Symbol {
        name: "ips_option",
        version: IPS_API_VERSION,
        size: size_of::<ExtensionApi>() as u32,
    },
    Symbol {
        name: "search_engine",
        version: SEARCH_API_VERSION,
        size: size_of::<ExtensionApi>() as u32,
    },
    Symbol {
        name: "so_rule",
        version: SO_API_VERSION,
        size: size_of::<ExtensionApi>() as u32,
    },
    Symbol {
        name: "logger",
        version: LOG_API_VERSION,
        size: size_of::<ExtensionApi>() as u32,
    },
];

impl PlugType {
    pub const COUNT: usize = 7;

    pub const ALL: [PlugType; PlugType::COUNT] = [
        PlugType::Codec,
        PlugType::Inspector,
        PlugType::IpsAction,
        PlugType::IpsOption,
        PlugType::SearchEngine,
        PlugType::SoRule,
        PlugType::Logger,
    ];

    /// Host expectations for this type.
    pub fn symbol(self) -> &'static Symbol {
        &SYMBOLS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.symbol().name
    }

    /// Reverse of [`PlugType::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl TryFrom<u32> for PlugType {
    type Error = u32;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Self::ALL.get(raw as usize).copied().ok_or(raw)
    }
}

impl fmt::Display for PlugType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
