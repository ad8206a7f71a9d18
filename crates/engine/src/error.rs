use plugin_core::{LinkType, ProtocolId};
use thiserror::Error;

/// Static misconfiguration found while bringing plugins up. Startup cannot
/// continue past any of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error(
        "the codecs {existing} and {conflicting} have both been registered for protocol_id {id:#06x}"
    )]
    DuplicateProtocolId {
        id: ProtocolId,
        existing: String,
        conflicting: String,
    },
    #[error("a maximum of {max} codecs can be registered")]
    CapacityExceeded { max: usize },
    #[error("unable to find a codec with data link type {link_type}")]
    NoGrinder { link_type: LinkType },
    #[error("{plugin}: {hook}() must be implemented")]
    MissingHook { plugin: String, hook: &'static str },
    #[error("attempting to instantiate {plugin}, but it has not been added")]
    NotRegistered { plugin: String },
    #[error("unable to start worker lanes: {0}")]
    WorkerPool(String),
}
