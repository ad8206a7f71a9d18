//! Codecs that can start a decode: link-layer framings.

pub mod eth;
pub mod null;
