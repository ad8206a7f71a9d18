//! Network and transport layer codecs.

pub mod icmp4;
pub mod ipv4;
pub mod ipv6;
pub mod tcp;
pub mod udp;
