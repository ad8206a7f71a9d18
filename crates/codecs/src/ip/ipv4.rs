use plugin_core::codec::ids::ETHERTYPE_IPV4;
use plugin_core::{BaseApi, Codec, CodecApi, CodecData, ProtocolId};

const NAME: &str = "ipv4";
const HELP: &str = "support for Internet protocol v4";

const IP4_HLEN_MIN: usize = 20;
const IP4_OFFMASK: u16 = 0x1fff;

struct Ipv4Codec;

impl Codec for Ipv4Codec {
    fn name(&self) -> &str {
        NAME
    }

    fn protocol_ids(&self) -> Vec<ProtocolId> {
        vec![ETHERTYPE_IPV4]
    }

    fn decode(&self, raw: &[u8], data: &mut CodecData) -> bool {
        if raw.len() < IP4_HLEN_MIN || raw[0] >> 4 != 4 {
            return false;
        }
        let hlen = usize::from(raw[0] & 0x0f) * 4;
        if hlen < IP4_HLEN_MIN || hlen > raw.len() {
            return false;
        }
        let total = usize::from(u16::from_be_bytes([raw[2], raw[3]]));
        if total < hlen {
            return false;
        }
        let frag_off = u16::from_be_bytes([raw[6], raw[7]]) & IP4_OFFMASK;

        data.lyr_len = hlen;
        // Only the first fragment carries the next header.
        data.next_prot_id = (frag_off == 0).then_some(ProtocolId::from(raw[9]));
        true
    }
}

fn ctor() -> Box<dyn Codec> {
    Box::new(Ipv4Codec)
}

fn dtor(_cd: Box<dyn Codec>) {}

pub static API: CodecApi = CodecApi {
    base: BaseApi::codec(NAME, HELP, 1),
    pinit: None,
    pterm: None,
    tinit: None,
    tterm: None,
    ctor: Some(ctor),
    dtor: Some(dtor),
};
