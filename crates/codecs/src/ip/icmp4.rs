use plugin_core::codec::ids::IPPROTO_ICMP;
use plugin_core::{BaseApi, Codec, CodecApi, CodecData, ProtocolId};

const NAME: &str = "icmp4";
const HELP: &str = "support for Internet control message protocol v4";

const ICMP_HLEN: usize = 8;

struct Icmp4Codec;

impl Codec for Icmp4Codec {
    fn name(&self) -> &str {
        NAME
    }

    fn protocol_ids(&self) -> Vec<ProtocolId> {
        vec![IPPROTO_ICMP]
    }

    fn decode(&self, raw: &[u8], data: &mut CodecData) -> bool {
        if raw.len() < ICMP_HLEN {
            return false;
        }
        data.lyr_len = ICMP_HLEN;
        data.next_prot_id = None;
        true
    }
}

fn ctor() -> Box<dyn Codec> {
    Box::new(Icmp4Codec)
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
