use plugin_core::codec::ids::ETHERTYPE_IPV6;
use plugin_core::{BaseApi, Codec, CodecApi, CodecData, ProtocolId};

const NAME: &str = "ipv6";
const HELP: &str = "support for Internet protocol v6";

const IP6_HLEN: usize = 40;

struct Ipv6Codec;

impl Codec for Ipv6Codec {
    fn name(&self) -> &str {
        NAME
    }

    fn protocol_ids(&self) -> Vec<ProtocolId> {
        vec![ETHERTYPE_IPV6]
    }

    fn decode(&self, raw: &[u8], data: &mut CodecData) -> bool {
        if raw.len() < IP6_HLEN || raw[0] >> 4 != 6 {
            return false;
        }
        data.lyr_len = IP6_HLEN;
        data.next_prot_id = Some(ProtocolId::from(raw[6]));
        true
    }
}

fn ctor() -> Box<dyn Codec> {
    Box::new(Ipv6Codec)
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
