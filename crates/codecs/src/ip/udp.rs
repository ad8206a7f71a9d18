use plugin_core::codec::ids::IPPROTO_UDP;
use plugin_core::{BaseApi, Codec, CodecApi, CodecData, ProtocolId};

const NAME: &str = "udp";
const HELP: &str = "support for user datagram protocol";

const UDP_HLEN: usize = 8;

struct UdpCodec;

impl Codec for UdpCodec {
    fn name(&self) -> &str {
        NAME
    }

    fn protocol_ids(&self) -> Vec<ProtocolId> {
        vec![IPPROTO_UDP]
    }

    fn decode(&self, raw: &[u8], data: &mut CodecData) -> bool {
        if raw.len() < UDP_HLEN {
            return false;
        }
        let len = usize::from(u16::from_be_bytes([raw[4], raw[5]]));
        // Zero is allowed for jumbograms.
        if len != 0 && len < UDP_HLEN {
            return false;
        }
        data.lyr_len = UDP_HLEN;
        data.next_prot_id = None;
        true
    }
}

fn ctor() -> Box<dyn Codec> {
    Box::new(UdpCodec)
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
