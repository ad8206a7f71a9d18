use plugin_core::codec::ids::IPPROTO_TCP;
use plugin_core::{BaseApi, Codec, CodecApi, CodecData, ProtocolId};

const NAME: &str = "tcp";
const HELP: &str = "support for transmission control protocol";

const TCP_HLEN_MIN: usize = 20;

struct TcpCodec;

impl Codec for TcpCodec {
    fn name(&self) -> &str {
        NAME
    }

    fn protocol_ids(&self) -> Vec<ProtocolId> {
        vec![IPPROTO_TCP]
    }

    fn decode(&self, raw: &[u8], data: &mut CodecData) -> bool {
        if raw.len() < TCP_HLEN_MIN {
            return false;
        }
        let hlen = usize::from(raw[12] >> 4) * 4;
        if hlen < TCP_HLEN_MIN || hlen > raw.len() {
            return false;
        }
        data.lyr_len = hlen;
        data.next_prot_id = None;
        true
    }
}

fn ctor() -> Box<dyn Codec> {
    Box::new(TcpCodec)
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
