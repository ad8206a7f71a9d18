use plugin_core::codec::ids::{DLT_NULL, ETHERTYPE_IPV4};
use plugin_core::{BaseApi, Codec, CodecApi, CodecData, LinkType};

const NAME: &str = "null";
const HELP: &str = "support for null encapsulation (DLT 0)";

const NULL_HDRLEN: usize = 4;

struct NullCodec;

impl Codec for NullCodec {
    fn name(&self) -> &str {
        NAME
    }

    fn data_link_types(&self) -> Vec<LinkType> {
        vec![DLT_NULL]
    }

    fn decode(&self, raw: &[u8], data: &mut CodecData) -> bool {
        if raw.len() < NULL_HDRLEN {
            return false;
        }
        data.lyr_len = NULL_HDRLEN;
        data.next_prot_id = Some(ETHERTYPE_IPV4);
        true
    }
}

fn ctor() -> Box<dyn Codec> {
    Box::new(NullCodec)
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
