use plugin_core::codec::ids::DLT_EN10MB;
use plugin_core::{BaseApi, Codec, CodecApi, CodecData, LinkType};

const NAME: &str = "eth";
const HELP: &str = "support for ethernet II framing (DLT 1)";

const ETH_HLEN: usize = 14;
/// Values below this are 802.3 length fields, not EtherTypes.
const ETHERTYPE_MIN: u16 = 0x0600;

struct EthCodec;

impl Codec for EthCodec {
    fn name(&self) -> &str {
        NAME
    }

    fn data_link_types(&self) -> Vec<LinkType> {
        vec![DLT_EN10MB]
    }

    fn decode(&self, raw: &[u8], data: &mut CodecData) -> bool {
        if raw.len() < ETH_HLEN {
            return false;
        }
        let ether_type = u16::from_be_bytes([raw[12], raw[13]]);
        data.lyr_len = ETH_HLEN;
        data.next_prot_id = (ether_type >= ETHERTYPE_MIN).then_some(ether_type);
        true
    }
}

fn ctor() -> Box<dyn Codec> {
    Box::new(EthCodec)
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
