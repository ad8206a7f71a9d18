use plugin_core::codec::ids::ETHERTYPE_8021Q;
use plugin_core::{BaseApi, Codec, CodecApi, CodecData, ProtocolId};

const NAME: &str = "vlan";
const HELP: &str = "support for 802.1Q tagged frames";

const VLAN_HLEN: usize = 4;

struct VlanCodec;

impl Codec for VlanCodec {
    fn name(&self) -> &str {
        NAME
    }

    fn protocol_ids(&self) -> Vec<ProtocolId> {
        vec![ETHERTYPE_8021Q]
    }

    fn decode(&self, raw: &[u8], data: &mut CodecData) -> bool {
        if raw.len() < VLAN_HLEN {
            return false;
        }
        data.lyr_len = VLAN_HLEN;
        data.next_prot_id = Some(u16::from_be_bytes([raw[2], raw[3]]));
        true
    }
}

fn ctor() -> Box<dyn Codec> {
    Box::new(VlanCodec)
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
