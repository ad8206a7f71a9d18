//! Fallback codec held in slot 0. It claims nothing and decodes nothing.

use plugin_core::{BaseApi, Codec, CodecApi, CodecData};

const NAME: &str = "unknown";
const HELP: &str = "default codec for unrecognized protocols";

struct DefaultCodec;

impl Codec for DefaultCodec {
    fn name(&self) -> &str {
        NAME
    }

    fn decode(&self, _raw: &[u8], _data: &mut CodecData) -> bool {
        false
    }
}

fn ctor() -> Box<dyn Codec> {
    Box::new(DefaultCodec)
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
