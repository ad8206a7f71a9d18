use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use plugin_core::{
    Api, BaseApi, Codec, CodecApi, CodecData, ExtensionApi, LibraryHandle, Origin, PlugType,
    PluginRegistry, RejectReason,
};

struct Nop;

impl Codec for Nop {
    fn name(&self) -> &str {
        "nop"
    }

    fn decode(&self, _raw: &[u8], _data: &mut CodecData) -> bool {
        false
    }
}

fn ctor() -> Box<dyn Codec> {
    Box::new(Nop)
}

fn dtor(_cd: Box<dyn Codec>) {}

const fn codec(base: BaseApi) -> CodecApi {
    CodecApi {
        base,
        pinit: None,
        pterm: None,
        tinit: None,
        tterm: None,
        ctor: Some(ctor),
        dtor: Some(dtor),
    }
}

fn leak(api: CodecApi) -> Api {
    Api::Codec(Box::leak(Box::new(api)))
}

fn with_version(name: &'static str, version: u32) -> Api {
    leak(codec(BaseApi::codec(name, "test codec", version)))
}

#[derive(Debug)]
struct FakeLib {
    path: PathBuf,
    closed: Arc<AtomicBool>,
}

impl LibraryHandle for FakeLib {
    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FakeLib {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

fn fake_lib(path: &str) -> (Origin, Arc<AtomicBool>) {
    let closed = Arc::new(AtomicBool::new(false));
    let lib = FakeLib {
        path: PathBuf::from(path),
        closed: closed.clone(),
    };
    (Origin::Library(Arc::new(lib)), closed)
}

#[test]
fn size_mismatch_is_rejected() {
    let mut base = BaseApi::codec("eth", "", 1);
    base.size += 8;
    let api = leak(codec(base));

    let mut registry = PluginRegistry::new();
    assert!(!registry.register(api, Origin::Static));
    assert!(registry.is_empty());
    assert!(matches!(
        registry.check(&api),
        Err(RejectReason::SizeMismatch { expected, actual, .. }) if actual == expected + 8
    ));
}

#[test]
fn abi_version_mismatch_is_rejected() {
    let mut base = BaseApi::codec("eth", "", 1);
    base.api_version += 1;
    let api = leak(codec(base));

    let mut registry = PluginRegistry::new();
    assert!(registry.register(with_version("ip4", 1), Origin::Static));
    assert!(!registry.register(api, Origin::Static));
    assert_eq!(registry.len(), 1);
    assert!(matches!(
        registry.check(&api),
        Err(RejectReason::VersionMismatch { .. })
    ));
}

#[test]
fn unknown_type_is_rejected() {
    let mut base = BaseApi::codec("eth", "", 1);
    base.plug_type = 42;
    let api = leak(codec(base));

    let mut registry = PluginRegistry::new();
    assert!(!registry.register(api, Origin::Static));
    assert_eq!(
        registry.check(&api),
        Err(RejectReason::UnknownType {
            plugin: "eth".into(),
            plug_type: 42
        })
    );
}

#[test]
fn codec_header_on_extension_layout_is_rejected() {
    let api: &'static ExtensionApi = Box::leak(Box::new(ExtensionApi {
        base: BaseApi::codec("eth", "", 1),
        pinit: None,
        pterm: None,
        tinit: None,
        tterm: None,
    }));
    let registry = PluginRegistry::new();
    assert!(matches!(
        registry.check(&Api::Extension(api)),
        Err(RejectReason::SizeMismatch { .. })
    ));
}

#[test]
fn build_fingerprint_must_match() {
    let mut base = BaseApi::codec("eth", "", 1);
    base.options = Some("other-build");
    let foreign = leak(codec(base));
    base.options = None;
    let bare = leak(codec(base));

    let mut registry = PluginRegistry::new();
    assert!(!registry.register(foreign, Origin::Static));
    assert!(!registry.register(bare, Origin::Static));

    let mut unversioned = PluginRegistry::with_build_options(None);
    assert!(unversioned.register(bare, Origin::Static));
    assert!(!unversioned.register(foreign, Origin::Static));
}

#[test]
fn higher_version_wins_in_either_order() {
    let old = with_version("eth", 1);
    let new = with_version("eth", 2);

    let mut forward = PluginRegistry::new();
    assert!(forward.register(old, Origin::Static));
    assert!(forward.register(new, Origin::Static));
    assert_eq!(forward.resolve(PlugType::Codec, "eth").unwrap().version(), 2);

    let mut backward = PluginRegistry::new();
    assert!(backward.register(new, Origin::Static));
    assert!(!backward.register(old, Origin::Static));
    assert_eq!(backward.resolve(PlugType::Codec, "eth").unwrap().version(), 2);
    assert_eq!(backward.len(), 1);
}

#[test]
fn equal_version_keeps_incumbent() {
    let first = with_version("eth", 3);
    let second = with_version("eth", 3);

    let mut registry = PluginRegistry::new();
    assert!(registry.register(first, Origin::Static));
    assert!(!registry.register(second, Origin::Static));
    let kept = registry.resolve(PlugType::Codec, "eth").unwrap();
    assert!(std::ptr::eq(kept.base(), first.base()));
}

#[test]
fn same_name_under_different_types_does_not_collide() {
    static LOG: ExtensionApi = ExtensionApi {
        base: BaseApi::extension(PlugType::Logger, "eth", "", 1),
        pinit: None,
        pterm: None,
        tinit: None,
        tterm: None,
    };
    let mut registry = PluginRegistry::new();
    assert!(registry.register(with_version("eth", 1), Origin::Static));
    assert!(registry.register(Api::Extension(&LOG), Origin::Static));
    assert_eq!(registry.len(), 2);
    assert!(registry.resolve(PlugType::Logger, "eth").is_some());
    assert!(registry.resolve(PlugType::Inspector, "eth").is_none());
}

#[test]
fn superseded_library_is_closed_when_unreferenced() {
    let (lib_a, closed_a) = fake_lib("/plugins/a.so");
    let (lib_b, closed_b) = fake_lib("/plugins/b.so");

    let mut registry = PluginRegistry::new();
    assert!(registry.register(with_version("eth", 1), lib_a.clone()));
    assert!(registry.register(with_version("vlan", 1), lib_a.clone()));
    drop(lib_a);
    assert_eq!(registry.library_refs(Path::new("/plugins/a.so")), 2);

    assert!(registry.register(with_version("eth", 2), lib_b.clone()));
    drop(lib_b);
    assert_eq!(registry.library_refs(Path::new("/plugins/a.so")), 1);
    assert!(!closed_a.load(Ordering::SeqCst));

    assert!(registry.register(with_version("vlan", 2), Origin::Static));
    assert_eq!(registry.library_refs(Path::new("/plugins/a.so")), 0);
    assert!(closed_a.load(Ordering::SeqCst));
    assert!(!closed_b.load(Ordering::SeqCst));

    registry.teardown();
    assert!(closed_b.load(Ordering::SeqCst));
    assert_eq!(registry.open_libraries(), 0);
}

#[test]
fn listing_reports_key_version_and_source() {
    let (lib, _closed) = fake_lib("/plugins/vlan.so");
    let mut registry = PluginRegistry::new();
    registry.register(with_version("vlan", 4), lib);
    registry.register(with_version("eth", 1), Origin::Static);

    let listing = registry.list();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].key, "codec::eth");
    assert_eq!(listing[0].source, "static");
    assert_eq!(listing[1].key, "codec::vlan");
    assert_eq!(listing[1].version, 4);
    assert_eq!(listing[1].source, "/plugins/vlan.so");

    let json = serde_json::to_value(&listing[1]).unwrap();
    assert_eq!(json["key"], "codec::vlan");
}

#[test]
fn iteration_follows_registration_order() {
    let mut registry = PluginRegistry::new();
    for name in ["tcp", "eth", "udp"] {
        registry.register(with_version(name, 1), Origin::Static);
    }
    let mut seen = Vec::new();
    registry.for_each_of_kind(PlugType::Codec, |r| seen.push(r.api.name()));
    assert_eq!(seen, vec!["tcp", "eth", "udp"]);
    assert_eq!(registry.of_kind(PlugType::Logger).count(), 0);
}
