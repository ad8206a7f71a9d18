use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use codecs::{BUILTIN_CODECS, DEFAULT_CODEC};
use engine::{CodecManager, ConfigError, PluginManager};
use loader::{Candidate, Discover, StaticLoader};
use plugin_core::{
    Api, BaseApi, Codec, CodecApi, CodecData, ExtensionApi, LibraryHandle, Origin, PlugType,
    PluginRegistry, ProtocolId,
};

static ALERT_FAST: ExtensionApi = ExtensionApi {
    base: BaseApi::extension(PlugType::Logger, "alert_fast", "one line per alert", 1),
    pinit: None,
    pterm: None,
    tinit: None,
    tterm: None,
};

static PORT_SCAN: ExtensionApi = ExtensionApi {
    base: BaseApi::extension(PlugType::Inspector, "port_scan", "detects port scans", 2),
    pinit: None,
    pterm: None,
    tinit: None,
    tterm: None,
};

static EXTRAS: &[Api] = &[Api::Extension(&ALERT_FAST), Api::Extension(&PORT_SCAN)];

fn loaded(disabled: &[&str]) -> PluginManager {
    let disabled: HashSet<String> = disabled.iter().map(|s| s.to_string()).collect();
    let mut builtins = StaticLoader::new(vec![BUILTIN_CODECS, EXTRAS]);
    let mut manager = PluginManager::new(DEFAULT_CODEC);
    let mut loaders: [&mut dyn Discover; 1] = [&mut builtins];
    let report = manager.load(&mut loaders, &disabled).unwrap();
    assert_eq!(report.offered, BUILTIN_CODECS.len() + EXTRAS.len());
    assert_eq!(report.disabled, disabled.len());
    manager
}

#[test]
fn brings_up_codecs_and_extensions() {
    let mut manager = loaded(&[]);
    manager.instantiate().unwrap();

    let codecs = manager.codecs();
    assert_eq!(codecs.len(), BUILTIN_CODECS.len() + 1);
    assert!(codecs.lookup(17).is_some());
    assert_eq!(manager.extensions().keys_of(PlugType::Inspector), ["inspector::port_scan"]);
    assert_eq!(manager.extensions().keys_of(PlugType::Logger), ["logger::alert_fast"]);

    let dump = manager.dump();
    assert_eq!(dump.first(), Some(&("null", 1)));
    assert!(dump.contains(&("port_scan", 2)));

    manager.release();
    assert!(manager.registry().is_empty());
    assert!(manager.codecs().is_empty());
    manager.release();
}

#[test]
fn disabled_plugins_never_reach_the_table() {
    let mut manager = loaded(&["codec::icmp4", "logger::alert_fast"]);
    manager.instantiate().unwrap();
    assert_eq!(manager.codecs().lookup(1), None);
    assert!(manager.codecs().lookup(6).is_some());
    assert!(manager.extensions().keys_of(PlugType::Logger).is_empty());
    assert!(manager
        .list()
        .iter()
        .all(|l| l.key != "codec::icmp4" && l.key != "logger::alert_fast"));
}

#[test]
fn listing_is_sorted_and_shows_help() {
    let manager = loaded(&[]);
    let keys: Vec<String> = manager.list().into_iter().map(|l| l.key).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert!(manager.list().iter().all(|l| l.source == "static"));

    let show = manager.show();
    assert!(show.contains(&("inspector::port_scan".to_string(), "detects port scans")));
}

#[test]
fn instantiate_named_requires_a_loaded_codec() {
    let mut manager = loaded(&["codec::tcp"]);
    assert_eq!(
        manager.codecs_mut().instantiate_named("tcp"),
        Err(ConfigError::NotRegistered {
            plugin: "tcp".into()
        })
    );
}

static PINIT: AtomicUsize = AtomicUsize::new(0);
static PTERM: AtomicUsize = AtomicUsize::new(0);

fn csv_pinit() {
    PINIT.fetch_add(1, Ordering::SeqCst);
}

fn csv_pterm() {
    PTERM.fetch_add(1, Ordering::SeqCst);
}

static ALERT_CSV: ExtensionApi = ExtensionApi {
    base: BaseApi::extension(PlugType::Logger, "alert_csv", "", 1),
    pinit: Some(csv_pinit),
    pterm: Some(csv_pterm),
    tinit: None,
    tterm: None,
};

static CSV_ONLY: &[Api] = &[Api::Extension(&ALERT_CSV)];

#[test]
fn extension_process_hooks_run_once() {
    {
        let mut builtins = StaticLoader::new(vec![CSV_ONLY]);
        let mut manager = PluginManager::new(DEFAULT_CODEC);
        manager
            .load(&mut [&mut builtins as &mut dyn Discover], &HashSet::new())
            .unwrap();
        manager.instantiate().unwrap();
        manager.instantiate().unwrap();
        assert_eq!(PINIT.load(Ordering::SeqCst), 1);
        manager.release();
        assert_eq!(PTERM.load(Ordering::SeqCst), 1);
    }
    assert_eq!(PTERM.load(Ordering::SeqCst), 1);
}

#[derive(Debug)]
struct VendorLib {
    path: PathBuf,
    closed: Arc<AtomicBool>,
}

impl LibraryHandle for VendorLib {
    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for VendorLib {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Offers a fixed list as if it had been read from one library.
struct LibLoader {
    apis: &'static [Api],
    origin: Origin,
}

impl Discover for LibLoader {
    fn discover(&mut self) -> Vec<Candidate> {
        self.apis
            .iter()
            .map(|api| Candidate {
                api: *api,
                origin: self.origin.clone(),
            })
            .collect()
    }
}

static VENDOR_CTORS: AtomicUsize = AtomicUsize::new(0);

struct Lldp;

impl Codec for Lldp {
    fn name(&self) -> &str {
        "lldp"
    }

    fn protocol_ids(&self) -> Vec<ProtocolId> {
        vec![0x88cc]
    }

    fn decode(&self, _raw: &[u8], _data: &mut CodecData) -> bool {
        false
    }
}

fn new_lldp() -> Box<dyn Codec> {
    VENDOR_CTORS.fetch_add(1, Ordering::SeqCst);
    Box::new(Lldp)
}

fn drop_lldp(_cd: Box<dyn Codec>) {}

static LLDP: CodecApi = CodecApi {
    base: BaseApi::codec("lldp", "", 1),
    pinit: None,
    pterm: None,
    tinit: None,
    tterm: None,
    ctor: Some(new_lldp),
    dtor: Some(drop_lldp),
};

static LLDP_AUDIT: ExtensionApi = ExtensionApi {
    base: BaseApi::extension(PlugType::Inspector, "lldp_audit", "", 1),
    pinit: None,
    pterm: None,
    tinit: None,
    tterm: None,
};

static VENDOR: &[Api] = &[Api::Codec(&LLDP), Api::Extension(&LLDP_AUDIT)];

#[test]
fn release_forgets_descriptors_before_closing_their_library() {
    let closed = Arc::new(AtomicBool::new(false));
    let lib = VendorLib {
        path: PathBuf::from("/plugins/libvendor.so"),
        closed: closed.clone(),
    };
    let mut manager = PluginManager::new(DEFAULT_CODEC);
    {
        let mut vendor = LibLoader {
            apis: VENDOR,
            origin: Origin::Library(Arc::new(lib)),
        };
        manager
            .load(&mut [&mut vendor as &mut dyn Discover], &HashSet::new())
            .unwrap();
    }
    manager.instantiate().unwrap();
    assert_eq!(VENDOR_CTORS.load(Ordering::SeqCst), 1);
    assert!(manager.codecs().lookup(0x88cc).is_some());
    assert_eq!(manager.dump(), [("lldp", 1), ("lldp_audit", 1)]);

    assert!(!closed.load(Ordering::SeqCst));

    manager.release();
    assert!(closed.load(Ordering::SeqCst));
    assert!(manager.dump().is_empty());
    assert!(manager.extensions().is_empty());

    manager.instantiate().unwrap();
    assert_eq!(VENDOR_CTORS.load(Ordering::SeqCst), 1);
    assert_eq!(manager.codecs().lookup(0x88cc), None);
    assert_eq!(manager.codecs().len(), 1);
}

#[test]
fn added_codecs_keep_their_library_open() {
    let closed = Arc::new(AtomicBool::new(false));
    let lib = VendorLib {
        path: PathBuf::from("/plugins/liblldp.so"),
        closed: closed.clone(),
    };
    let mut registry = PluginRegistry::new();
    assert!(registry.register(Api::Codec(&LLDP), Origin::Library(Arc::new(lib))));
    let mut codecs = CodecManager::new(DEFAULT_CODEC);
    for plugin in registry.iter() {
        codecs.add_plugin(plugin).unwrap();
    }

    registry.teardown();
    assert_eq!(registry.open_libraries(), 0);
    assert!(!closed.load(Ordering::SeqCst));
    assert_eq!(codecs.dump(), [("lldp", 1)]);

    drop(codecs);
    assert!(closed.load(Ordering::SeqCst));
}
