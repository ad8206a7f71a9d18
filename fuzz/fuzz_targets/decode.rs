#![no_main]
use codecs::{BUILTIN_CODECS, DEFAULT_CODEC};
use engine::PluginManager;
use libfuzzer_sys::fuzz_target;
use loader::{Discover, StaticLoader};
use std::collections::HashSet;
use std::sync::OnceLock;

fn manager() -> &'static PluginManager {
    static MANAGER: OnceLock<PluginManager> = OnceLock::new();
    MANAGER.get_or_init(|| {
        let mut builtins = StaticLoader::new(vec![BUILTIN_CODECS]);
        let mut manager = PluginManager::new(DEFAULT_CODEC);
        manager
            .load(&mut [&mut builtins as &mut dyn Discover], &HashSet::new())
            .expect("load builtins");
        manager.instantiate().expect("instantiate builtins");
        manager
    })
}

fuzz_target!(|data: &[u8]| {
    let Some((&link_type, frame)) = data.split_first() else {
        return;
    };
    let codecs = manager().codecs();
    // Only DLT 0 and DLT 1 have a raw decoder.
    let Ok(mut thread) = codecs.thread_init(i32::from(link_type & 1), 40) else {
        return;
    };
    let decoded = thread.decode(frame);
    assert!(decoded.payload_offset <= frame.len());
    assert!(decoded.layers.len() <= 40);
    codecs.thread_term(thread);
});
