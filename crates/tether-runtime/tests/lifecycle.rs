//! Load, use and teardown of the runtime.

use tether_arena::{ArenaConfig, ArenaError, Arenas};
use tether_core::{NativeAddr, WrapperKind};
use tether_runtime::{LoadError, Phase, Runtime, RuntimeConfig, WrapError};
use tether_test_utils::{init_tracing, loaded_runtime, small_config};

#[test]
fn load_then_unload_leaves_no_arenas() {
    init_tracing();
    let arenas = Arenas::new();
    let rt = Runtime::on_load_in(arenas.clone(), RuntimeConfig::default()).unwrap();
    assert_eq!(arenas.stats().live, 1);
    assert_eq!(rt.state().types().module(), "tether._native");
    rt.on_unload();
    assert_eq!(arenas.stats().live, 0);
    assert_eq!(rt.phase(), Phase::TornDown);
}

#[test]
fn types_are_exposed_by_class_name() {
    let rt = loaded_runtime();
    let state = rt.state();
    let types = state.types();
    for kind in WrapperKind::ALL {
        let t = types.by_class_name(kind.class_name()).unwrap();
        assert_eq!(t.kind, kind);
        assert_eq!(t.qualified_name, format!("tether._native.{}", kind.class_name()));
    }
    // Containers register first, the arena type last.
    assert_eq!(types.iter().next().unwrap().kind.class_name(), "ByNameMap");
    assert_eq!(types.iter().last().unwrap().kind, WrapperKind::Arena);
}

#[test]
fn failed_registration_releases_storage() {
    init_tracing();
    let arenas = Arenas::new();
    let config = RuntimeConfig {
        kinds: vec![WrapperKind::Arena, WrapperKind::Descriptor, WrapperKind::Arena],
        ..RuntimeConfig::default()
    };
    let err = Runtime::on_load_in(arenas.clone(), config).unwrap_err();
    assert_eq!(
        err,
        LoadError::DuplicateType {
            name: "Arena".to_string()
        }
    );
    assert_eq!(arenas.stats().live, 0);
}

#[test]
fn storage_that_cannot_be_created_fails_load() {
    let config = RuntimeConfig {
        storage: ArenaConfig::new(100, 1),
        ..RuntimeConfig::default()
    };
    assert!(matches!(
        Runtime::on_load(config),
        Err(LoadError::Storage(ArenaError::InvalidConfig { .. }))
    ));
}

#[test]
fn reload_after_unload_starts_empty() {
    init_tracing();
    let arenas = Arenas::new();
    let rt = Runtime::on_load_in(arenas.clone(), RuntimeConfig::default()).unwrap();
    let w = rt.wrap_addr(NativeAddr(0x1000), WrapperKind::Message).unwrap();
    drop(w);
    rt.on_unload();

    let rt = Runtime::on_load_in(arenas.clone(), RuntimeConfig::default()).unwrap();
    assert_eq!(rt.state().cached(), 0);
    assert!(rt.cache_get(NativeAddr(0x1000)).is_none());
    rt.on_unload();
    assert_eq!(arenas.stats().live, 0);
}

#[test]
fn wrapper_outliving_teardown_is_released_safely() {
    let rt = loaded_runtime();
    let pool = rt.construct(WrapperKind::DescriptorPool).unwrap();
    let arena = pool.arena_id().unwrap();
    rt.on_unload();

    // Still a working handle; only lookup is gone.
    assert!(pool.read(|b| b.len()).is_ok());
    drop(pool);
    assert_eq!(rt.orphaned(), 1);
    assert!(!rt.arenas().is_live(arena));
}

#[test]
#[should_panic(expected = "used after teardown")]
fn wrapping_after_teardown_aborts() {
    let rt = loaded_runtime();
    rt.on_unload();
    let _ = rt.wrap_addr(NativeAddr(0x1000), WrapperKind::Message);
}

#[test]
fn forbidden_constructors_name_the_type() {
    let rt = loaded_runtime();
    for kind in WrapperKind::ALL.into_iter().filter(|k| k.is_factory_only()) {
        let err = rt.construct(kind).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Objects of type {} may not be created directly.", kind.class_name())
        );
    }
    assert_eq!(rt.arenas().stats().live, 1);
}

#[test]
fn constructible_kinds_succeed() {
    let rt = loaded_runtime();
    for kind in [WrapperKind::DescriptorPool, WrapperKind::Message, WrapperKind::Arena] {
        let w = rt.construct(kind).unwrap();
        assert_eq!(w.kind(), kind);
        assert!(w.arena_id().is_some());
    }
}

#[test]
fn object_arena_exhaustion_is_an_error() {
    init_tracing();
    let rt = Runtime::on_load(small_config()).unwrap();
    let pool = rt.construct(WrapperKind::DescriptorPool).unwrap();
    // 256-byte single segment, 64 already used by the root object.
    pool.alloc(192, 8).unwrap();
    assert!(matches!(
        pool.alloc(8, 8),
        Err(WrapError::Arena(ArenaError::CapacityExceeded { .. }))
    ));
}

#[test]
fn live_wrappers_are_not_capped_by_storage_size() {
    init_tracing();
    let rt = Runtime::on_load(small_config()).unwrap();
    // 1024-byte segments x 4 hold 256 cache nodes.
    let held: Vec<_> = (0..600u64)
        .map(|i| {
            rt.wrap_addr(NativeAddr(0x1000 + i * 8), WrapperKind::Message)
                .unwrap()
        })
        .collect();
    let stats = rt.state().cache_stats();
    assert_eq!(stats.live, 600);
    assert_eq!(stats.storage_blocks, 3);
    assert!(rt.cache_get(NativeAddr(0x1000 + 599 * 8)).is_some());

    drop(held);
    assert_eq!(rt.state().cached(), 0);
    rt.on_unload();
    assert_eq!(rt.arenas().stats().live, 0);
}

#[test]
fn backend_is_named() {
    assert_eq!(Runtime::BACKEND, "tether");
}
