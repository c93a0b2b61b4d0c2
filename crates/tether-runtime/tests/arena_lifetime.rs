//! Wrappers keep the arenas their memory lives in alive.

use tether_arena::{ArenaConfig, ArenaError, Arenas};
use tether_core::WrapperKind;
use tether_runtime::{WrapError, Wrapper};
use tether_test_utils::{loaded_runtime, pool_with_descriptors};

#[test]
fn descriptors_keep_pool_arena_alive() {
    let rt = loaded_runtime();
    let fixture = pool_with_descriptors(&rt, 4).unwrap();
    let arena = fixture.pool.arena_id().unwrap();
    let mut descriptors = fixture.descriptors;

    drop(fixture.pool);
    assert!(rt.arenas().is_live(arena));

    let last = descriptors.pop().unwrap();
    drop(descriptors);
    assert!(rt.arenas().is_live(arena));
    assert_eq!(last.read(|b| b.len()).unwrap(), 16);

    drop(last);
    assert!(!rt.arenas().is_live(arena));
    assert_eq!(rt.state().cached(), 0);
}

#[test]
fn parent_must_own_the_target_arena() {
    let rt = loaded_runtime();
    let a = rt.construct(WrapperKind::DescriptorPool).unwrap();
    let b = rt.construct(WrapperKind::DescriptorPool).unwrap();
    let obj = a.alloc(16, 8).unwrap();
    assert_eq!(
        rt.wrap(obj, WrapperKind::Descriptor, Some(&b)).unwrap_err(),
        WrapError::ForeignArena {
            kind: WrapperKind::Descriptor
        }
    );
}

#[test]
fn unparented_object_goes_stale_with_its_arena() {
    let rt = loaded_runtime();
    let arena = rt.new_arena_handle().unwrap();
    let obj = arena.alloc(8, 8).unwrap();
    let msg = rt.wrap(obj, WrapperKind::Message, None).unwrap();
    msg.write(|b| b.fill(7)).unwrap();

    drop(arena);
    assert!(matches!(
        msg.read(|b| b[0]),
        Err(WrapError::Arena(ArenaError::StaleArena { .. }))
    ));
    assert!(matches!(
        rt.wrap(obj, WrapperKind::Message, None),
        Err(WrapError::Arena(ArenaError::StaleArena { .. }))
    ));
}

#[test]
fn nested_parents_chain_lifetimes() {
    let rt = loaded_runtime();
    let pool = rt.construct(WrapperKind::DescriptorPool).unwrap();
    let arena = pool.arena_id().unwrap();
    let file = rt
        .wrap(pool.alloc(32, 8).unwrap(), WrapperKind::FileDescriptor, Some(&pool))
        .unwrap();
    let field = rt
        .wrap(pool.alloc(16, 8).unwrap(), WrapperKind::FieldDescriptor, Some(&file))
        .unwrap();
    assert!(Wrapper::ptr_eq(field.parent().unwrap(), &file));

    drop(pool);
    drop(file);
    assert!(rt.arenas().is_live(arena));
    drop(field);
    assert!(!rt.arenas().is_live(arena));
}

#[test]
fn foreign_wrappers_have_no_memory() {
    let rt = loaded_runtime();
    let w = rt
        .wrap_addr(tether_core::NativeAddr(0x1000), WrapperKind::EnumDescriptor)
        .unwrap();
    assert_eq!(w.backing_arena(), None);
    assert_eq!(
        w.read(|b| b.len()).unwrap_err(),
        WrapError::NoTarget {
            kind: WrapperKind::EnumDescriptor
        }
    );
    assert_eq!(
        w.alloc(8, 8).unwrap_err(),
        WrapError::NoArena {
            kind: WrapperKind::EnumDescriptor
        }
    );
}

#[test]
fn objects_from_another_registry_cannot_be_wrapped() {
    let rt = loaded_runtime();
    let storage = rt.state().storage_arena();
    let elsewhere = Arenas::new();
    let arena = elsewhere.create(&ArenaConfig::default()).unwrap();
    let obj = elsewhere.alloc(arena, 16, 8).unwrap();
    assert_eq!(arena.slot(), storage.slot());
    assert_eq!(arena.generation(), storage.generation());

    assert_eq!(
        rt.wrap(obj, WrapperKind::Message, None).unwrap_err(),
        WrapError::Arena(ArenaError::ForeignRegistry { arena })
    );
    assert_eq!(rt.state().cached(), 0);
}

#[test]
fn parented_wrapper_cannot_reach_foreign_memory() {
    let rt = loaded_runtime();
    let pool = rt.construct(WrapperKind::DescriptorPool).unwrap();
    let elsewhere = Arenas::new();
    let arena = elsewhere.create(&ArenaConfig::default()).unwrap();
    let obj = elsewhere.alloc(arena, 16, 8).unwrap();
    assert!(rt.wrap(obj, WrapperKind::Descriptor, Some(&pool)).is_err());
    // The pool's own objects still resolve.
    assert!(pool.read(|b| b.len()).is_ok());
}
