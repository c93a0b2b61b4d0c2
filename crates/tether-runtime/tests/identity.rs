//! One native object, one wrapper: lookup, release and recreation.

use tether_core::{NativeAddr, WrapperKind};
use tether_runtime::{Runtime, Wrapper};
use tether_test_utils::loaded_runtime;

#[test]
fn released_wrapper_is_replaced_by_a_new_instance() {
    let rt = loaded_runtime();
    let addr = NativeAddr(0x1000);

    let first = rt.wrap_addr(addr, WrapperKind::Descriptor).unwrap();
    let hit = rt.cache_get(addr).unwrap();
    assert!(Wrapper::ptr_eq(&first, &hit));
    drop(hit);

    drop(first);
    assert!(rt.cache_get(addr).is_none());
    assert!(!rt.state().is_cached(addr));

    let second = rt.wrap_addr(addr, WrapperKind::Descriptor).unwrap();
    assert!(second.is_cached());
    assert_eq!(second.ref_count(), 1);
    assert_eq!(second.addr(), Some(addr));
}

#[test]
fn each_hit_is_a_handle_that_must_be_released() {
    let rt = loaded_runtime();
    let addr = NativeAddr(0x1000);
    let w = rt.wrap_addr(addr, WrapperKind::Message).unwrap();

    let hits: Vec<Wrapper> = (0..5).map(|_| rt.cache_get(addr).unwrap()).collect();
    assert_eq!(w.ref_count(), 6);

    drop(w);
    for (i, hit) in hits.into_iter().enumerate() {
        assert!(rt.state().is_cached(addr), "entry gone after {i} releases");
        drop(hit);
    }
    assert!(!rt.state().is_cached(addr));
}

#[test]
#[should_panic(expected = "duplicate add for live key 0x2000")]
fn second_wrapper_for_a_live_address_aborts() {
    let rt = loaded_runtime();
    let _first = rt.wrap_addr(NativeAddr(0x2000), WrapperKind::Descriptor).unwrap();
    let other = rt.wrap_addr(NativeAddr(0x3000), WrapperKind::Descriptor).unwrap();
    rt.cache_remove(NativeAddr(0x3000));
    rt.cache_add(NativeAddr(0x2000), &other);
}

#[test]
#[should_panic(expected = "remove of absent key")]
fn removing_an_unknown_address_aborts() {
    let rt = loaded_runtime();
    rt.cache_remove(NativeAddr(0xdead));
}

#[test]
fn manual_add_then_release_removes_entry() {
    let rt = loaded_runtime();
    let w = rt.wrap_addr(NativeAddr(0x10), WrapperKind::Message).unwrap();
    rt.cache_remove(NativeAddr(0x10));
    rt.cache_add(NativeAddr(0x20), &w);
    assert!(Wrapper::ptr_eq(&rt.cache_get(NativeAddr(0x20)).unwrap(), &w));
    drop(w);
    assert_eq!(rt.state().cached(), 0);
}

#[test]
fn distinct_runtimes_have_distinct_caches() {
    let a = loaded_runtime();
    let b = loaded_runtime();
    let wa = a.wrap_addr(NativeAddr(0x1000), WrapperKind::Message).unwrap();
    let wb = b.wrap_addr(NativeAddr(0x1000), WrapperKind::Message).unwrap();
    assert!(!Wrapper::ptr_eq(&wa, &wb));
    assert!(!Runtime::ptr_eq(wa.runtime(), wb.runtime()));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[derive(Clone, Debug)]
    enum Op {
        Wrap(u64),
        Release(u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u64..8).prop_map(Op::Wrap),
            (0u64..8).prop_map(Op::Release),
        ]
    }

    proptest! {
        #[test]
        fn cache_tracks_live_wrappers(ops in proptest::collection::vec(op(), 1..100)) {
            let rt = loaded_runtime();
            let mut held: HashMap<u64, Vec<Wrapper>> = HashMap::new();
            for op in ops {
                match op {
                    Op::Wrap(k) => {
                        let w = rt.wrap_addr(NativeAddr(k * 8), WrapperKind::Message).unwrap();
                        if let Some(existing) = held.get(&k).and_then(|v| v.first()) {
                            prop_assert!(Wrapper::ptr_eq(existing, &w));
                        }
                        held.entry(k).or_default().push(w);
                    }
                    Op::Release(k) => {
                        if let Some(v) = held.get_mut(&k) {
                            v.pop();
                            if v.is_empty() {
                                held.remove(&k);
                            }
                        }
                    }
                }
                let state = rt.state();
                prop_assert_eq!(state.cached(), held.len());
                for (k, v) in &held {
                    prop_assert!(state.is_cached(NativeAddr(k * 8)));
                    prop_assert_eq!(v[0].ref_count(), v.len());
                }
            }
        }
    }
}
