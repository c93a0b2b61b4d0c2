//! Reusable runtime fixtures.
//!
//! - [`loaded_runtime`]: a runtime with every wrapper kind registered.
//! - [`small_config`]: tight arena geometry for exhaustion tests.
//! - [`pool_with_descriptors`]: a pool plus `n` descriptors inside its arena.

use tether_arena::{ArenaConfig, NativeRef};
use tether_core::WrapperKind;
use tether_runtime::{Runtime, RuntimeConfig, WrapError, Wrapper};

/// Load a runtime with the default config, with tracing initialized.
pub fn loaded_runtime() -> Runtime {
    crate::init_tracing();
    Runtime::on_load(RuntimeConfig::default()).expect("default config must load")
}

/// A config whose object arenas hold a single 256-byte segment.
pub fn small_config() -> RuntimeConfig {
    RuntimeConfig {
        storage: ArenaConfig::new(1024, 4),
        object_arena: ArenaConfig::new(256, 1),
        ..RuntimeConfig::default()
    }
}

/// A pool and the descriptor wrappers created inside its arena.
pub struct PoolFixture {
    pub pool: Wrapper,
    pub descriptors: Vec<Wrapper>,
}

/// Construct a pool and wrap `n` 16-byte descriptor objects allocated in it,
/// each parented to the pool.
pub fn pool_with_descriptors(rt: &Runtime, n: usize) -> Result<PoolFixture, WrapError> {
    let pool = rt.construct(WrapperKind::DescriptorPool)?;
    let mut descriptors = Vec::with_capacity(n);
    for i in 0..n {
        let obj = pool.alloc(16, 8)?;
        write_index(rt, obj, i)?;
        descriptors.push(rt.wrap(obj, WrapperKind::Descriptor, Some(&pool))?);
    }
    Ok(PoolFixture { pool, descriptors })
}

fn write_index(rt: &Runtime, obj: NativeRef, i: usize) -> Result<(), WrapError> {
    rt.arenas()
        .write(&obj, |bytes| bytes[..8].copy_from_slice(&(i as u64).to_le_bytes()))?;
    Ok(())
}
