//! Runtime configuration.

use tether_arena::ArenaConfig;
use tether_core::WrapperKind;

use crate::error::LoadError;

/// Configuration consumed by [`Runtime::on_load`](crate::Runtime::on_load).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Dotted module path the wrapper types are registered under.
    pub module_name: String,

    /// Geometry of the dedicated arena holding the object cache's nodes.
    pub storage: ArenaConfig,

    /// Geometry of arenas created for arena-owning wrappers.
    pub object_arena: ArenaConfig,

    /// Wrapper kinds to register, in any order.
    ///
    /// Registration follows [`KindGroup`](tether_core::KindGroup) order
    /// regardless of the order given here.
    pub kinds: Vec<WrapperKind>,
}

impl RuntimeConfig {
    /// Default module path.
    pub const DEFAULT_MODULE_NAME: &'static str = "tether._native";

    /// Size in bytes of the root object allocated for directly constructed
    /// pools and messages.
    pub const ROOT_OBJECT_BYTES: u32 = 64;

    /// Default geometry of the cache storage arena: 64KB segments, up to
    /// 4096 of them.
    pub fn default_storage() -> ArenaConfig {
        ArenaConfig::new(ArenaConfig::DEFAULT_SEGMENT_SIZE, 4096)
    }

    /// Check the config before any state is allocated.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.module_name.is_empty()
            || self.module_name.split('.').any(|segment| segment.is_empty())
        {
            return Err(LoadError::InvalidModuleName {
                name: self.module_name.clone(),
            });
        }
        self.storage.validate().map_err(LoadError::Storage)?;
        self.object_arena.validate().map_err(LoadError::Storage)?;
        if self.object_arena.segment_size < Self::ROOT_OBJECT_BYTES {
            return Err(LoadError::Storage(tether_arena::ArenaError::InvalidConfig {
                reason: "object arena segments cannot hold a root object",
            }));
        }
        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            module_name: Self::DEFAULT_MODULE_NAME.to_string(),
            storage: Self::default_storage(),
            object_arena: ArenaConfig::default(),
            kinds: WrapperKind::ALL.to_vec(),
        }
    }
}
