//! Host type registration.
//!
//! Each wrapper kind is registered once per runtime under
//! `<module>.<ClassName>` and exposed by its class name. A runtime can only
//! produce wrappers of kinds it registered.

use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use tether_core::{class_name, qualified_name, KindGroup, WrapperKind};

use crate::error::LoadError;

/// Token proving a kind was registered with a runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeHandle {
    kind: WrapperKind,
    index: u16,
}

impl TypeHandle {
    /// The registered kind.
    pub fn kind(self) -> WrapperKind {
        self.kind
    }

    /// Registration order, starting at 0.
    pub fn index(self) -> u16 {
        self.index
    }
}

/// A registered wrapper type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisteredType {
    /// The kind this type wraps.
    pub kind: WrapperKind,
    /// Fully-qualified name, e.g. `tether._native.Descriptor`.
    pub qualified_name: String,
    /// Name the module exposes it under, e.g. `Descriptor`.
    pub class_name: String,
}

/// The wrapper types a runtime registered, in registration order.
pub struct TypeRegistry {
    module: String,
    types: IndexMap<WrapperKind, RegisteredType>,
}

impl TypeRegistry {
    /// Create an empty registry for `module`.
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            types: IndexMap::new(),
        }
    }

    /// Register `kind`, returning its handle.
    pub fn register(&mut self, kind: WrapperKind) -> Result<TypeHandle, LoadError> {
        let qualified = qualified_name(&self.module, kind);
        let class = class_name(&qualified)
            .ok_or_else(|| LoadError::MalformedName {
                name: qualified.clone(),
            })?
            .to_string();
        if self.types.values().any(|t| t.class_name == class) {
            return Err(LoadError::DuplicateType { name: class });
        }

        let index = self.types.len() as u16;
        debug!(name = %qualified, index, "registered wrapper type");
        self.types.insert(
            kind,
            RegisteredType {
                kind,
                qualified_name: qualified,
                class_name: class,
            },
        );
        Ok(TypeHandle { kind, index })
    }

    /// Handle for `kind`, if registered.
    pub fn handle(&self, kind: WrapperKind) -> Option<TypeHandle> {
        self.types.get_index_of(&kind).map(|index| TypeHandle {
            kind,
            index: index as u16,
        })
    }

    /// Look a registered type up by its exposed class name.
    pub fn by_class_name(&self, name: &str) -> Option<&RegisteredType> {
        self.types.values().find(|t| t.class_name == name)
    }

    /// The registered type behind a handle.
    pub fn get(&self, handle: TypeHandle) -> Option<&RegisteredType> {
        self.types
            .get_index(handle.index as usize)
            .map(|(_, t)| t)
            .filter(|t| t.kind == handle.kind)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredType> {
        self.types.values()
    }

    /// The module path types are registered under.
    pub fn module(&self) -> &str {
        &self.module
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("module", &self.module)
            .field("types", &self.types.len())
            .finish()
    }
}

/// Register the configured kinds, one group at a time.
pub(crate) fn register_all(types: &mut TypeRegistry, kinds: &[WrapperKind]) -> Result<(), LoadError> {
    register_descriptor_containers(types, kinds)?;
    register_descriptor_pool(types, kinds)?;
    register_descriptors(types, kinds)?;
    register_messages(types, kinds)?;
    register_arena(types, kinds)
}

fn register_descriptor_containers(
    types: &mut TypeRegistry,
    kinds: &[WrapperKind],
) -> Result<(), LoadError> {
    register_group(types, kinds, KindGroup::Containers)
}

fn register_descriptor_pool(types: &mut TypeRegistry, kinds: &[WrapperKind]) -> Result<(), LoadError> {
    register_group(types, kinds, KindGroup::Pool)
}

fn register_descriptors(types: &mut TypeRegistry, kinds: &[WrapperKind]) -> Result<(), LoadError> {
    register_group(types, kinds, KindGroup::Descriptors)
}

fn register_messages(types: &mut TypeRegistry, kinds: &[WrapperKind]) -> Result<(), LoadError> {
    register_group(types, kinds, KindGroup::Messages)
}

fn register_arena(types: &mut TypeRegistry, kinds: &[WrapperKind]) -> Result<(), LoadError> {
    register_group(types, kinds, KindGroup::Arena)
}

fn register_group(
    types: &mut TypeRegistry,
    kinds: &[WrapperKind],
    group: KindGroup,
) -> Result<(), LoadError> {
    for &kind in kinds.iter().filter(|k| k.group() == group) {
        types.register(kind)?;
    }
    Ok(())
}
