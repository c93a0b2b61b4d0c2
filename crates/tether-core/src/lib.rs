//! Core types for the tether identity bridge.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by the arena allocator and the runtime: opaque native
//! addresses, the closed set of wrapper kinds, and the helpers that derive
//! host-visible class names from fully-qualified type names.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod id;
pub mod kind;
pub mod name;

pub use id::NativeAddr;
pub use kind::{KindGroup, WrapperKind};
pub use name::{class_name, qualified_name};
