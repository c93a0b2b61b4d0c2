//! Object identity cache and runtime lifecycle for tether.
//!
//! Each native object is represented by at most one live [`Wrapper`] at a
//! time. The [`Runtime`] owns the address-keyed [`ObjectCache`] that enforces
//! this, the [`TypeRegistry`] of wrapper types, and the dedicated storage
//! arena the cache lives in.
//!
//! Wrappers keep the arenas their memory lives in alive, either by owning the
//! arena outright or by holding a reference to a wrapper that does.
//!
//! # Example
//!
//! ```
//! use tether_core::{NativeAddr, WrapperKind};
//! use tether_runtime::{Runtime, RuntimeConfig};
//!
//! let rt = Runtime::on_load(RuntimeConfig::default()).unwrap();
//! let a = rt.wrap_addr(NativeAddr(0x1000), WrapperKind::Descriptor).unwrap();
//! let b = rt.wrap_addr(NativeAddr(0x1000), WrapperKind::Descriptor).unwrap();
//! assert!(tether_runtime::Wrapper::ptr_eq(&a, &b));
//! drop((a, b));
//! rt.on_unload();
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod config;
pub mod error;
pub mod runtime;
pub mod types;
pub mod wrapper;

pub use cache::{CacheStats, ObjectCache};
pub use config::RuntimeConfig;
pub use error::{LoadError, WrapError};
pub use runtime::{ActiveState, Phase, Runtime};
pub use types::{RegisteredType, TypeHandle, TypeRegistry};
pub use wrapper::{Binding, Wrapper};
