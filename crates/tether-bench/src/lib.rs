//! Benchmark profiles for the tether identity cache.
//!
//! - [`populated_runtime`]: a runtime with `n` foreign wrappers cached
//! - [`addr_for`]: the address used for the `i`-th wrapper

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::error::Error;

use tether_core::{NativeAddr, WrapperKind};
use tether_runtime::{Runtime, RuntimeConfig, Wrapper};

/// Spacing between benchmark addresses, matching a typical object stride.
pub const ADDR_STRIDE: u64 = 0x40;

/// Address of the `i`-th benchmark object.
pub fn addr_for(i: usize) -> NativeAddr {
    NativeAddr(0x1000 + i as u64 * ADDR_STRIDE)
}

/// Load a runtime and cache `n` message wrappers at [`addr_for`] addresses.
///
/// The returned wrappers must be kept alive for the entries to stay cached.
pub fn populated_runtime(n: usize) -> Result<(Runtime, Vec<Wrapper>), Box<dyn Error>> {
    let rt = Runtime::on_load(RuntimeConfig::default())?;
    let wrappers = (0..n)
        .map(|i| rt.wrap_addr(addr_for(i), WrapperKind::Message))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((rt, wrappers))
}
