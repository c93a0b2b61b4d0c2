//! Strongly-typed native identity.

use std::fmt;

/// Identity of a native object, used as an opaque integer key.
///
/// Addresses are never dereferenced by the tether runtime. They are only
/// compared and hashed, so two wrappers refer to the same native object
/// exactly when their addresses are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeAddr(pub u64);

impl NativeAddr {
    /// The raw integer value of this address.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Offset this address by `bytes`.
    ///
    /// Returns `None` on overflow.
    pub fn checked_add(self, bytes: u64) -> Option<Self> {
        self.0.checked_add(bytes).map(Self)
    }
}

impl fmt::Display for NativeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u64> for NativeAddr {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
