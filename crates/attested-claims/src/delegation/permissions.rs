//! Delegation permissions as a bit set.

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// A set of delegation permissions.
///
/// Hashed as a 4-byte little-endian integer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(u32);

impl Permissions {
    /// May issue attestations under the delegation.
    pub const ATTEST: Self = Self(1);
    /// May invite further delegates below the node.
    pub const DELEGATE: Self = Self(1 << 1);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(Self::ATTEST.0 | Self::DELEGATE.0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Unknown bits are dropped.
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::all().0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(Self::ATTEST) {
            names.push("ATTEST");
        }
        if self.contains(Self::DELEGATE) {
            names.push("DELEGATE");
        }
        write!(f, "Permissions({})", names.join(" | "))
    }
}
