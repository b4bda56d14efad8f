//! Small identifier newtypes shared across the packet and keyblock models.

use std::fmt;

/// A 64-bit OpenPGP key id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(pub u64);

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

/// Opaque local identifier assigned by the keyring store, used as a lookup
/// key into the (stubbed) trust database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(pub u32);

/// A 20-byte (or, in principle, longer) key fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub Vec<u8>);

impl Fingerprint {
    /// Render as upper-case hex, grouped in 4-byte chunks the way `fpr`
    /// displays it.
    pub fn to_grouped_hex(&self) -> String {
        self.0
            .chunks(2)
            .map(|c| c.iter().map(|b| format!("{:02X}", b)).collect::<String>())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
