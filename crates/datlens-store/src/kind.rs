//! Store kind discriminator.

use std::fmt;

/// The two kinds of backing store.
///
/// Both expose the generic id-keyed space; each also exposes a different set
/// of named top-level collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u32)]
pub enum StoreKind {
    /// Shared asset store: tables, graphics, sounds, strings.
    Portal = 1,
    /// World geometry store: landblocks and their cells.
    Cell = 2,
}

impl StoreKind {
    /// Parse from the on-disk discriminator.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Portal),
            2 => Some(Self::Cell),
            _ => None,
        }
    }

    /// Get the string name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portal => "portal",
            Self::Cell => "cell",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "portal" => Ok(Self::Portal),
            "cell" => Ok(Self::Cell),
            other => Err(format!("unknown store kind: {}", other)),
        }
    }
}
