//! Record family identifiers.
//!
//! The store's id space is flat and 32 bits wide. The top bits of an id select
//! a logical record family; for range families the low bits enumerate the
//! members of that family.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A 32-bit record family identifier.
///
/// Displayed and parsed as `0xXXXXXXXX`. Plain decimal is accepted when parsing.
///
/// # Example
///
/// ```
/// use datlens_common::FamilyId;
///
/// let family = FamilyId::new(0x0500_0000);
/// assert_eq!(family.range_end(FamilyId::DEFAULT_RANGE_MASK), 0x05FF_FFFF);
/// assert!(family.contains(FamilyId::DEFAULT_RANGE_MASK, 0x0500_0001));
/// assert!(!family.contains(FamilyId::DEFAULT_RANGE_MASK, 0x0600_0001));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FamilyId(u32);

impl FamilyId {
    /// Low 24 bits enumerate entries, the top 8 select the family.
    pub const DEFAULT_RANGE_MASK: u32 = 0x00FF_FFFF;

    /// Wrap a raw 32-bit id.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw 32-bit value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// First id of the family's range under `mask`.
    #[inline]
    pub const fn range_start(self, mask: u32) -> u32 {
        self.0 & !mask
    }

    /// Last id (inclusive) of the family's range under `mask`.
    #[inline]
    pub const fn range_end(self, mask: u32) -> u32 {
        self.0 | mask
    }

    /// Whether `id` falls inside this family's range under `mask`.
    #[inline]
    pub const fn contains(self, mask: u32, id: u32) -> bool {
        id >= self.range_start(mask) && id <= self.range_end(mask)
    }
}

impl From<u32> for FamilyId {
    #[inline]
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<FamilyId> for u32 {
    #[inline]
    fn from(id: FamilyId) -> Self {
        id.0
    }
}

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl fmt::Debug for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FamilyId(0x{:08X})", self.0)
    }
}

impl FromStr for FamilyId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_id(s).map(Self)
    }
}

/// Parse a record id written as `0x`-prefixed hex or plain decimal.
pub(crate) fn parse_id(s: &str) -> Result<u32, Error> {
    let trimmed = s.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => trimmed.parse::<u32>(),
    };
    parsed.map_err(|_| Error::InvalidId(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_and_decimal() {
        assert_eq!("0x0E00000E".parse::<FamilyId>().unwrap().get(), 0x0E00_000E);
        assert_eq!("0x0500_0000".parse::<FamilyId>().unwrap().get(), 0x0500_0000);
        assert_eq!("16".parse::<FamilyId>().unwrap().get(), 16);
        assert!("0xZZ".parse::<FamilyId>().is_err());
        assert!("".parse::<FamilyId>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(FamilyId::new(0x0E00_000E).to_string(), "0x0E00000E");
    }

    #[test]
    fn test_narrow_mask_range() {
        let family = FamilyId::new(0x0E01_0000);
        assert_eq!(family.range_start(0x0000_FFFF), 0x0E01_0000);
        assert_eq!(family.range_end(0x0000_FFFF), 0x0E01_FFFF);
        assert!(!family.contains(0x0000_FFFF, 0x0E00_000E));
        assert!(family.contains(FamilyId::DEFAULT_RANGE_MASK, 0x0E00_000E));
    }
}
