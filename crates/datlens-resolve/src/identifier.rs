//! Navigation identifiers.
//!
//! A navigation node addresses data in one of two shapes: a record family
//! (plus optional sub-category) or a named collection tag. Both carry the
//! session id of the store they refer to.

use std::fmt;

use datlens_common::FamilyId;
use datlens_store::{RecordType, StoreKind};

use crate::classifier::family;

/// Stable identifier of an open store session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record family, optionally narrowed to one sub-category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FamilyRef {
    family_id: FamilyId,
    subtype: String,
    session: SessionId,
}

impl FamilyRef {
    pub fn family_id(&self) -> FamilyId {
        self.family_id
    }

    /// Sub-category name; empty for "no sub-category".
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }
}

/// A named top-level collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagRef {
    tag: String,
    session: SessionId,
}

impl TagRef {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }
}

/// What a navigation node points at.
///
/// # Example
///
/// ```
/// use datlens_common::FamilyId;
/// use datlens_resolve::{NavigationId, SessionId};
///
/// let session = SessionId::new("portal-1a2b3c4d");
/// let spells = NavigationId::family(FamilyId::new(0x0E00_000E), session.clone());
/// let areas = NavigationId::family_subtype(FamilyId::new(0x0E00_0002), "starting-areas", session);
///
/// assert_eq!(spells.to_string(), "0x0E00000E@portal-1a2b3c4d");
/// assert_eq!(areas.to_string(), "0x0E000002/starting-areas@portal-1a2b3c4d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "shape", rename_all = "lowercase"))]
pub enum NavigationId {
    Family(FamilyRef),
    Tag(TagRef),
}

impl NavigationId {
    /// A whole family.
    pub fn family(family_id: FamilyId, session: SessionId) -> Self {
        Self::family_subtype(family_id, "", session)
    }

    /// One sub-category of a composite family.
    pub fn family_subtype(family_id: FamilyId, subtype: impl Into<String>, session: SessionId) -> Self {
        Self::Family(FamilyRef {
            family_id,
            subtype: subtype.into(),
            session,
        })
    }

    /// A named collection.
    pub fn tag(tag: impl Into<String>, session: SessionId) -> Self {
        Self::Tag(TagRef {
            tag: tag.into(),
            session,
        })
    }

    /// The session this identifier addresses.
    pub fn session(&self) -> &SessionId {
        match self {
            Self::Family(f) => &f.session,
            Self::Tag(t) => &t.session,
        }
    }
}

impl fmt::Display for NavigationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Family(r) if r.subtype.is_empty() => write!(f, "{}@{}", r.family_id, r.session),
            Self::Family(r) => write!(f, "{}/{}@{}", r.family_id, r.subtype, r.session),
            Self::Tag(t) => write!(f, "#{}@{}", t.tag, t.session),
        }
    }
}

/// Named top-level collections exposed by each store kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollectionTag {
    Spells,
    Components,
    Skills,
    ChatPoses,
    CharGen,
    Xp,
    Landblocks,
    LandblockInfo,
}

impl CollectionTag {
    pub const ALL: [CollectionTag; 8] = [
        Self::Spells,
        Self::Components,
        Self::Skills,
        Self::ChatPoses,
        Self::CharGen,
        Self::Xp,
        Self::Landblocks,
        Self::LandblockInfo,
    ];

    /// Parse a tag name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(name))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spells => "spells",
            Self::Components => "components",
            Self::Skills => "skills",
            Self::ChatPoses => "chat-poses",
            Self::CharGen => "char-gen",
            Self::Xp => "xp",
            Self::Landblocks => "landblocks",
            Self::LandblockInfo => "landblock-info",
        }
    }

    /// The store kind that exposes this collection.
    pub fn store_kind(&self) -> StoreKind {
        match self {
            Self::Landblocks | Self::LandblockInfo => StoreKind::Cell,
            _ => StoreKind::Portal,
        }
    }

    /// Portal collections are aliases for a table family.
    pub fn family(&self) -> Option<FamilyId> {
        match self {
            Self::Spells => Some(family::SPELL_TABLE),
            Self::Components => Some(family::SPELL_COMPONENT_TABLE),
            Self::Skills => Some(family::SKILL_TABLE),
            Self::ChatPoses => Some(family::CHAT_POSE_TABLE),
            Self::CharGen => Some(family::CHAR_GEN),
            Self::Xp => Some(family::XP_TABLE),
            Self::Landblocks | Self::LandblockInfo => None,
        }
    }

    /// Cell collections are selected by the low 16 bits of the id.
    pub fn cell_marker(&self) -> Option<u16> {
        match self {
            Self::Landblocks => Some(0xFFFF),
            Self::LandblockInfo => Some(0xFFFE),
            _ => None,
        }
    }

    /// Decoder for members of a deferred (cell) collection.
    pub fn decoder(&self) -> Option<RecordType> {
        match self {
            Self::Landblocks => Some(RecordType::Landblock),
            Self::LandblockInfo => Some(RecordType::LandblockInfo),
            _ => None,
        }
    }
}

impl fmt::Display for CollectionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_parse() {
        assert_eq!(CollectionTag::parse("Spells"), Some(CollectionTag::Spells));
        assert_eq!(CollectionTag::parse(" landblock-info "), Some(CollectionTag::LandblockInfo));
        assert_eq!(CollectionTag::parse("dungeons"), None);
    }

    #[test]
    fn test_every_tag_has_exactly_one_strategy() {
        for tag in CollectionTag::ALL {
            let aliased = tag.family().is_some();
            let listed = tag.cell_marker().is_some() && tag.decoder().is_some();
            assert!(aliased ^ listed, "{} must be an alias or a listing", tag);
            assert_eq!(listed, tag.store_kind() == StoreKind::Cell);
        }
    }

    #[test]
    fn test_session_accessor() {
        let session = SessionId::new("cell-00000001");
        let id = NavigationId::tag("landblocks", session.clone());
        assert_eq!(id.session(), &session);
        assert_eq!(id.to_string(), "#landblocks@cell-00000001");
    }
}
