//! Family classifier.
//!
//! The store has no schema. This table is the schema: every known family id
//! mapped to how its records are organized and which decoder reads them.

use std::fmt;

use datlens_common::FamilyId;
use datlens_store::RecordType;

/// Well-known family ids.
pub mod family {
    use datlens_common::FamilyId;

    pub const GFX_OBJ: FamilyId = FamilyId::new(0x0100_0000);
    pub const SETUP: FamilyId = FamilyId::new(0x0200_0000);
    pub const ANIMATION: FamilyId = FamilyId::new(0x0300_0000);
    pub const PALETTE: FamilyId = FamilyId::new(0x0400_0000);
    pub const SURFACE_TEXTURE: FamilyId = FamilyId::new(0x0500_0000);
    pub const TEXTURE: FamilyId = FamilyId::new(0x0600_0000);
    pub const SURFACE: FamilyId = FamilyId::new(0x0800_0000);
    pub const MOTION_TABLE: FamilyId = FamilyId::new(0x0900_0000);
    pub const WAVE: FamilyId = FamilyId::new(0x0A00_0000);
    pub const ENVIRONMENT: FamilyId = FamilyId::new(0x0D00_0000);
    pub const CHAR_GEN: FamilyId = FamilyId::new(0x0E00_0002);
    pub const SKILL_TABLE: FamilyId = FamilyId::new(0x0E00_0004);
    pub const CHAT_POSE_TABLE: FamilyId = FamilyId::new(0x0E00_0007);
    pub const SPELL_TABLE: FamilyId = FamilyId::new(0x0E00_000E);
    pub const SPELL_COMPONENT_TABLE: FamilyId = FamilyId::new(0x0E00_000F);
    pub const XP_TABLE: FamilyId = FamilyId::new(0x0E00_0018);
    pub const QUALITY_FILTER: FamilyId = FamilyId::new(0x0E01_0000);
    pub const PALETTE_SET: FamilyId = FamilyId::new(0x0F00_0000);
    pub const CLOTHING: FamilyId = FamilyId::new(0x1000_0000);
    pub const GFX_OBJ_DEGRADE_INFO: FamilyId = FamilyId::new(0x1100_0000);
    pub const SCENE: FamilyId = FamilyId::new(0x1200_0000);
    pub const REGION: FamilyId = FamilyId::new(0x1300_0000);
    pub const MATERIAL: FamilyId = FamilyId::new(0x1600_0000);
    pub const SOUND_TABLE: FamilyId = FamilyId::new(0x2000_0000);
    pub const UI_LAYOUT: FamilyId = FamilyId::new(0x2100_0000);
    pub const ENUM_MAPPER: FamilyId = FamilyId::new(0x2200_0000);
    pub const STRING_TABLE: FamilyId = FamilyId::new(0x2300_0000);
    pub const DID_MAPPER: FamilyId = FamilyId::new(0x2500_0000);
    pub const DUAL_DID_MAPPER: FamilyId = FamilyId::new(0x2700_0000);
    pub const COMBAT_TABLE: FamilyId = FamilyId::new(0x3000_0000);
    pub const LANGUAGE_STRING: FamilyId = FamilyId::new(0x3100_0000);
    pub const PARTICLE_EMITTER: FamilyId = FamilyId::new(0x3200_0000);
    pub const PHYSICS_SCRIPT: FamilyId = FamilyId::new(0x3300_0000);
    pub const PHYSICS_SCRIPT_TABLE: FamilyId = FamilyId::new(0x3400_0000);
    pub const MASTER_PROPERTY: FamilyId = FamilyId::new(0x3900_0000);
    pub const FONT: FamilyId = FamilyId::new(0x4000_0000);
    pub const LANGUAGE_INFO: FamilyId = FamilyId::new(0x4100_0000);
}

/// Id range of a range family and the decoder for its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub decoder: RecordType,
    /// Low bits that enumerate members; the family occupies
    /// `[family_id, family_id | mask]`.
    pub mask: u32,
}

impl RangeSpec {
    const fn wide(decoder: RecordType) -> Self {
        Self {
            decoder,
            mask: FamilyId::DEFAULT_RANGE_MASK,
        }
    }
}

/// How a family's records are organized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyCategory {
    /// One record, shown whole.
    SingleObject { record_type: RecordType },
    /// One record holding a keyed collection, listed entry by entry.
    DictionaryCollection { record_type: RecordType },
    /// One record holding several named collections.
    CompositeSubtypes {
        record_type: RecordType,
        subtypes: &'static [&'static str],
    },
    /// Many records in a contiguous id range, listed lazily.
    RangeCollection(RangeSpec),
}

impl FamilyCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleObject { .. } => "single",
            Self::DictionaryCollection { .. } => "dictionary",
            Self::CompositeSubtypes { .. } => "composite",
            Self::RangeCollection(_) => "range",
        }
    }
}

/// Static description of one record family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyDescriptor {
    pub family_id: FamilyId,
    pub name: &'static str,
    pub category: FamilyCategory,
}

impl FamilyDescriptor {
    /// Decoder for members of a range family.
    pub fn range(&self) -> Option<RangeSpec> {
        match self.category {
            FamilyCategory::RangeCollection(spec) => Some(spec),
            _ => None,
        }
    }

    /// Record type of the family's single record, for non-range families.
    pub fn record_type(&self) -> Option<RecordType> {
        match self.category {
            FamilyCategory::SingleObject { record_type }
            | FamilyCategory::DictionaryCollection { record_type }
            | FamilyCategory::CompositeSubtypes { record_type, .. } => Some(record_type),
            FamilyCategory::RangeCollection(_) => None,
        }
    }
}

impl fmt::Display for FamilyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.family_id, self.name, self.category.as_str())
    }
}

const fn range(family_id: FamilyId, name: &'static str, decoder: RecordType) -> FamilyDescriptor {
    FamilyDescriptor {
        family_id,
        name,
        category: FamilyCategory::RangeCollection(RangeSpec::wide(decoder)),
    }
}

/// Known families, sorted by id.
static FAMILIES: &[FamilyDescriptor] = &[
    range(family::GFX_OBJ, "graphics-objects", RecordType::GfxObj),
    range(family::SETUP, "setups", RecordType::Setup),
    range(family::ANIMATION, "animations", RecordType::Animation),
    range(family::PALETTE, "palettes", RecordType::Palette),
    range(family::SURFACE_TEXTURE, "surface-textures", RecordType::SurfaceTexture),
    range(family::TEXTURE, "textures", RecordType::Texture),
    range(family::SURFACE, "surfaces", RecordType::Surface),
    range(family::MOTION_TABLE, "motion-tables", RecordType::MotionTable),
    range(family::WAVE, "sounds", RecordType::Wave),
    range(family::ENVIRONMENT, "environments", RecordType::Environment),
    FamilyDescriptor {
        family_id: family::CHAR_GEN,
        name: "char-gen",
        category: FamilyCategory::CompositeSubtypes {
            record_type: RecordType::CharGen,
            subtypes: &["heritage-groups", "starting-areas"],
        },
    },
    FamilyDescriptor {
        family_id: family::SKILL_TABLE,
        name: "skills",
        category: FamilyCategory::DictionaryCollection {
            record_type: RecordType::SkillTable,
        },
    },
    FamilyDescriptor {
        family_id: family::CHAT_POSE_TABLE,
        name: "chat-poses",
        category: FamilyCategory::CompositeSubtypes {
            record_type: RecordType::ChatPoseTable,
            subtypes: &["poses", "emotes"],
        },
    },
    FamilyDescriptor {
        family_id: family::SPELL_TABLE,
        name: "spells",
        category: FamilyCategory::DictionaryCollection {
            record_type: RecordType::SpellTable,
        },
    },
    FamilyDescriptor {
        family_id: family::SPELL_COMPONENT_TABLE,
        name: "spell-components",
        category: FamilyCategory::DictionaryCollection {
            record_type: RecordType::SpellComponentTable,
        },
    },
    FamilyDescriptor {
        family_id: family::XP_TABLE,
        name: "experience",
        category: FamilyCategory::SingleObject {
            record_type: RecordType::XpTable,
        },
    },
    // Shares its top byte with the tables above, so only the low 16 bits
    // enumerate members.
    FamilyDescriptor {
        family_id: family::QUALITY_FILTER,
        name: "quality-filters",
        category: FamilyCategory::RangeCollection(RangeSpec {
            decoder: RecordType::QualityFilter,
            mask: 0x0000_FFFF,
        }),
    },
    range(family::PALETTE_SET, "palette-sets", RecordType::PaletteSet),
    range(family::CLOTHING, "clothing", RecordType::Clothing),
    range(family::GFX_OBJ_DEGRADE_INFO, "degrade-info", RecordType::GfxObjDegradeInfo),
    range(family::SCENE, "scenes", RecordType::Scene),
    range(family::REGION, "regions", RecordType::Region),
    range(family::MATERIAL, "materials", RecordType::Material),
    range(family::SOUND_TABLE, "sound-tables", RecordType::SoundTable),
    range(family::UI_LAYOUT, "ui-layouts", RecordType::UiLayout),
    range(family::ENUM_MAPPER, "enum-mappers", RecordType::EnumMapper),
    range(family::STRING_TABLE, "string-tables", RecordType::StringTable),
    range(family::DID_MAPPER, "did-mappers", RecordType::DidMapper),
    range(family::DUAL_DID_MAPPER, "dual-did-mappers", RecordType::DualDidMapper),
    range(family::COMBAT_TABLE, "combat-tables", RecordType::CombatTable),
    range(family::LANGUAGE_STRING, "language-strings", RecordType::LanguageString),
    range(family::PARTICLE_EMITTER, "particle-emitters", RecordType::ParticleEmitter),
    range(family::PHYSICS_SCRIPT, "physics-scripts", RecordType::PhysicsScript),
    range(family::PHYSICS_SCRIPT_TABLE, "physics-script-tables", RecordType::PhysicsScriptTable),
    range(family::MASTER_PROPERTY, "master-properties", RecordType::MasterProperty),
    range(family::FONT, "fonts", RecordType::Font),
    range(family::LANGUAGE_INFO, "language-info", RecordType::LanguageInfo),
];

/// All known families, sorted by id.
pub fn families() -> &'static [FamilyDescriptor] {
    FAMILIES
}

/// Look up a family by exact id.
///
/// `None` is an expected outcome: the caller shows the id as unsupported.
///
/// # Example
///
/// ```
/// use datlens_common::FamilyId;
/// use datlens_resolve::classifier::{classify, FamilyCategory};
///
/// let spells = classify(FamilyId::new(0x0E00_000E)).unwrap();
/// assert!(matches!(spells.category, FamilyCategory::DictionaryCollection { .. }));
/// assert!(classify(FamilyId::new(0x0E00_0001)).is_none());
/// ```
pub fn classify(family_id: FamilyId) -> Option<&'static FamilyDescriptor> {
    FAMILIES
        .binary_search_by_key(&family_id, |d| d.family_id)
        .ok()
        .map(|index| &FAMILIES[index])
}

/// Decoder registered for members of range family `origin`.
pub fn decoder_for(origin: FamilyId) -> Option<RecordType> {
    classify(origin).and_then(FamilyDescriptor::range).map(|spec| spec.decoder)
}
