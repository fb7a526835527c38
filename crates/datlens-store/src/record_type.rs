//! Record decoder tags.

use std::fmt;

/// The concrete record type a body is decoded as.
///
/// The store has no schema, so the caller always names the type it expects
/// when reading a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordType {
    // Single-record tables.
    SpellTable,
    SpellComponentTable,
    SkillTable,
    CharGen,
    XpTable,
    ChatPoseTable,

    // Range family members with dedicated decoders.
    Palette,
    SurfaceTexture,
    LanguageString,
    Landblock,

    // Range family members kept as raw bodies.
    GfxObj,
    Setup,
    Animation,
    Texture,
    Surface,
    MotionTable,
    Wave,
    Environment,
    PaletteSet,
    Clothing,
    GfxObjDegradeInfo,
    Scene,
    Region,
    Material,
    SoundTable,
    UiLayout,
    EnumMapper,
    StringTable,
    DidMapper,
    DualDidMapper,
    CombatTable,
    ParticleEmitter,
    PhysicsScript,
    PhysicsScriptTable,
    MasterProperty,
    Font,
    LanguageInfo,
    QualityFilter,
    LandblockInfo,
}

impl RecordType {
    /// Get the string name for this record type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpellTable => "SpellTable",
            Self::SpellComponentTable => "SpellComponentTable",
            Self::SkillTable => "SkillTable",
            Self::CharGen => "CharGen",
            Self::XpTable => "XpTable",
            Self::ChatPoseTable => "ChatPoseTable",
            Self::Palette => "Palette",
            Self::SurfaceTexture => "SurfaceTexture",
            Self::LanguageString => "LanguageString",
            Self::Landblock => "Landblock",
            Self::GfxObj => "GfxObj",
            Self::Setup => "Setup",
            Self::Animation => "Animation",
            Self::Texture => "Texture",
            Self::Surface => "Surface",
            Self::MotionTable => "MotionTable",
            Self::Wave => "Wave",
            Self::Environment => "Environment",
            Self::PaletteSet => "PaletteSet",
            Self::Clothing => "Clothing",
            Self::GfxObjDegradeInfo => "GfxObjDegradeInfo",
            Self::Scene => "Scene",
            Self::Region => "Region",
            Self::Material => "Material",
            Self::SoundTable => "SoundTable",
            Self::UiLayout => "UiLayout",
            Self::EnumMapper => "EnumMapper",
            Self::StringTable => "StringTable",
            Self::DidMapper => "DidMapper",
            Self::DualDidMapper => "DualDidMapper",
            Self::CombatTable => "CombatTable",
            Self::ParticleEmitter => "ParticleEmitter",
            Self::PhysicsScript => "PhysicsScript",
            Self::PhysicsScriptTable => "PhysicsScriptTable",
            Self::MasterProperty => "MasterProperty",
            Self::Font => "Font",
            Self::LanguageInfo => "LanguageInfo",
            Self::QualityFilter => "QualityFilter",
            Self::LandblockInfo => "LandblockInfo",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
