//! Spell catalog and spell component tables.

use std::collections::BTreeMap;
use std::fmt;

use datlens_common::{BinaryReader, BinaryWriter, Error as CommonError};

use super::{insert_unique, Pack, Unpack};
use crate::RecordType;

/// School of magic a spell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum MagicSchool {
    WarMagic = 1,
    LifeMagic = 2,
    ItemEnchantment = 3,
    CreatureEnchantment = 4,
    VoidMagic = 5,
}

impl MagicSchool {
    /// All schools in discriminant order.
    pub const ALL: [MagicSchool; 5] = [
        Self::WarMagic,
        Self::LifeMagic,
        Self::ItemEnchantment,
        Self::CreatureEnchantment,
        Self::VoidMagic,
    ];

    /// Parse from the stored discriminant.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::WarMagic),
            2 => Some(Self::LifeMagic),
            3 => Some(Self::ItemEnchantment),
            4 => Some(Self::CreatureEnchantment),
            5 => Some(Self::VoidMagic),
            _ => None,
        }
    }

    /// Get the display name for this school.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WarMagic => "War Magic",
            Self::LifeMagic => "Life Magic",
            Self::ItemEnchantment => "Item Enchantment",
            Self::CreatureEnchantment => "Creature Enchantment",
            Self::VoidMagic => "Void Magic",
        }
    }
}

impl fmt::Display for MagicSchool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MagicSchool {
    type Err = String;

    /// Accepts the display name or a compact form (`war`, `life`, `item`,
    /// `creature`, `void`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|school| {
                let name = school.as_str().to_ascii_lowercase();
                name == lowered || name.split(' ').next() == Some(lowered.as_str())
            })
            .ok_or_else(|| format!("unknown magic school: {}", s))
    }
}

/// One spell in the catalog.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellBase {
    pub name: String,
    pub description: String,
    pub school: MagicSchool,
    pub icon: u32,
    pub category: u32,
    pub base_mana: u32,
    pub base_range_constant: f32,
    pub power: u32,
    pub duration: f32,
    /// Spell component ids, in casting order.
    pub components: Vec<u32>,
}

impl SpellBase {
    fn unpack(reader: &mut BinaryReader<'_>) -> datlens_common::Result<Self> {
        let name = reader.read_pstring()?;
        let description = reader.read_pstring()?;
        let raw_school = reader.read_u32()?;
        let school = MagicSchool::from_u32(raw_school).ok_or_else(|| CommonError::ExpectedValue {
            expected: "magic school 1..=5".to_string(),
            actual: raw_school.to_string(),
        })?;
        Ok(Self {
            name,
            description,
            school,
            icon: reader.read_u32()?,
            category: reader.read_u32()?,
            base_mana: reader.read_u32()?,
            base_range_constant: reader.read_f32()?,
            power: reader.read_u32()?,
            duration: reader.read_f32()?,
            components: reader.read_u32_vec()?,
        })
    }

    fn pack(&self, writer: &mut BinaryWriter) {
        writer.write_pstring(&self.name);
        writer.write_pstring(&self.description);
        writer.write_u32(self.school as u32);
        writer.write_u32(self.icon);
        writer.write_u32(self.category);
        writer.write_u32(self.base_mana);
        writer.write_f32(self.base_range_constant);
        writer.write_u32(self.power);
        writer.write_f32(self.duration);
        writer.write_u32_slice(&self.components);
    }
}

/// The spell catalog, keyed by spell id.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellTable {
    pub id: u32,
    pub spells: BTreeMap<u32, SpellBase>,
}

impl Unpack for SpellTable {
    const RECORD_TYPE: RecordType = RecordType::SpellTable;

    fn unpack_body(id: u32, reader: &mut BinaryReader<'_>) -> datlens_common::Result<Self> {
        // key + smallest possible spell
        let count = reader.read_count(4 + 2 + 2 + 4 * 7 + 4)?;
        let mut spells = BTreeMap::new();
        for _ in 0..count {
            let key = reader.read_u32()?;
            insert_unique(&mut spells, key, SpellBase::unpack(reader)?)?;
        }
        Ok(Self { id, spells })
    }
}

impl Pack for SpellTable {
    fn id(&self) -> u32 {
        self.id
    }

    fn pack_body(&self, writer: &mut BinaryWriter) {
        writer.write_u32(self.spells.len() as u32);
        for (key, spell) in &self.spells {
            writer.write_u32(*key);
            spell.pack(writer);
        }
    }
}

/// One spell component (scarabs, herbs, powders, potions, talismans, tapers).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellComponent {
    pub name: String,
    pub category: u32,
    pub icon: u32,
    pub component_type: u32,
    pub time: f32,
    /// Words spoken when the component is used.
    pub text: String,
}

/// Spell components, keyed by component id.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellComponentTable {
    pub id: u32,
    pub components: BTreeMap<u32, SpellComponent>,
}

impl Unpack for SpellComponentTable {
    const RECORD_TYPE: RecordType = RecordType::SpellComponentTable;

    fn unpack_body(id: u32, reader: &mut BinaryReader<'_>) -> datlens_common::Result<Self> {
        let count = reader.read_count(4 + 2 + 4 * 4 + 2)?;
        let mut components = BTreeMap::new();
        for _ in 0..count {
            let key = reader.read_u32()?;
            let component = SpellComponent {
                name: reader.read_pstring()?,
                category: reader.read_u32()?,
                icon: reader.read_u32()?,
                component_type: reader.read_u32()?,
                time: reader.read_f32()?,
                text: reader.read_pstring()?,
            };
            insert_unique(&mut components, key, component)?;
        }
        Ok(Self { id, components })
    }
}

impl Pack for SpellComponentTable {
    fn id(&self) -> u32 {
        self.id
    }

    fn pack_body(&self, writer: &mut BinaryWriter) {
        writer.write_u32(self.components.len() as u32);
        for (key, component) in &self.components {
            writer.write_u32(*key);
            writer.write_pstring(&component.name);
            writer.write_u32(component.category);
            writer.write_u32(component.icon);
            writer.write_u32(component.component_type);
            writer.write_f32(component.time);
            writer.write_pstring(&component.text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{pack, unpack};

    fn spell(name: &str, school: MagicSchool) -> SpellBase {
        SpellBase {
            name: name.to_string(),
            description: String::new(),
            school,
            icon: 0x0600_1000,
            category: 1,
            base_mana: 10,
            base_range_constant: 5.0,
            power: 1,
            duration: 1800.0,
            components: vec![1, 2],
        }
    }

    #[test]
    fn test_school_from_str() {
        assert_eq!("war".parse::<MagicSchool>().unwrap(), MagicSchool::WarMagic);
        assert_eq!(
            "Creature Enchantment".parse::<MagicSchool>().unwrap(),
            MagicSchool::CreatureEnchantment
        );
        assert!("fire".parse::<MagicSchool>().is_err());
    }

    #[test]
    fn test_spell_table_decodes_in_key_order() {
        let mut table = SpellTable {
            id: 0x0E00_000E,
            spells: BTreeMap::new(),
        };
        table.spells.insert(2, spell("Strength Other I", MagicSchool::CreatureEnchantment));
        table.spells.insert(1, spell("Flame Bolt I", MagicSchool::WarMagic));

        let decoded: SpellTable = unpack(0x0E00_000E, &pack(&table)).unwrap();
        let keys: Vec<_> = decoded.spells.keys().copied().collect();
        assert_eq!(keys, vec![1, 2]);
        assert_eq!(decoded.spells[&1].name, "Flame Bolt I");
    }

    #[test]
    fn test_bad_school_rejected() {
        let mut writer = BinaryWriter::new();
        writer.write_u32(0x0E00_000E);
        writer.write_u32(1);
        writer.write_u32(7);
        writer.write_pstring("Broken");
        writer.write_pstring("");
        writer.write_u32(99);
        for _ in 0..7 {
            writer.write_u32(0);
        }
        writer.write_u32(0);

        assert!(unpack::<SpellTable>(0x0E00_000E, writer.as_bytes()).is_err());
    }

    #[test]
    fn test_repeated_spell_key_rejected() {
        let mut writer = BinaryWriter::new();
        writer.write_u32(0x0E00_000E);
        writer.write_u32(2);
        writer.write_u32(27);
        spell("Flame Bolt I", MagicSchool::WarMagic).pack(&mut writer);
        writer.write_u32(27);
        spell("Flame Bolt II", MagicSchool::WarMagic).pack(&mut writer);

        let err = unpack::<SpellTable>(0x0E00_000E, writer.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("repeated key 27"), "{}", err);
    }

    #[test]
    fn test_repeated_component_key_rejected() {
        let mut writer = BinaryWriter::new();
        writer.write_u32(0x0E00_000F);
        writer.write_u32(2);
        for name in ["Lead Scarab", "Iron Scarab"] {
            writer.write_u32(1);
            writer.write_pstring(name);
            for _ in 0..3 {
                writer.write_u32(0);
            }
            writer.write_f32(0.5);
            writer.write_pstring("");
        }

        assert!(unpack::<SpellComponentTable>(0x0E00_000F, writer.as_bytes()).is_err());
    }
}
