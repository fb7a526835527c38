//! Skill table.

use std::collections::BTreeMap;

use datlens_common::{BinaryReader, BinaryWriter};

use super::{insert_unique, Pack, Unpack};
use crate::RecordType;

/// One skill definition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillBase {
    pub name: String,
    pub description: String,
    pub icon: u32,
    pub trained_cost: i32,
    pub specialized_cost: i32,
    pub category: u32,
    /// Whether the skill can be picked during character creation.
    pub chargen_use: bool,
}

/// Skills, keyed by skill id.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillTable {
    pub id: u32,
    pub skills: BTreeMap<u32, SkillBase>,
}

impl Unpack for SkillTable {
    const RECORD_TYPE: RecordType = RecordType::SkillTable;

    fn unpack_body(id: u32, reader: &mut BinaryReader<'_>) -> datlens_common::Result<Self> {
        let count = reader.read_count(4 + 2 + 2 + 4 * 4 + 1)?;
        let mut skills = BTreeMap::new();
        for _ in 0..count {
            let key = reader.read_u32()?;
            let skill = SkillBase {
                name: reader.read_pstring()?,
                description: reader.read_pstring()?,
                icon: reader.read_u32()?,
                trained_cost: reader.read_i32()?,
                specialized_cost: reader.read_i32()?,
                category: reader.read_u32()?,
                chargen_use: reader.read_bool()?,
            };
            insert_unique(&mut skills, key, skill)?;
        }
        Ok(Self { id, skills })
    }
}

impl Pack for SkillTable {
    fn id(&self) -> u32 {
        self.id
    }

    fn pack_body(&self, writer: &mut BinaryWriter) {
        writer.write_u32(self.skills.len() as u32);
        for (key, skill) in &self.skills {
            writer.write_u32(*key);
            writer.write_pstring(&skill.name);
            writer.write_pstring(&skill.description);
            writer.write_u32(skill.icon);
            writer.write_i32(skill.trained_cost);
            writer.write_i32(skill.specialized_cost);
            writer.write_u32(skill.category);
            writer.write_bool(skill.chargen_use);
        }
    }
}
