//! Experience cost tables.

use datlens_common::{BinaryReader, BinaryWriter};

use super::{Pack, Unpack};
use crate::RecordType;

/// Cumulative experience costs, indexed by rank or level.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct XpTable {
    pub id: u32,
    pub attributes: Vec<u32>,
    pub vitals: Vec<u32>,
    pub trained_skills: Vec<u32>,
    pub specialized_skills: Vec<u32>,
    pub levels: Vec<u64>,
    /// Skill credits awarded on reaching each level.
    pub skill_credits: Vec<u32>,
}

impl Unpack for XpTable {
    const RECORD_TYPE: RecordType = RecordType::XpTable;

    fn unpack_body(id: u32, reader: &mut BinaryReader<'_>) -> datlens_common::Result<Self> {
        let attributes = reader.read_u32_vec()?;
        let vitals = reader.read_u32_vec()?;
        let trained_skills = reader.read_u32_vec()?;
        let specialized_skills = reader.read_u32_vec()?;
        let level_count = reader.read_count(8)?;
        let levels = (0..level_count)
            .map(|_| reader.read_u64())
            .collect::<datlens_common::Result<Vec<_>>>()?;
        let skill_credits = reader.read_u32_vec()?;
        Ok(Self {
            id,
            attributes,
            vitals,
            trained_skills,
            specialized_skills,
            levels,
            skill_credits,
        })
    }
}

impl Pack for XpTable {
    fn id(&self) -> u32 {
        self.id
    }

    fn pack_body(&self, writer: &mut BinaryWriter) {
        writer.write_u32_slice(&self.attributes);
        writer.write_u32_slice(&self.vitals);
        writer.write_u32_slice(&self.trained_skills);
        writer.write_u32_slice(&self.specialized_skills);
        writer.write_u32(self.levels.len() as u32);
        for &level in &self.levels {
            writer.write_u64(level);
        }
        writer.write_u32_slice(&self.skill_credits);
    }
}
