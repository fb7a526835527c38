//! Character generation data.

use std::collections::BTreeMap;

use datlens_common::{BinaryReader, BinaryWriter};

use super::{insert_unique, Pack, Unpack};
use crate::RecordType;

/// A place new characters can begin.
///
/// Starting areas carry no id of their own. Other records refer to them by
/// their position in [`CharGen::starting_areas`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StartingArea {
    pub name: String,
    /// Cell ids of the possible spawn locations.
    pub locations: Vec<u32>,
}

/// A playable heritage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeritageGroup {
    pub name: String,
    pub icon: u32,
    pub attribute_credits: u32,
    pub skill_credits: u32,
    /// Positional indices into [`CharGen::starting_areas`].
    pub starting_areas: Vec<u32>,
    /// Skill ids granted for free.
    pub skills: Vec<u32>,
}

/// Character generation tables.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharGen {
    pub id: u32,
    pub starting_areas: Vec<StartingArea>,
    pub heritage_groups: BTreeMap<u32, HeritageGroup>,
}

impl Unpack for CharGen {
    const RECORD_TYPE: RecordType = RecordType::CharGen;

    fn unpack_body(id: u32, reader: &mut BinaryReader<'_>) -> datlens_common::Result<Self> {
        let area_count = reader.read_count(2 + 4)?;
        let mut starting_areas = Vec::with_capacity(area_count);
        for _ in 0..area_count {
            starting_areas.push(StartingArea {
                name: reader.read_pstring()?,
                locations: reader.read_u32_vec()?,
            });
        }

        let group_count = reader.read_count(4 + 2 + 4 * 5)?;
        let mut heritage_groups = BTreeMap::new();
        for _ in 0..group_count {
            let key = reader.read_u32()?;
            let group = HeritageGroup {
                name: reader.read_pstring()?,
                icon: reader.read_u32()?,
                attribute_credits: reader.read_u32()?,
                skill_credits: reader.read_u32()?,
                starting_areas: reader.read_u32_vec()?,
                skills: reader.read_u32_vec()?,
            };
            insert_unique(&mut heritage_groups, key, group)?;
        }

        Ok(Self {
            id,
            starting_areas,
            heritage_groups,
        })
    }
}

impl Pack for CharGen {
    fn id(&self) -> u32 {
        self.id
    }

    fn pack_body(&self, writer: &mut BinaryWriter) {
        writer.write_u32(self.starting_areas.len() as u32);
        for area in &self.starting_areas {
            writer.write_pstring(&area.name);
            writer.write_u32_slice(&area.locations);
        }

        writer.write_u32(self.heritage_groups.len() as u32);
        for (key, group) in &self.heritage_groups {
            writer.write_u32(*key);
            writer.write_pstring(&group.name);
            writer.write_u32(group.icon);
            writer.write_u32(group.attribute_credits);
            writer.write_u32(group.skill_credits);
            writer.write_u32_slice(&group.starting_areas);
            writer.write_u32_slice(&group.skills);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{pack, unpack};

    #[test]
    fn test_starting_area_order_is_preserved() {
        let chargen = CharGen {
            id: 0x0E00_0002,
            starting_areas: ["Shoushi", "Yaraq", "Holtburg", "Sanamar"]
                .iter()
                .map(|name| StartingArea {
                    name: name.to_string(),
                    locations: vec![0xDE51_001D],
                })
                .collect(),
            heritage_groups: BTreeMap::new(),
        };

        let decoded: CharGen = unpack(0x0E00_0002, &pack(&chargen)).unwrap();
        let names: Vec<_> = decoded.starting_areas.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Shoushi", "Yaraq", "Holtburg", "Sanamar"]);
    }

    #[test]
    fn test_repeated_heritage_key_rejected() {
        let mut writer = BinaryWriter::new();
        writer.write_u32(0x0E00_0002);
        writer.write_u32(0);
        writer.write_u32(2);
        for name in ["Aluvian", "Gharu'ndim"] {
            writer.write_u32(1);
            writer.write_pstring(name);
            writer.write_u32(0);
            writer.write_u32(330);
            writer.write_u32(52);
            writer.write_u32_slice(&[]);
            writer.write_u32_slice(&[]);
        }

        assert!(unpack::<CharGen>(0x0E00_0002, writer.as_bytes()).is_err());
    }
}
