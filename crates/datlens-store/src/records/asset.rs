//! Members of range families.

use datlens_common::{BinaryReader, BinaryWriter, Error as CommonError};

use super::{Pack, Unpack};
use crate::RecordType;

/// Vertices along one edge of a landblock's height grid.
pub const LANDBLOCK_SIDE: usize = 9;

const LANDBLOCK_VERTICES: usize = LANDBLOCK_SIDE * LANDBLOCK_SIDE;

/// A range family member kept as its raw body.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AssetRecord {
    pub id: u32,
    pub record_type: RecordType,
    /// Body bytes after the leading id.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub data: Vec<u8>,
}

impl Pack for AssetRecord {
    fn id(&self) -> u32 {
        self.id
    }

    fn pack_body(&self, writer: &mut BinaryWriter) {
        writer.write_bytes(&self.data);
    }
}

/// ARGB color palette.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Palette {
    pub id: u32,
    pub colors: Vec<u32>,
}

impl Unpack for Palette {
    const RECORD_TYPE: RecordType = RecordType::Palette;

    fn unpack_body(id: u32, reader: &mut BinaryReader<'_>) -> datlens_common::Result<Self> {
        Ok(Self {
            id,
            colors: reader.read_u32_vec()?,
        })
    }
}

impl Pack for Palette {
    fn id(&self) -> u32 {
        self.id
    }

    fn pack_body(&self, writer: &mut BinaryWriter) {
        writer.write_u32_slice(&self.colors);
    }
}

/// A surface texture: a set of texture ids at decreasing detail.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceTexture {
    pub id: u32,
    pub texture_type: u8,
    pub textures: Vec<u32>,
}

impl Unpack for SurfaceTexture {
    const RECORD_TYPE: RecordType = RecordType::SurfaceTexture;

    fn unpack_body(id: u32, reader: &mut BinaryReader<'_>) -> datlens_common::Result<Self> {
        Ok(Self {
            id,
            texture_type: reader.read_u8()?,
            textures: reader.read_u32_vec()?,
        })
    }
}

impl Pack for SurfaceTexture {
    fn id(&self) -> u32 {
        self.id
    }

    fn pack_body(&self, writer: &mut BinaryWriter) {
        writer.write_u8(self.texture_type);
        writer.write_u32_slice(&self.textures);
    }
}

/// A localized string.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LanguageString {
    pub id: u32,
    pub text: String,
}

impl Unpack for LanguageString {
    const RECORD_TYPE: RecordType = RecordType::LanguageString;

    fn unpack_body(id: u32, reader: &mut BinaryReader<'_>) -> datlens_common::Result<Self> {
        Ok(Self {
            id,
            text: reader.read_pstring()?,
        })
    }
}

impl Pack for LanguageString {
    fn id(&self) -> u32 {
        self.id
    }

    fn pack_body(&self, writer: &mut BinaryWriter) {
        writer.write_pstring(&self.text);
    }
}

/// Terrain for one landblock in the cell store.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Landblock {
    pub id: u32,
    pub has_objects: bool,
    /// Packed terrain type, road and scenery bits per vertex.
    pub terrain: Vec<u16>,
    /// Height-table index per vertex.
    pub heights: Vec<u8>,
}

impl Landblock {
    /// Landblock grid coordinates `(x, y)` from the id's top two bytes.
    pub fn coordinates(&self) -> (u8, u8) {
        ((self.id >> 24) as u8, (self.id >> 16) as u8)
    }
}

impl Unpack for Landblock {
    const RECORD_TYPE: RecordType = RecordType::Landblock;

    fn unpack_body(id: u32, reader: &mut BinaryReader<'_>) -> datlens_common::Result<Self> {
        let flags = reader.read_u32()?;
        if flags > 1 {
            return Err(CommonError::ExpectedValue {
                expected: "landblock flags 0 or 1".to_string(),
                actual: flags.to_string(),
            });
        }
        let terrain = (0..LANDBLOCK_VERTICES)
            .map(|_| reader.read_u16())
            .collect::<datlens_common::Result<Vec<_>>>()?;
        let heights = reader.read_bytes(LANDBLOCK_VERTICES)?.to_vec();
        Ok(Self {
            id,
            has_objects: flags == 1,
            terrain,
            heights,
        })
    }
}

impl Pack for Landblock {
    fn id(&self) -> u32 {
        self.id
    }

    fn pack_body(&self, writer: &mut BinaryWriter) {
        writer.write_u32(self.has_objects as u32);
        for i in 0..LANDBLOCK_VERTICES {
            writer.write_u16(self.terrain.get(i).copied().unwrap_or(0));
        }
        for i in 0..LANDBLOCK_VERTICES {
            writer.write_u8(self.heights.get(i).copied().unwrap_or(0));
        }
    }
}
