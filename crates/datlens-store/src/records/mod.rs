//! Typed records and their body codecs.
//!
//! Every stored body starts with the record's own 32-bit id, followed by the
//! type-specific payload. A body must be consumed exactly; leftover bytes mean
//! the body was decoded as the wrong type.

mod asset;
mod chargen;
mod chat;
mod skill;
mod spell;
mod xp;

pub use asset::{AssetRecord, Landblock, LanguageString, Palette, SurfaceTexture, LANDBLOCK_SIDE};
pub use chargen::{CharGen, HeritageGroup, StartingArea};
pub use chat::{ChatEmote, ChatPoseTable};
pub use skill::{SkillBase, SkillTable};
pub use spell::{MagicSchool, SpellBase, SpellComponent, SpellComponentTable, SpellTable};
pub use xp::XpTable;

use std::collections::btree_map::{BTreeMap, Entry};
use std::fmt;

use datlens_common::{BinaryReader, BinaryWriter, Error as CommonError};

use crate::{Error, RecordType, Result};

/// A record type with a structural decoder.
pub trait Unpack: Sized {
    /// Decoder tag for this type.
    const RECORD_TYPE: RecordType;

    /// Decode the payload that follows the leading id.
    fn unpack_body(id: u32, reader: &mut BinaryReader<'_>) -> datlens_common::Result<Self>;
}

/// A record type that can be written back to a body.
pub trait Pack {
    /// The record's own id.
    fn id(&self) -> u32;

    /// Encode the payload that follows the leading id.
    fn pack_body(&self, writer: &mut BinaryWriter);
}

/// Encode a record into a complete body, leading id included.
pub fn pack<T: Pack + ?Sized>(record: &T) -> Vec<u8> {
    let mut writer = BinaryWriter::new();
    writer.write_u32(record.id());
    record.pack_body(&mut writer);
    writer.into_inner()
}

/// Insert a decoded map entry. A key the body already used is an error.
pub(crate) fn insert_unique<K: Ord + fmt::Debug, V>(
    map: &mut BTreeMap<K, V>,
    key: K,
    value: V,
) -> datlens_common::Result<()> {
    match map.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(value);
            Ok(())
        }
        Entry::Occupied(slot) => Err(CommonError::ExpectedValue {
            expected: "unique key".to_string(),
            actual: format!("repeated key {:?}", slot.key()),
        }),
    }
}

/// Decode a complete body as `T`.
pub fn unpack<T: Unpack>(id: u32, body: &[u8]) -> Result<T> {
    let mut reader = read_header(id, T::RECORD_TYPE, body)?;
    let record =
        T::unpack_body(id, &mut reader).map_err(|e| Error::decode(id, T::RECORD_TYPE, e))?;
    if !reader.is_empty() {
        return Err(Error::decode(
            id,
            T::RECORD_TYPE,
            format!("{} trailing bytes", reader.remaining()),
        ));
    }
    Ok(record)
}

/// Validate the leading id and return a reader positioned after it.
fn read_header(id: u32, record_type: RecordType, body: &[u8]) -> Result<BinaryReader<'_>> {
    let mut reader = BinaryReader::new(body);
    let stored = reader
        .read_u32()
        .map_err(|e| Error::decode(id, record_type, e))?;
    if stored != id {
        return Err(Error::decode(
            id,
            record_type,
            format!("body belongs to {:#010x}", stored),
        ));
    }
    Ok(reader)
}

/// A decoded record of any type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "record"))]
pub enum Record {
    SpellTable(SpellTable),
    SpellComponentTable(SpellComponentTable),
    SkillTable(SkillTable),
    CharGen(CharGen),
    XpTable(XpTable),
    ChatPoseTable(ChatPoseTable),
    Palette(Palette),
    SurfaceTexture(SurfaceTexture),
    LanguageString(LanguageString),
    Landblock(Landblock),
    Asset(AssetRecord),
}

impl Record {
    /// Decode `body` as the record type named by `record_type`.
    pub fn decode(record_type: RecordType, id: u32, body: &[u8]) -> Result<Self> {
        let record = match record_type {
            RecordType::SpellTable => Self::SpellTable(unpack(id, body)?),
            RecordType::SpellComponentTable => Self::SpellComponentTable(unpack(id, body)?),
            RecordType::SkillTable => Self::SkillTable(unpack(id, body)?),
            RecordType::CharGen => Self::CharGen(unpack(id, body)?),
            RecordType::XpTable => Self::XpTable(unpack(id, body)?),
            RecordType::ChatPoseTable => Self::ChatPoseTable(unpack(id, body)?),
            RecordType::Palette => Self::Palette(unpack(id, body)?),
            RecordType::SurfaceTexture => Self::SurfaceTexture(unpack(id, body)?),
            RecordType::LanguageString => Self::LanguageString(unpack(id, body)?),
            RecordType::Landblock => Self::Landblock(unpack(id, body)?),
            raw => {
                let reader = read_header(id, raw, body)?;
                Self::Asset(AssetRecord {
                    id,
                    record_type: raw,
                    data: reader.remaining_bytes().to_vec(),
                })
            }
        };
        Ok(record)
    }

    /// The record's id.
    pub fn id(&self) -> u32 {
        match self {
            Self::SpellTable(r) => r.id,
            Self::SpellComponentTable(r) => r.id,
            Self::SkillTable(r) => r.id,
            Self::CharGen(r) => r.id,
            Self::XpTable(r) => r.id,
            Self::ChatPoseTable(r) => r.id,
            Self::Palette(r) => r.id,
            Self::SurfaceTexture(r) => r.id,
            Self::LanguageString(r) => r.id,
            Self::Landblock(r) => r.id,
            Self::Asset(r) => r.id,
        }
    }

    /// The type this record was decoded as.
    pub fn record_type(&self) -> RecordType {
        match self {
            Self::SpellTable(_) => RecordType::SpellTable,
            Self::SpellComponentTable(_) => RecordType::SpellComponentTable,
            Self::SkillTable(_) => RecordType::SkillTable,
            Self::CharGen(_) => RecordType::CharGen,
            Self::XpTable(_) => RecordType::XpTable,
            Self::ChatPoseTable(_) => RecordType::ChatPoseTable,
            Self::Palette(_) => RecordType::Palette,
            Self::SurfaceTexture(_) => RecordType::SurfaceTexture,
            Self::LanguageString(_) => RecordType::LanguageString,
            Self::Landblock(_) => RecordType::Landblock,
            Self::Asset(r) => r.record_type,
        }
    }

    /// Encode this record back into a body.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::SpellTable(r) => pack(r),
            Self::SpellComponentTable(r) => pack(r),
            Self::SkillTable(r) => pack(r),
            Self::CharGen(r) => pack(r),
            Self::XpTable(r) => pack(r),
            Self::ChatPoseTable(r) => pack(r),
            Self::Palette(r) => pack(r),
            Self::SurfaceTexture(r) => pack(r),
            Self::LanguageString(r) => pack(r),
            Self::Landblock(r) => pack(r),
            Self::Asset(r) => pack(r),
        }
    }
}
