//! Chat poses and emotes.

use std::collections::BTreeMap;

use datlens_common::{BinaryReader, BinaryWriter};

use super::{insert_unique, Pack, Unpack};
use crate::RecordType;

/// Text shown to the actor and to onlookers for an emote.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChatEmote {
    pub my_emote: String,
    pub other_emote: String,
}

/// Pose aliases and emote texts, both keyed by command word.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChatPoseTable {
    pub id: u32,
    /// Command word to the canonical pose it maps to.
    pub poses: BTreeMap<String, String>,
    pub emotes: BTreeMap<String, ChatEmote>,
}

impl Unpack for ChatPoseTable {
    const RECORD_TYPE: RecordType = RecordType::ChatPoseTable;

    fn unpack_body(id: u32, reader: &mut BinaryReader<'_>) -> datlens_common::Result<Self> {
        let pose_count = reader.read_count(4)?;
        let mut poses = BTreeMap::new();
        for _ in 0..pose_count {
            let key = reader.read_pstring()?;
            let pose = reader.read_pstring()?;
            insert_unique(&mut poses, key, pose)?;
        }

        let emote_count = reader.read_count(6)?;
        let mut emotes = BTreeMap::new();
        for _ in 0..emote_count {
            let key = reader.read_pstring()?;
            let emote = ChatEmote {
                my_emote: reader.read_pstring()?,
                other_emote: reader.read_pstring()?,
            };
            insert_unique(&mut emotes, key, emote)?;
        }

        Ok(Self { id, poses, emotes })
    }
}

impl Pack for ChatPoseTable {
    fn id(&self) -> u32 {
        self.id
    }

    fn pack_body(&self, writer: &mut BinaryWriter) {
        writer.write_u32(self.poses.len() as u32);
        for (key, pose) in &self.poses {
            writer.write_pstring(key);
            writer.write_pstring(pose);
        }
        writer.write_u32(self.emotes.len() as u32);
        for (key, emote) in &self.emotes {
            writer.write_pstring(key);
            writer.write_pstring(&emote.my_emote);
            writer.write_pstring(&emote.other_emote);
        }
    }
}
