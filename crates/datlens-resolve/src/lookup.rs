//! Cross-reference lookup tables.
//!
//! Records refer to skills, spells, components and character-generation data
//! by id. The builder loads each auxiliary table independently and keeps the
//! names it finds; a table that cannot be loaded is simply left out.

use std::fmt;
use std::hash::BuildHasherDefault;

use datlens_common::FamilyId;
use datlens_store::{Record, RecordType, StoreKind};
use rustc_hash::FxHasher;

use crate::classifier::family;
use crate::error::{ResolveError, Result};
use crate::registry::Session;

type FxHashMap<K, V> = hashbrown::HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Key to display-name map for one auxiliary table.
pub type NameTable = FxHashMap<u32, String>;

/// The auxiliary tables the builder knows how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum LookupTable {
    Skills,
    Spells,
    Components,
    /// Keyed by position in the character-generation sequence.
    StartingAreas,
    HeritageGroups,
}

impl LookupTable {
    pub const ALL: [LookupTable; 5] = [
        Self::Skills,
        Self::Spells,
        Self::Components,
        Self::StartingAreas,
        Self::HeritageGroups,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skills => "skills",
            Self::Spells => "spells",
            Self::Components => "components",
            Self::StartingAreas => "starting-areas",
            Self::HeritageGroups => "heritage-groups",
        }
    }

    /// The family whose record this table is built from.
    pub fn source_family(&self) -> FamilyId {
        match self {
            Self::Skills => family::SKILL_TABLE,
            Self::Spells => family::SPELL_TABLE,
            Self::Components => family::SPELL_COMPONENT_TABLE,
            Self::StartingAreas | Self::HeritageGroups => family::CHAR_GEN,
        }
    }

    pub fn record_type(&self) -> RecordType {
        match self {
            Self::Skills => RecordType::SkillTable,
            Self::Spells => RecordType::SpellTable,
            Self::Components => RecordType::SpellComponentTable,
            Self::StartingAreas | Self::HeritageGroups => RecordType::CharGen,
        }
    }

    /// Names from a decoded source record. Unnamed entries are skipped.
    fn extract(&self, record: &Record) -> NameTable {
        fn named<'a>(entries: impl Iterator<Item = (u32, &'a str)>) -> NameTable {
            entries
                .filter(|(_, name)| !name.trim().is_empty())
                .map(|(key, name)| (key, name.to_string()))
                .collect()
        }

        match (self, record) {
            (Self::Skills, Record::SkillTable(t)) => named(t.skills.iter().map(|(k, s)| (*k, s.name.as_str()))),
            (Self::Spells, Record::SpellTable(t)) => named(t.spells.iter().map(|(k, s)| (*k, s.name.as_str()))),
            (Self::Components, Record::SpellComponentTable(t)) => {
                named(t.components.iter().map(|(k, c)| (*k, c.name.as_str())))
            }
            (Self::StartingAreas, Record::CharGen(c)) => named(
                c.starting_areas
                    .iter()
                    .enumerate()
                    .map(|(index, area)| (index as u32, area.name.as_str())),
            ),
            (Self::HeritageGroups, Record::CharGen(c)) => {
                named(c.heritage_groups.iter().map(|(k, h)| (*k, h.name.as_str())))
            }
            _ => NameTable::default(),
        }
    }
}

impl fmt::Display for LookupTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which auxiliary tables the builder attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSources {
    tables: Vec<LookupTable>,
}

impl LookupSources {
    /// Attempt only the given tables.
    pub fn only(tables: impl IntoIterator<Item = LookupTable>) -> Self {
        let mut tables: Vec<_> = tables.into_iter().collect();
        tables.sort_unstable();
        tables.dedup();
        Self { tables }
    }

    /// Attempt nothing.
    pub fn none() -> Self {
        Self { tables: Vec::new() }
    }

    pub fn tables(&self) -> &[LookupTable] {
        &self.tables
    }

    pub fn contains(&self, table: LookupTable) -> bool {
        self.tables.contains(&table)
    }

    /// Tables grouped by the family they are read from, so each source
    /// record is read once.
    fn by_family(&self) -> Vec<(FamilyId, RecordType, Vec<LookupTable>)> {
        let mut groups: Vec<(FamilyId, RecordType, Vec<LookupTable>)> = Vec::new();
        for &table in &self.tables {
            match groups.iter_mut().find(|(f, _, _)| *f == table.source_family()) {
                Some((_, _, tables)) => tables.push(table),
                None => groups.push((table.source_family(), table.record_type(), vec![table])),
            }
        }
        groups
    }
}

impl Default for LookupSources {
    fn default() -> Self {
        Self::only(LookupTable::ALL)
    }
}

/// Union of the lookup tables that could be built for one selection.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LookupContext {
    tables: FxHashMap<LookupTable, NameTable>,
}

impl LookupContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one table.
    pub fn insert(&mut self, table: LookupTable, names: NameTable) {
        self.tables.insert(table, names);
    }

    pub fn get(&self, table: LookupTable) -> Option<&NameTable> {
        self.tables.get(&table)
    }

    pub fn contains(&self, table: LookupTable) -> bool {
        self.tables.contains_key(&table)
    }

    /// Display name for `key`, if the table was built and names it.
    pub fn name(&self, table: LookupTable, key: u32) -> Option<&str> {
        self.tables.get(&table)?.get(&key).map(String::as_str)
    }

    /// Display name for `key`, falling back to the raw key.
    pub fn display(&self, table: LookupTable, key: u32) -> String {
        match self.name(table, key) {
            Some(name) => name.to_string(),
            None => key.to_string(),
        }
    }

    /// Built tables and their sizes, in table order.
    pub fn summary(&self) -> Vec<(LookupTable, usize)> {
        let mut summary: Vec<_> = self.tables.iter().map(|(t, names)| (*t, names.len())).collect();
        summary.sort_unstable();
        summary
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Read one auxiliary source record.
fn load_source(session: &Session, family_id: FamilyId, record_type: RecordType, table: LookupTable) -> Result<Record> {
    match session.store().read_record(family_id.get(), record_type) {
        Ok(Some(record)) => Ok(record),
        Ok(None) => Err(ResolveError::LookupSourceUnavailable {
            table,
            detail: format!("{} not present", family_id),
        }),
        Err(e) => Err(ResolveError::LookupSourceUnavailable {
            table,
            detail: e.to_string(),
        }),
    }
}

/// Build every table a source record can produce, or nothing.
fn build_group(session: &Session, group: &(FamilyId, RecordType, Vec<LookupTable>)) -> Vec<(LookupTable, NameTable)> {
    let (family_id, record_type, tables) = group;
    match load_source(session, *family_id, *record_type, tables[0]) {
        Ok(record) => tables.iter().map(|t| (*t, t.extract(&record))).collect(),
        Err(e) => {
            tracing::warn!(session = %session.id(), family = %family_id, error = %e, "lookup source skipped");
            Vec::new()
        }
    }
}

/// Build the lookup context for a session.
///
/// Each source is evaluated independently; one that is missing or fails to
/// decode is logged and omitted. Cell stores carry no auxiliary tables.
pub fn build_context(session: &Session, sources: &LookupSources) -> LookupContext {
    let mut context = LookupContext::new();
    if session.kind() != StoreKind::Portal {
        return context;
    }

    let groups = sources.by_family();

    #[cfg(feature = "parallel")]
    let built: Vec<Vec<(LookupTable, NameTable)>> = {
        use rayon::prelude::*;
        groups.par_iter().map(|group| build_group(session, group)).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let built: Vec<Vec<(LookupTable, NameTable)>> = groups.iter().map(|group| build_group(session, group)).collect();

    for (table, names) in built.into_iter().flatten() {
        context.insert(table, names);
    }

    tracing::debug!(session = %session.id(), tables = context.len(), "built lookup context");
    context
}
