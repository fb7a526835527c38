//! Top-level resolution: navigation identifier in, typed content out.

use std::fmt;
use std::sync::Arc;

use datlens_common::FamilyId;
use datlens_store::records::{
    ChatEmote, HeritageGroup, SkillBase, SpellBase, SpellComponent, SpellTable, StartingArea,
};
use datlens_store::{Record, RecordType};

use crate::classifier::{self, FamilyCategory};
use crate::error::{ResolveError, Result};
use crate::identifier::{CollectionTag, NavigationId, SessionId};
use crate::lookup::{self, LookupContext, LookupSources};
use crate::materialize;
use crate::range::{self, EntryOrigin, RangeEntry};
use crate::registry::{Session, StoreRegistry};
use crate::selection::SelectionContext;

/// Key of a listing row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RowKey {
    /// A record id or a dictionary key.
    Id(u32),
    /// Position in an ordered sequence.
    Index(usize),
    /// A string key.
    Name(String),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Index(index) => write!(f, "{}", index),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// One element of a table collection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "item", rename_all = "kebab-case"))]
pub enum Item {
    Spell(SpellBase),
    Component(SpellComponent),
    Skill(SkillBase),
    HeritageGroup(HeritageGroup),
    StartingArea(StartingArea),
    ChatPose(String),
    ChatEmote(ChatEmote),
}

/// Value carried by a listing row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "state", content = "value", rename_all = "lowercase"))]
pub enum RowValue {
    /// A range member, possibly not loaded yet.
    Deferred(RangeEntry),
    /// An element already decoded with its table.
    Item(Item),
}

/// One row of a listing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Row {
    pub key: RowKey,
    pub label: String,
    pub value: RowValue,
}

impl Row {
    fn item(key: RowKey, name: &str, item: Item) -> Self {
        Self {
            label: format!("{}: {}", key, name),
            key,
            value: RowValue::Item(item),
        }
    }

    fn deferred(entry: RangeEntry) -> Self {
        Self {
            key: RowKey::Id(entry.id()),
            label: entry.label().to_string(),
            value: RowValue::Deferred(entry),
        }
    }

    /// The range entry behind a deferred row.
    pub fn entry(&self) -> Option<&RangeEntry> {
        match &self.value {
            RowValue::Deferred(entry) => Some(entry),
            RowValue::Item(_) => None,
        }
    }
}

/// What an identifier resolved to.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "shape", rename_all = "kebab-case"))]
pub enum ResolvedContent {
    /// One record, shown whole.
    Single { record: Arc<Record> },
    /// An ordered listing.
    Rows { rows: Vec<Row> },
    /// The listing could not be enumerated; sibling families are unaffected.
    ListingFailed { origin: EntryOrigin, message: String },
}

/// Result of resolving one navigation identifier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Resolution {
    pub target: NavigationId,
    pub content: ResolvedContent,
    /// Whether the filter engine applies to this selection.
    pub filterable: bool,
    /// The spell catalog, when `filterable`.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub catalog: Option<Arc<SpellTable>>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub lookups: Arc<LookupContext>,
}

impl Resolution {
    pub fn rows(&self) -> &[Row] {
        match &self.content {
            ResolvedContent::Rows { rows } => rows,
            _ => &[],
        }
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        match &mut self.content {
            ResolvedContent::Rows { rows } => rows,
            _ => &mut [],
        }
    }

    /// The deferred row for record `id`.
    pub fn row_for_id_mut(&mut self, id: u32) -> Option<&mut Row> {
        self.rows_mut()
            .iter_mut()
            .find(|row| row.entry().is_some_and(|e| e.id() == id))
    }

    pub fn record(&self) -> Option<&Arc<Record>> {
        match &self.content {
            ResolvedContent::Single { record } => Some(record),
            _ => None,
        }
    }
}

/// Resolves navigation identifiers against the stores of a registry.
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: Arc<StoreRegistry>,
    lookup_sources: LookupSources,
}

impl Resolver {
    pub fn new(registry: Arc<StoreRegistry>) -> Self {
        Self {
            registry,
            lookup_sources: LookupSources::default(),
        }
    }

    /// Limit the auxiliary tables built for each resolution.
    pub fn with_lookup_sources(mut self, sources: LookupSources) -> Self {
        self.lookup_sources = sources;
        self
    }

    pub fn registry(&self) -> &Arc<StoreRegistry> {
        &self.registry
    }

    /// Resolve `target` and make it the current selection.
    ///
    /// On an error the selection context still moves to `target`, with the
    /// filter cleared.
    pub fn resolve(&self, target: &NavigationId, context: &mut SelectionContext) -> Result<Resolution> {
        match self.resolve_target(target) {
            Ok(resolution) => {
                context.apply(&resolution);
                Ok(resolution)
            }
            Err(e) => {
                context.fail(target);
                Err(e)
            }
        }
    }

    /// Resolve `target` without touching any selection state.
    pub fn resolve_target(&self, target: &NavigationId) -> Result<Resolution> {
        let session = self.session(target.session())?;

        let (content, catalog) = match target {
            NavigationId::Family(r) => resolve_family(&session, r.family_id(), r.subtype())?,
            NavigationId::Tag(t) => {
                let tag = CollectionTag::parse(t.tag()).ok_or_else(|| ResolveError::UnknownTag(t.tag().to_string()))?;
                resolve_tag(&session, tag)?
            }
        };

        let lookups = Arc::new(lookup::build_context(&session, &self.lookup_sources));
        Ok(Resolution {
            target: target.clone(),
            content,
            filterable: catalog.is_some(),
            catalog,
            lookups,
        })
    }

    /// Load the record behind a deferred row.
    ///
    /// Returns `None` for rows that carry a decoded item already.
    pub fn materialize_row(&self, session: &SessionId, row: &mut Row) -> Result<Option<Arc<Record>>> {
        let RowValue::Deferred(entry) = &mut row.value else {
            return Ok(None);
        };
        let session = self.session(session)?;
        materialize::materialize(&session, entry).map(Some)
    }

    /// Build a fresh lookup context for a session.
    pub fn build_context(&self, session: &SessionId) -> Result<LookupContext> {
        let session = self.session(session)?;
        Ok(lookup::build_context(&session, &self.lookup_sources))
    }

    pub fn session(&self, id: &SessionId) -> Result<Session> {
        self.registry
            .find(id)
            .ok_or_else(|| ResolveError::StoreNotFound(id.clone()))
    }
}

type Resolved = (ResolvedContent, Option<Arc<SpellTable>>);

fn resolve_tag(session: &Session, tag: CollectionTag) -> Result<Resolved> {
    if tag.store_kind() != session.kind() {
        return Err(ResolveError::TagUnavailable {
            tag,
            kind: session.kind(),
        });
    }
    if let Some(family_id) = tag.family() {
        return resolve_family(session, family_id, "");
    }
    Ok((listing(range::list_tag(session, tag))?, None))
}

fn resolve_family(session: &Session, family_id: FamilyId, subtype: &str) -> Result<Resolved> {
    let descriptor = classifier::classify(family_id).ok_or(ResolveError::UnknownFamily(family_id))?;
    let unknown_subtype = || ResolveError::UnknownSubtype {
        family: family_id,
        subtype: subtype.to_string(),
    };

    match descriptor.category {
        FamilyCategory::RangeCollection(_) => {
            if !subtype.is_empty() {
                return Err(unknown_subtype());
            }
            Ok((listing(range::resolve_range(session, family_id))?, None))
        }
        FamilyCategory::SingleObject { record_type } => {
            if !subtype.is_empty() {
                return Err(unknown_subtype());
            }
            let record = read_table(session, family_id, record_type)?;
            Ok((ResolvedContent::Single { record: Arc::new(record) }, None))
        }
        FamilyCategory::DictionaryCollection { record_type } => {
            if !subtype.is_empty() {
                return Err(unknown_subtype());
            }
            match read_table(session, family_id, record_type)? {
                Record::SpellTable(table) => {
                    let catalog = Arc::new(table);
                    let rows = catalog
                        .spells
                        .iter()
                        .map(|(k, s)| Row::item(RowKey::Id(*k), &s.name, Item::Spell(s.clone())))
                        .collect();
                    Ok((ResolvedContent::Rows { rows }, Some(catalog)))
                }
                record => Ok((ResolvedContent::Rows { rows: dictionary_rows(&record) }, None)),
            }
        }
        FamilyCategory::CompositeSubtypes { record_type, subtypes } => {
            if !subtype.is_empty() && !subtypes.iter().any(|s| *s == subtype) {
                return Err(unknown_subtype());
            }
            let record = read_table(session, family_id, record_type)?;
            if subtype.is_empty() {
                return Ok((ResolvedContent::Single { record: Arc::new(record) }, None));
            }
            let rows = subtype_rows(&record, subtype).ok_or_else(unknown_subtype)?;
            Ok((ResolvedContent::Rows { rows }, None))
        }
    }
}

/// Turn a listing outcome into content, containing enumeration failures.
fn listing(entries: Result<Vec<RangeEntry>>) -> Result<ResolvedContent> {
    match entries {
        Ok(entries) => Ok(ResolvedContent::Rows {
            rows: entries.into_iter().map(Row::deferred).collect(),
        }),
        Err(ResolveError::RangeQueryFailed { origin, source }) => Ok(ResolvedContent::ListingFailed {
            origin,
            message: source.to_string(),
        }),
        Err(e) => Err(e),
    }
}

/// Read the single record of a table family.
fn read_table(session: &Session, family_id: FamilyId, record_type: RecordType) -> Result<Record> {
    let id = family_id.get();
    let detail = match session.store().read_record(id, record_type) {
        Ok(Some(record)) => return Ok(record),
        Ok(None) => "record not present".to_string(),
        Err(e) => e.to_string(),
    };
    tracing::warn!(session = %session.id(), family = %family_id, %record_type, error = %detail, "table unavailable");
    Err(ResolveError::DecodeFailed {
        id,
        record_type,
        detail,
    })
}

fn dictionary_rows(record: &Record) -> Vec<Row> {
    match record {
        Record::SpellComponentTable(t) => t
            .components
            .iter()
            .map(|(k, c)| Row::item(RowKey::Id(*k), &c.name, Item::Component(c.clone())))
            .collect(),
        Record::SkillTable(t) => t
            .skills
            .iter()
            .map(|(k, s)| Row::item(RowKey::Id(*k), &s.name, Item::Skill(s.clone())))
            .collect(),
        _ => Vec::new(),
    }
}

fn subtype_rows(record: &Record, subtype: &str) -> Option<Vec<Row>> {
    let rows = match (record, subtype) {
        (Record::CharGen(c), "heritage-groups") => c
            .heritage_groups
            .iter()
            .map(|(k, h)| Row::item(RowKey::Id(*k), &h.name, Item::HeritageGroup(h.clone())))
            .collect(),
        (Record::CharGen(c), "starting-areas") => c
            .starting_areas
            .iter()
            .enumerate()
            .map(|(index, a)| Row::item(RowKey::Index(index), &a.name, Item::StartingArea(a.clone())))
            .collect(),
        (Record::ChatPoseTable(t), "poses") => t
            .poses
            .iter()
            .map(|(k, v)| Row::item(RowKey::Name(k.clone()), v, Item::ChatPose(v.clone())))
            .collect(),
        (Record::ChatPoseTable(t), "emotes") => t
            .emotes
            .iter()
            .map(|(k, e)| Row::item(RowKey::Name(k.clone()), &e.my_emote, Item::ChatEmote(e.clone())))
            .collect(),
        _ => return None,
    };
    Some(rows)
}
