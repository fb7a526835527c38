//! Shared fixtures for resolver integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use datlens_resolve::classifier::family;
use datlens_resolve::{SessionId, StoreRegistry};
use datlens_store::records::{
    CharGen, HeritageGroup, Landblock, MagicSchool, Pack, SkillBase, SkillTable, SpellBase, SpellComponent,
    SpellComponentTable, SpellTable, StartingArea, SurfaceTexture,
};
use datlens_store::{Error, MemoryStore, Record, RecordHeader, RecordStore, RecordType, Result, StoreKind};
use parking_lot::Mutex;

/// Wraps a store, logging every call and injecting failures on demand.
pub struct RecordingStore {
    inner: MemoryStore,
    reads: Mutex<Vec<(u32, RecordType)>>,
    range_queries: Mutex<usize>,
    failing_reads: Mutex<BTreeSet<u32>>,
    failing_ranges: Mutex<bool>,
}

impl RecordingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            reads: Mutex::new(Vec::new()),
            range_queries: Mutex::new(0),
            failing_reads: Mutex::new(BTreeSet::new()),
            failing_ranges: Mutex::new(false),
        }
    }

    /// Make every read of `id` fail at the store layer.
    pub fn fail_reads_of(&self, id: u32) {
        self.failing_reads.lock().insert(id);
    }

    /// Make every range query fail.
    pub fn fail_range_queries(&self, fail: bool) {
        *self.failing_ranges.lock() = fail;
    }

    /// Every `(id, decoder)` read so far, in order.
    pub fn reads(&self) -> Vec<(u32, RecordType)> {
        self.reads.lock().clone()
    }

    pub fn reads_of(&self, id: u32) -> usize {
        self.reads.lock().iter().filter(|(read, _)| *read == id).count()
    }

    pub fn range_queries(&self) -> usize {
        *self.range_queries.lock()
    }

    pub fn reset_log(&self) {
        self.reads.lock().clear();
        *self.range_queries.lock() = 0;
    }
}

impl RecordStore for RecordingStore {
    fn kind(&self) -> StoreKind {
        self.inner.kind()
    }

    fn identity(&self) -> &str {
        self.inner.identity()
    }

    fn is_writable(&self) -> bool {
        false
    }

    fn read_record(&self, id: u32, expected: RecordType) -> Result<Option<Record>> {
        self.reads.lock().push((id, expected));
        if self.failing_reads.lock().contains(&id) {
            return Err(Error::InvalidArchive(format!("simulated read failure at {:#010x}", id)));
        }
        self.inner.read_record(id, expected)
    }

    fn query_range(&self, start: u32, end: u32) -> Result<Vec<RecordHeader>> {
        *self.range_queries.lock() += 1;
        if *self.failing_ranges.lock() {
            return Err(Error::InvalidArchive("simulated range failure".to_string()));
        }
        self.inner.query_range(start, end)
    }

    fn record_count(&self) -> usize {
        self.inner.record_count()
    }
}

pub fn spell(name: &str, school: MagicSchool, components: &[u32]) -> SpellBase {
    SpellBase {
        name: name.to_string(),
        description: format!("Casts {}", name),
        school,
        icon: 0x0600_1000,
        category: 1,
        base_mana: 10,
        base_range_constant: 5.0,
        power: 1,
        duration: 30.0,
        components: components.to_vec(),
    }
}

fn component(name: &str) -> SpellComponent {
    SpellComponent {
        name: name.to_string(),
        category: 0,
        icon: 0,
        component_type: 1,
        time: 0.5,
        text: String::new(),
    }
}

fn skill(name: &str) -> SkillBase {
    SkillBase {
        name: name.to_string(),
        description: String::new(),
        icon: 0,
        trained_cost: 6,
        specialized_cost: 12,
        category: 1,
        chargen_use: true,
    }
}

pub fn spell_table() -> SpellTable {
    SpellTable {
        id: family::SPELL_TABLE.get(),
        spells: BTreeMap::from([
            (27, spell("Flame Bolt I", MagicSchool::WarMagic, &[1, 2])),
            (1, spell("Strength Other I", MagicSchool::CreatureEnchantment, &[2])),
            (6, spell("Heal Self I", MagicSchool::LifeMagic, &[3])),
        ]),
    }
}

/// A portal store with every auxiliary table and a few range members.
pub fn portal_store() -> MemoryStore {
    let store = MemoryStore::new(StoreKind::Portal);
    insert(&store, &spell_table());
    insert(
        &store,
        &SpellComponentTable {
            id: family::SPELL_COMPONENT_TABLE.get(),
            components: BTreeMap::from([
                (1, component("Lead Scarab")),
                (2, component("Hyssop")),
                (3, component("")),
            ]),
        },
    );
    insert(
        &store,
        &SkillTable {
            id: family::SKILL_TABLE.get(),
            skills: BTreeMap::from([(6, skill("Melee Defense")), (15, skill("Magic Defense"))]),
        },
    );
    insert(
        &store,
        &CharGen {
            id: family::CHAR_GEN.get(),
            starting_areas: vec![
                StartingArea {
                    name: "Holtburg".to_string(),
                    locations: vec![0xA9B4_0019],
                },
                StartingArea {
                    name: "Shoushi".to_string(),
                    locations: vec![0xDE51_0038],
                },
                StartingArea {
                    name: "Yaraq".to_string(),
                    locations: vec![0x7D64_000D],
                },
            ],
            heritage_groups: BTreeMap::from([(
                1,
                HeritageGroup {
                    name: "Aluvian".to_string(),
                    icon: 0,
                    attribute_credits: 330,
                    skill_credits: 52,
                    starting_areas: vec![0, 2],
                    skills: vec![6],
                },
            )]),
        },
    );
    for id in [0x0500_0002, 0x0500_0001] {
        insert(
            &store,
            &SurfaceTexture {
                id,
                texture_type: 1,
                textures: vec![0x0600_0000 | (id & 0xFF)],
            },
        );
    }
    store
        .insert_raw(0x0100_0001, 0x0100_0001u32.to_le_bytes().to_vec())
        .unwrap();
    store
}

/// A cell store with two landblocks and one landblock-info record.
pub fn cell_store() -> MemoryStore {
    let store = MemoryStore::new(StoreKind::Cell);
    for id in [0xA9B4_FFFF, 0x0101_FFFF] {
        insert(
            &store,
            &Landblock {
                id,
                has_objects: true,
                terrain: vec![0; 81],
                heights: (0..81).collect(),
            },
        );
    }
    store
        .insert_raw(0xA9B4_FFFE, 0xA9B4_FFFEu32.to_le_bytes().to_vec())
        .unwrap();
    store
}

pub fn insert<T: Pack>(store: &MemoryStore, record: &T) {
    store.insert(record).unwrap();
}

/// Register a recording wrapper around `store`.
pub fn register(registry: &StoreRegistry, store: MemoryStore) -> (Arc<RecordingStore>, SessionId) {
    let recording = Arc::new(RecordingStore::new(store));
    let session = registry.register_store(recording.clone());
    (recording, session)
}
