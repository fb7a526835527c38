//! End-to-end resolution scenarios over recording stores.

mod common;

use std::sync::Arc;

use common::{cell_store, portal_store, register};
use datlens_common::FamilyId;
use datlens_resolve::classifier::{self, family};
use datlens_resolve::{
    describe, CollectionTag, EntryOrigin, FilterState, Item, LookupSources, LookupTable, NavigationId,
    ResolveError, ResolvedContent, Resolver, RowKey, RowValue, SelectionContext, StoreRegistry,
};
use datlens_store::records::MagicSchool;
use datlens_store::{Record, RecordType};

fn setup() -> (Resolver, Arc<common::RecordingStore>, datlens_resolve::SessionId) {
    let registry = Arc::new(StoreRegistry::new());
    let (store, session) = register(&registry, portal_store());
    (Resolver::new(registry), store, session)
}

#[test]
fn every_table_family_classifies() {
    for id in [
        family::SPELL_TABLE,
        family::SPELL_COMPONENT_TABLE,
        family::SKILL_TABLE,
        family::CHAT_POSE_TABLE,
        family::CHAR_GEN,
        family::XP_TABLE,
        family::SURFACE_TEXTURE,
        family::QUALITY_FILTER,
    ] {
        assert!(classifier::classify(id).is_some(), "{} unclassified", id);
    }
}

#[test]
fn catalog_resolves_to_dictionary_rows() {
    let (resolver, _, session) = setup();
    let mut context = SelectionContext::new();

    let resolution = resolver
        .resolve(&NavigationId::family(FamilyId::new(0x0E00_000E), session), &mut context)
        .unwrap();

    let labels: Vec<_> = resolution.rows().iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["1: Strength Other I", "6: Heal Self I", "27: Flame Bolt I"]);
    assert_eq!(resolution.rows()[0].key, RowKey::Id(1));
    assert!(matches!(resolution.rows()[2].value, RowValue::Item(Item::Spell(_))));
    assert!(resolution.filterable);
    assert!(context.is_filterable());
}

#[test]
fn asset_range_lists_placeholders_then_uses_surface_texture_decoder() {
    let (resolver, store, session) = setup();
    let mut context = SelectionContext::new();

    let target = NavigationId::family(FamilyId::new(0x0500_0000), session.clone());
    let mut resolution = resolver.resolve(&target, &mut context).unwrap();
    assert!(!resolution.filterable);
    assert_eq!(resolution.rows().len(), 2);
    assert!(resolution
        .rows()
        .iter()
        .all(|row| row.entry().is_some_and(|e| e.is_placeholder())));

    // Listing decoded nothing from the range itself.
    assert_eq!(store.range_queries(), 1);
    assert_eq!(store.reads_of(0x0500_0001), 0);
    assert_eq!(store.reads_of(0x0500_0002), 0);

    store.reset_log();
    let row = resolution.row_for_id_mut(0x0500_0001).unwrap();
    let record = resolver.materialize_row(&session, row).unwrap().unwrap();

    assert_eq!(store.reads(), vec![(0x0500_0001, RecordType::SurfaceTexture)]);
    match record.as_ref() {
        Record::SurfaceTexture(texture) => assert_eq!(texture.textures, vec![0x0600_0001]),
        other => panic!("unexpected record {:?}", other),
    }
}

#[test]
fn materializing_twice_reads_once() {
    let (resolver, store, session) = setup();
    let mut resolution = resolver
        .resolve_target(&NavigationId::family(family::SURFACE_TEXTURE, session.clone()))
        .unwrap();
    store.reset_log();

    let row = resolution.row_for_id_mut(0x0500_0002).unwrap();
    let first = resolver.materialize_row(&session, row).unwrap().unwrap();
    let second = resolver.materialize_row(&session, row).unwrap().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(store.reads_of(0x0500_0002), 1);
    assert!(!row.entry().unwrap().is_placeholder());
}

#[test]
fn failed_entry_does_not_affect_siblings() {
    let (resolver, store, session) = setup();
    let mut resolution = resolver
        .resolve_target(&NavigationId::family(family::SURFACE_TEXTURE, session.clone()))
        .unwrap();
    store.fail_reads_of(0x0500_0001);

    let err = resolver
        .materialize_row(&session, resolution.row_for_id_mut(0x0500_0001).unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        ResolveError::DecodeFailed {
            id: 0x0500_0001,
            record_type: RecordType::SurfaceTexture,
            ..
        }
    ));
    assert!(resolution.row_for_id_mut(0x0500_0001).unwrap().entry().unwrap().is_placeholder());

    let sibling = resolution.row_for_id_mut(0x0500_0002).unwrap();
    assert!(resolver.materialize_row(&session, sibling).is_ok());
}

#[test]
fn filter_empty_and_non_matching() {
    let (resolver, _, session) = setup();
    let mut context = SelectionContext::new();
    resolver
        .resolve(&NavigationId::tag("spells", session), &mut context)
        .unwrap();

    let all = context.apply_filter(FilterState::default());
    let keys: Vec<_> = all.items.iter().map(|i| i.key).collect();
    assert_eq!(keys, vec![1, 6, 27]);
    assert_eq!(all.status_message, "Listing all 3 spells");

    let none = context.apply_filter(FilterState::name("recall"));
    assert!(none.is_empty);
    assert!(none.applicable);

    let war = context.apply_filter(FilterState {
        school: Some(MagicSchool::WarMagic),
        ..FilterState::default()
    });
    assert_eq!(war.items.len(), 1);
    assert_eq!(war.status_message, "Showing 1 of 3 spells matching");
}

#[test]
fn navigating_away_clears_filter() {
    let (resolver, _, session) = setup();
    let mut context = SelectionContext::new();
    resolver
        .resolve(&NavigationId::family(family::SPELL_TABLE, session.clone()), &mut context)
        .unwrap();
    assert!(context.apply_filter(FilterState::name("bolt")).applicable);

    resolver
        .resolve(&NavigationId::family(family::SKILL_TABLE, session.clone()), &mut context)
        .unwrap();
    assert!(!context.refilter().applicable);

    // A failed selection clears it too.
    resolver
        .resolve(&NavigationId::family(family::SPELL_TABLE, session.clone()), &mut context)
        .unwrap();
    let unknown = NavigationId::family(FamilyId::new(0x0E00_0001), session);
    assert!(matches!(
        resolver.resolve(&unknown, &mut context),
        Err(ResolveError::UnknownFamily(_))
    ));
    assert!(!context.is_filterable());
}

#[test]
fn lookups_survive_one_unreadable_source() {
    let (resolver, store, session) = setup();
    store.fail_reads_of(family::SPELL_COMPONENT_TABLE.get());

    let context = resolver.build_context(&session).unwrap();
    assert!(!context.contains(LookupTable::Components));
    assert!(!context.get(LookupTable::Skills).unwrap().is_empty());
    assert!(!context.get(LookupTable::Spells).unwrap().is_empty());
    assert!(!context.get(LookupTable::StartingAreas).unwrap().is_empty());
    assert!(!context.get(LookupTable::HeritageGroups).unwrap().is_empty());

    // CharGen backs two tables and is read once.
    assert_eq!(store.reads_of(family::CHAR_GEN.get()), 1);
}

#[test]
fn starting_area_keys_are_positions() {
    let (resolver, _, session) = setup();
    let context = resolver.build_context(&session).unwrap();
    let areas = context.get(LookupTable::StartingAreas).unwrap();

    let mut keys: Vec<_> = areas.keys().copied().collect();
    keys.sort_unstable();
    assert_eq!(keys, vec![0, 1, 2]);
    assert_eq!(context.name(LookupTable::StartingAreas, 2), Some("Yaraq"));

    let resolution = resolver
        .resolve_target(&NavigationId::family_subtype(family::CHAR_GEN, "starting-areas", session))
        .unwrap();
    let row_keys: Vec<_> = resolution.rows().iter().map(|r| r.key.clone()).collect();
    assert_eq!(row_keys, vec![RowKey::Index(0), RowKey::Index(1), RowKey::Index(2)]);
}

#[test]
fn unnamed_components_are_excluded() {
    let (resolver, _, session) = setup();
    let context = resolver.build_context(&session).unwrap();
    assert_eq!(context.get(LookupTable::Components).unwrap().len(), 2);
    assert_eq!(context.display(LookupTable::Components, 3), "3");
}

#[test]
fn restricted_lookup_sources() {
    let registry = Arc::new(StoreRegistry::new());
    let (store, session) = register(&registry, portal_store());
    let resolver = Resolver::new(registry).with_lookup_sources(LookupSources::only([LookupTable::Skills]));

    let context = resolver.build_context(&session).unwrap();
    assert_eq!(context.summary(), vec![(LookupTable::Skills, 2)]);
    assert_eq!(store.reads().len(), 1);
}

#[test]
fn range_failure_is_contained_to_the_family() {
    let (resolver, store, session) = setup();
    store.fail_range_queries(true);

    let failed = resolver
        .resolve_target(&NavigationId::family(family::SURFACE_TEXTURE, session.clone()))
        .unwrap();
    match &failed.content {
        ResolvedContent::ListingFailed { origin, message } => {
            assert_eq!(*origin, EntryOrigin::Family(family::SURFACE_TEXTURE));
            assert!(message.contains("simulated"));
        }
        other => panic!("unexpected content {:?}", other),
    }

    let sibling = resolver
        .resolve_target(&NavigationId::family(family::SKILL_TABLE, session))
        .unwrap();
    assert_eq!(sibling.rows().len(), 2);
}

#[test]
fn details_render_references_through_lookups() {
    let (resolver, _, session) = setup();
    let mut context = SelectionContext::new();
    let resolution = resolver
        .resolve(&NavigationId::family_subtype(family::CHAR_GEN, "heritage-groups", session), &mut context)
        .unwrap();

    let RowValue::Item(item) = &resolution.rows()[0].value else {
        panic!("heritage rows carry items");
    };
    let fields = datlens_resolve::describe_item(item, context.lookups());
    let areas = fields.iter().find(|f| f.label == "Starting areas").unwrap();
    assert_eq!(areas.value, "Holtburg, Yaraq");
    let skills = fields.iter().find(|f| f.label == "Skills").unwrap();
    assert_eq!(skills.value, "Melee Defense");
}

#[test]
fn cell_collections_materialize_as_landblocks() {
    let registry = Arc::new(StoreRegistry::new());
    let (store, session) = register(&registry, cell_store());
    let resolver = Resolver::new(registry);

    let mut resolution = resolver
        .resolve_target(&NavigationId::tag(CollectionTag::Landblocks.as_str(), session.clone()))
        .unwrap();
    let ids: Vec<_> = resolution.rows().iter().filter_map(|r| r.entry()).map(|e| e.id()).collect();
    assert_eq!(ids, vec![0x0101_FFFF, 0xA9B4_FFFF]);
    assert!(resolution.lookups.is_empty());

    let row = resolution.row_for_id_mut(0xA9B4_FFFF).unwrap();
    let record = resolver.materialize_row(&session, row).unwrap().unwrap();
    assert_eq!(store.reads().last(), Some(&(0xA9B4_FFFF, RecordType::Landblock)));

    let fields = describe(&record, resolution.lookups.as_ref());
    assert!(fields.iter().any(|f| f.label == "Coordinates" && f.value == "169, 180"));

    assert!(matches!(
        resolver.resolve_target(&NavigationId::tag("spells", session)),
        Err(ResolveError::TagUnavailable { .. })
    ));
}

#[test]
fn close_all_invalidates_every_session() {
    let registry = Arc::new(StoreRegistry::new());
    let (_, portal) = register(&registry, portal_store());
    let (_, cell) = register(&registry, cell_store());
    assert!(registry.find(&portal).is_some());
    assert!(registry.find(&cell).is_some());

    assert_eq!(registry.close_all(), 2);
    assert!(registry.find(&portal).is_none());
    assert!(registry.find(&cell).is_none());

    let resolver = Resolver::new(registry);
    assert!(matches!(
        resolver.resolve_target(&NavigationId::family(family::SPELL_TABLE, portal)),
        Err(ResolveError::StoreNotFound(_))
    ));
}

#[test]
fn re_registering_a_store_keeps_its_session() {
    let registry = StoreRegistry::new();
    let store = Arc::new(common::RecordingStore::new(portal_store()));
    let first = registry.register_store(store.clone());
    let second = registry.register_store(store);
    assert_eq!(first, second);
    assert_eq!(registry.len(), 1);
}
