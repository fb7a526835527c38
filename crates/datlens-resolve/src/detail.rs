//! Label/value rendering of records and collection items.
//!
//! Foreign keys are rendered through the lookup context; a key whose table
//! is missing shows as the raw id.

use datlens_store::records::{HeritageGroup, SkillBase, SpellBase, SpellComponent, StartingArea};
use datlens_store::Record;

use crate::lookup::{LookupContext, LookupTable};
use crate::resolver::Item;

/// One line of a detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DetailField {
    pub label: String,
    pub value: String,
}

impl DetailField {
    fn new(label: &str, value: impl ToString) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

fn hex(id: u32) -> String {
    format!("0x{:08X}", id)
}

fn hex_list(ids: &[u32]) -> String {
    ids.iter().map(|id| hex(*id)).collect::<Vec<_>>().join(", ")
}

fn names(lookups: &LookupContext, table: LookupTable, keys: &[u32]) -> String {
    keys.iter()
        .map(|key| lookups.display(table, *key))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Describe a whole record.
pub fn describe(record: &Record, lookups: &LookupContext) -> Vec<DetailField> {
    let mut fields = vec![
        DetailField::new("Id", hex(record.id())),
        DetailField::new("Type", record.record_type()),
    ];

    match record {
        Record::SpellTable(t) => fields.push(DetailField::new("Spells", t.spells.len())),
        Record::SpellComponentTable(t) => fields.push(DetailField::new("Components", t.components.len())),
        Record::SkillTable(t) => fields.push(DetailField::new("Skills", t.skills.len())),
        Record::CharGen(c) => {
            fields.push(DetailField::new("Heritage groups", c.heritage_groups.len()));
            fields.push(DetailField::new("Starting areas", c.starting_areas.len()));
        }
        Record::XpTable(t) => {
            fields.push(DetailField::new("Levels", t.levels.len().saturating_sub(1)));
            if let Some(max) = t.levels.last() {
                fields.push(DetailField::new("Experience at max level", max));
            }
            fields.push(DetailField::new("Attribute ranks", t.attributes.len()));
            fields.push(DetailField::new("Vital ranks", t.vitals.len()));
            fields.push(DetailField::new("Trained skill ranks", t.trained_skills.len()));
            fields.push(DetailField::new("Specialized skill ranks", t.specialized_skills.len()));
            fields.push(DetailField::new("Skill credits awarded", t.skill_credits.iter().sum::<u32>()));
        }
        Record::ChatPoseTable(t) => {
            fields.push(DetailField::new("Poses", t.poses.len()));
            fields.push(DetailField::new("Emotes", t.emotes.len()));
        }
        Record::Palette(p) => {
            fields.push(DetailField::new("Colors", p.colors.len()));
            if !p.colors.is_empty() {
                let preview: Vec<_> = p.colors.iter().take(8).map(|c| format!("#{:08X}", c)).collect();
                fields.push(DetailField::new("First colors", preview.join(" ")));
            }
        }
        Record::SurfaceTexture(s) => {
            fields.push(DetailField::new("Texture type", s.texture_type));
            fields.push(DetailField::new("Textures", hex_list(&s.textures)));
        }
        Record::LanguageString(s) => fields.push(DetailField::new("Text", &s.text)),
        Record::Landblock(l) => {
            let (x, y) = l.coordinates();
            fields.push(DetailField::new("Coordinates", format!("{}, {}", x, y)));
            fields.push(DetailField::new("Has objects", l.has_objects));
            if let (Some(low), Some(high)) = (l.heights.iter().min(), l.heights.iter().max()) {
                fields.push(DetailField::new("Height index range", format!("{}..={}", low, high)));
            }
        }
        Record::Asset(a) => fields.push(DetailField::new("Body size", format!("{} bytes", a.data.len()))),
    }
    fields
}

/// Describe one element of a table collection.
pub fn describe_item(item: &Item, lookups: &LookupContext) -> Vec<DetailField> {
    match item {
        Item::Spell(spell) => describe_spell(spell, lookups),
        Item::Component(component) => describe_component(component),
        Item::Skill(skill) => describe_skill(skill),
        Item::HeritageGroup(group) => describe_heritage(group, lookups),
        Item::StartingArea(area) => describe_starting_area(area),
        Item::ChatPose(text) => vec![DetailField::new("Pose", text)],
        Item::ChatEmote(emote) => vec![
            DetailField::new("Self", &emote.my_emote),
            DetailField::new("Others", &emote.other_emote),
        ],
    }
}

fn describe_spell(spell: &SpellBase, lookups: &LookupContext) -> Vec<DetailField> {
    vec![
        DetailField::new("Name", &spell.name),
        DetailField::new("Description", &spell.description),
        DetailField::new("School", spell.school),
        DetailField::new("Category", spell.category),
        DetailField::new("Base mana", spell.base_mana),
        DetailField::new("Range constant", spell.base_range_constant),
        DetailField::new("Power", spell.power),
        DetailField::new("Duration", spell.duration),
        DetailField::new("Components", names(lookups, LookupTable::Components, &spell.components)),
    ]
}

fn describe_component(component: &SpellComponent) -> Vec<DetailField> {
    vec![
        DetailField::new("Name", &component.name),
        DetailField::new("Type", component.component_type),
        DetailField::new("Category", component.category),
        DetailField::new("Time", component.time),
        DetailField::new("Text", &component.text),
    ]
}

fn describe_skill(skill: &SkillBase) -> Vec<DetailField> {
    vec![
        DetailField::new("Name", &skill.name),
        DetailField::new("Description", &skill.description),
        DetailField::new("Trained cost", skill.trained_cost),
        DetailField::new("Specialized cost", skill.specialized_cost),
        DetailField::new("Available at creation", skill.chargen_use),
    ]
}

fn describe_heritage(group: &HeritageGroup, lookups: &LookupContext) -> Vec<DetailField> {
    vec![
        DetailField::new("Name", &group.name),
        DetailField::new("Attribute credits", group.attribute_credits),
        DetailField::new("Skill credits", group.skill_credits),
        DetailField::new(
            "Starting areas",
            names(lookups, LookupTable::StartingAreas, &group.starting_areas),
        ),
        DetailField::new("Skills", names(lookups, LookupTable::Skills, &group.skills)),
    ]
}

fn describe_starting_area(area: &StartingArea) -> Vec<DetailField> {
    vec![
        DetailField::new("Name", &area.name),
        DetailField::new("Locations", hex_list(&area.locations)),
    ]
}
