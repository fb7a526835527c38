//! Datlens CLI - browse and resolve records in legacy game asset databases.
//!
//! This is the main entry point for the datlens command-line application.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use datlens::prelude::*;
use datlens::resolve::{
    classifier, describe, describe_item, materialize_all, resolve_range, DetailField, EntryOrigin, Row, RowValue,
};
use datlens::store::records::MagicSchool;

/// Datlens - record browser for legacy game asset databases
#[derive(Parser)]
#[command(name = "datlens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Portal store archive
    #[arg(long, env = "DATLENS_PORTAL", global = true)]
    portal: Option<PathBuf>,

    /// Cell store archive
    #[arg(long, env = "DATLENS_CELL", global = true)]
    cell: Option<PathBuf>,

    /// Emit JSON where supported
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize the open stores
    Info,

    /// List the known record families
    Families,

    /// Resolve a family id
    Resolve {
        /// Family id (hex with 0x prefix, or decimal)
        id: FamilyId,

        /// Sub-category of a composite family
        #[arg(short, long)]
        subtype: Option<String>,

        /// Store to resolve against
        #[arg(long, default_value = "portal")]
        store: StoreKind,
    },

    /// Resolve a named collection
    Tag {
        /// Collection name (spells, components, skills, chat-poses, char-gen, xp, landblocks, landblock-info)
        name: String,
    },

    /// List the members of a range family without loading them
    Range {
        /// Range family id
        family: FamilyId,

        /// Show at most this many entries
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Load one range member and print its details
    Show {
        /// Record id
        id: FamilyId,

        /// Only look in this store (portal range families, or cell collections)
        #[arg(long)]
        store: Option<StoreKind>,
    },

    /// Filter the spell catalog
    Spells {
        /// Case-insensitive name substring
        #[arg(short, long)]
        name: Option<String>,

        /// School of magic (e.g. "war", "life magic")
        #[arg(short, long)]
        school: Option<MagicSchool>,

        /// Component id the spell must use
        #[arg(short, long)]
        component: Option<u32>,

        /// Print full details for each match
        #[arg(short, long)]
        detailed: bool,
    },

    /// Show which cross-reference tables could be built
    Lookups,

    /// Load every member of a range family and report failures
    Verify {
        /// Range family id
        family: FamilyId,
    },

    /// Copy records of an archive into a new archive
    Pack {
        /// Source archive
        input: PathBuf,

        /// Archive to write
        output: PathBuf,

        /// Only copy this family (all members of a range family, or the single record)
        #[arg(short, long)]
        family: Option<FamilyId>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let registry = Arc::new(StoreRegistry::new());
    open_stores(&registry, &cli)?;
    let resolver = Resolver::new(registry.clone());

    let outcome = match cli.command {
        Commands::Info => cmd_info(&registry, cli.json),
        Commands::Families => cmd_families(cli.json),
        Commands::Resolve { id, subtype, store } => {
            let session = session_for(&registry, store)?;
            let target = match subtype {
                Some(subtype) => NavigationId::family_subtype(id, subtype, session),
                None => NavigationId::family(id, session),
            };
            cmd_resolve(&resolver, &target, cli.json)
        }
        Commands::Tag { name } => {
            let tag = CollectionTag::parse(&name).with_context(|| format!("Unknown collection {:?}", name))?;
            let session = session_for(&registry, tag.store_kind())?;
            cmd_resolve(&resolver, &NavigationId::tag(tag.as_str(), session), cli.json)
        }
        Commands::Range { family, limit } => cmd_range(&resolver, family, limit, cli.json),
        Commands::Show { id, store } => cmd_show(&resolver, id.get(), store, cli.json),
        Commands::Spells {
            name,
            school,
            component,
            detailed,
        } => {
            let state = FilterState {
                name_substring: name.unwrap_or_default(),
                school,
                component,
            };
            cmd_spells(&resolver, state, detailed, cli.json)
        }
        Commands::Lookups => cmd_lookups(&resolver, cli.json),
        Commands::Verify { family } => cmd_verify(&resolver, family),
        Commands::Pack { input, output, family } => cmd_pack(&input, &output, family),
    };

    registry.close_all();
    outcome
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_stores(registry: &StoreRegistry, cli: &Cli) -> Result<()> {
    let requested = [(StoreKind::Portal, &cli.portal), (StoreKind::Cell, &cli.cell)];
    for (expected, path) in requested {
        let Some(path) = path else { continue };
        let store = open_store(path)?;
        if store.kind() != expected {
            tracing::warn!(path = %path.display(), %expected, actual = %store.kind(), "store kind differs from flag");
        }
        registry.register_store(Arc::new(store));
    }

    if registry.is_empty() && needs_store(&cli.command) {
        bail!("No store given; pass --portal/--cell or set DATLENS_PORTAL/DATLENS_CELL");
    }
    Ok(())
}

fn open_store(path: &Path) -> Result<ArchiveStore> {
    let start = Instant::now();
    let store = ArchiveStore::open(path).with_context(|| format!("Failed to open store {}", path.display()))?;
    tracing::info!(path = %path.display(), records = store.record_count(), elapsed = ?start.elapsed(), "opened store");
    Ok(store)
}

fn needs_store(command: &Commands) -> bool {
    !matches!(command, Commands::Families | Commands::Pack { .. })
}

fn session_for(registry: &StoreRegistry, kind: StoreKind) -> Result<SessionId> {
    registry
        .first_of_kind(kind)
        .map(|session| session.id().clone())
        .with_context(|| format!("No {} store is open", kind))
}

fn print_fields(fields: &[DetailField]) {
    let width = fields.iter().map(|f| f.label.len()).max().unwrap_or(0);
    for field in fields {
        println!("  {:<width$}  {}", field.label, field.value, width = width);
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_info(registry: &StoreRegistry, json: bool) -> Result<()> {
    let sessions = registry.sessions();
    if json {
        let value: Vec<_> = sessions
            .iter()
            .map(|s| {
                serde_json::json!({
                    "session": s.id(),
                    "kind": s.kind(),
                    "identity": s.identity(),
                    "writable": s.is_writable(),
                    "records": s.store().record_count(),
                })
            })
            .collect();
        return print_json(&value);
    }

    for session in sessions {
        println!("{} ({})", session.id(), session.kind());
        println!("  Path:     {}", session.identity());
        println!("  Records:  {}", session.store().record_count());
        println!("  Writable: {}", session.is_writable());
    }
    Ok(())
}

fn cmd_families(json: bool) -> Result<()> {
    let families = classifier::families();
    if json {
        let value: Vec<_> = families
            .iter()
            .map(|d| {
                serde_json::json!({
                    "id": d.family_id,
                    "name": d.name,
                    "category": d.category.as_str(),
                    "decoder": d.range().map(|s| s.decoder),
                    "mask": d.range().map(|s| s.mask),
                })
            })
            .collect();
        return print_json(&value);
    }

    for descriptor in families {
        match descriptor.range() {
            Some(spec) => println!(
                "{}  {:<24} {:<11} {} (0x{:08X}..=0x{:08X})",
                descriptor.family_id,
                descriptor.name,
                descriptor.category.as_str(),
                spec.decoder,
                descriptor.family_id.range_start(spec.mask),
                descriptor.family_id.range_end(spec.mask),
            ),
            None => println!(
                "{}  {:<24} {}",
                descriptor.family_id,
                descriptor.name,
                descriptor.category.as_str()
            ),
        }
    }
    println!("\nTotal: {} families", families.len());
    Ok(())
}

fn cmd_resolve(resolver: &Resolver, target: &NavigationId, json: bool) -> Result<()> {
    let mut context = SelectionContext::new();
    let resolution = resolver
        .resolve(target, &mut context)
        .with_context(|| format!("Failed to resolve {}", target))?;

    if json {
        return print_json(&resolution);
    }

    match &resolution.content {
        ResolvedContent::Single { record } => {
            println!("{}", target);
            print_fields(&describe(record, context.lookups()));
        }
        ResolvedContent::Rows { rows } => {
            for row in rows {
                println!("{}", row_line(row));
            }
            println!("\nTotal: {} entries", rows.len());
            if resolution.filterable {
                println!("(filterable: use `datlens spells`)");
            }
        }
        ResolvedContent::ListingFailed { origin, message } => {
            eprintln!("Listing {} failed: {}", origin, message);
        }
    }
    Ok(())
}

fn row_line(row: &Row) -> String {
    match &row.value {
        RowValue::Deferred(entry) if entry.is_placeholder() => format!("{}  ({} bytes)", row.label, entry.size()),
        RowValue::Deferred(_) => format!("{}  (loaded)", row.label),
        RowValue::Item(_) => row.label.clone(),
    }
}

fn cmd_range(resolver: &Resolver, family: FamilyId, limit: Option<usize>, json: bool) -> Result<()> {
    let session = resolver.session(&session_for(resolver.registry(), StoreKind::Portal)?)?;
    let start = Instant::now();
    let entries = resolve_range(&session, family).with_context(|| format!("Failed to list {}", family))?;
    let shown = limit.unwrap_or(entries.len()).min(entries.len());

    if json {
        return print_json(&entries[..shown]);
    }

    for entry in &entries[..shown] {
        println!("{}  {:>8} bytes", entry.label(), entry.size());
    }
    println!("\nListed {} of {} entries in {:?}", shown, entries.len(), start.elapsed());
    Ok(())
}

/// The listing that contains record `id`. Portal range families come before
/// cell collections unless `store` narrows the search to one kind.
fn listing_for(resolver: &Resolver, id: u32, store: Option<StoreKind>) -> Result<NavigationId> {
    let registry = resolver.registry();

    if store != Some(StoreKind::Cell) {
        let family = classifier::families()
            .iter()
            .find(|d| d.range().is_some_and(|spec| d.family_id.contains(spec.mask, id)))
            .map(|d| d.family_id);
        if let (Some(family), Some(portal)) = (family, registry.first_of_kind(StoreKind::Portal)) {
            return Ok(NavigationId::family(family, portal.id().clone()));
        }
    }

    if store != Some(StoreKind::Portal) {
        let tag = CollectionTag::ALL
            .into_iter()
            .find(|tag| tag.cell_marker() == Some(id as u16));
        if let (Some(tag), Some(cell)) = (tag, registry.first_of_kind(StoreKind::Cell)) {
            return Ok(NavigationId::tag(tag.as_str(), cell.id().clone()));
        }
    }

    bail!("0x{:08X} is not inside any range family or cell collection of the open stores", id)
}

fn cmd_show(resolver: &Resolver, id: u32, store: Option<StoreKind>, json: bool) -> Result<()> {
    let listing = listing_for(resolver, id, store)?;
    let mut context = SelectionContext::new();
    let mut resolution = resolver
        .resolve(&listing, &mut context)
        .with_context(|| format!("Failed to list {}", listing))?;

    let session = listing.session().clone();
    let row = resolution
        .row_for_id_mut(id)
        .with_context(|| format!("0x{:08X} is not in {}", id, listing))?;
    let record = resolver
        .materialize_row(&session, row)
        .with_context(|| format!("Failed to load 0x{:08X}", id))?
        .with_context(|| format!("0x{:08X} has no record to load", id))?;

    let fields = describe(&record, context.lookups());
    if json {
        return print_json(&serde_json::json!({ "record": record, "fields": fields }));
    }

    if let Some(EntryOrigin::Family(family)) = row.entry().map(|e| e.origin()) {
        println!("0x{:08X} (in {})", id, family);
    } else {
        println!("0x{:08X}", id);
    }
    print_fields(&fields);
    Ok(())
}

fn cmd_spells(resolver: &Resolver, state: FilterState, detailed: bool, json: bool) -> Result<()> {
    let session = session_for(resolver.registry(), StoreKind::Portal)?;
    let mut context = SelectionContext::new();
    resolver
        .resolve(&NavigationId::tag("spells", session), &mut context)
        .context("Failed to load the spell catalog")?;

    let result = context.apply_filter(state);
    if json {
        return print_json(&result);
    }

    for item in &result.items {
        println!("{}", item.label);
        if detailed {
            let fields = describe_item(&datlens::resolve::Item::Spell(item.spell.clone()), context.lookups());
            print_fields(&fields);
        }
    }
    println!("\n{}", result.status_message);
    Ok(())
}

fn cmd_lookups(resolver: &Resolver, json: bool) -> Result<()> {
    let session = session_for(resolver.registry(), StoreKind::Portal)?;
    let context = resolver.build_context(&session)?;

    if json {
        let value: serde_json::Map<String, serde_json::Value> = LookupTable::ALL
            .iter()
            .map(|t| (t.as_str().to_string(), serde_json::json!(context.get(*t).map(|names| names.len()))))
            .collect();
        return print_json(&value);
    }

    for table in LookupTable::ALL {
        match context.get(table) {
            Some(names) => println!("{:<16} {} names", table, names.len()),
            None => println!("{:<16} unavailable", table),
        }
    }
    Ok(())
}

fn cmd_verify(resolver: &Resolver, family: FamilyId) -> Result<()> {
    let session = resolver.session(&session_for(resolver.registry(), StoreKind::Portal)?)?;
    let mut entries = resolve_range(&session, family).with_context(|| format!("Failed to list {}", family))?;
    println!("Verifying {} entries of {}...", entries.len(), family);

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let report = materialize_all(&session, &mut entries, |_| pb.inc(1));
    pb.finish_with_message("Done");

    for (id, error) in &report.failures {
        eprintln!("0x{:08X}: {}", id, error);
    }
    println!(
        "Loaded {} entries, {} failed, in {:?}",
        report.loaded,
        report.failures.len(),
        start.elapsed()
    );

    if !report.is_clean() {
        bail!("{} of {} entries failed to load", report.failures.len(), entries.len());
    }
    Ok(())
}

fn cmd_pack(input: &Path, output: &Path, family: Option<FamilyId>) -> Result<()> {
    let source = open_store(input)?;
    let (start, end) = match family {
        Some(family) => {
            let descriptor = classifier::classify(family).with_context(|| format!("Unknown family {}", family))?;
            match descriptor.range() {
                Some(spec) => (family.range_start(spec.mask), family.range_end(spec.mask)),
                None => (family.get(), family.get()),
            }
        }
        None => (0, u32::MAX),
    };

    let mut builder = ArchiveBuilder::new(source.kind());
    let copied = builder
        .copy_range(&source, start, end)
        .with_context(|| format!("Failed to copy records from {}", input.display()))?;
    builder
        .write_to_file(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Packed {} records into {}", copied, output.display());
    Ok(())
}
