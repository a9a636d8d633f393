//! Builds `scripts-inventory.json`: every script the application may load,
//! local or external, with the `sha384-` digest of the local ones.
//!
//! Sources, in order of precedence:
//!
//! 1. predefined entries from the configuration (scripts injected at runtime
//!    that no static scan can find),
//! 2. `<script src>` elements of the index HTML file,
//! 3. every other script file in the build directory.
//!
//! The written list is sorted with external entries first, then by name.

pub mod entry;
pub mod reason;

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use icu_collator::{Collator, CollatorOptions};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::hash::sri_hash_file;
use crate::html::{Document, Selector};
use crate::path_utils::{display_relative, file_name_of, find_files_by_extension, is_external_reference, local_asset_path};

pub use entry::{ScriptEntry, ScriptType};

static SCRIPT_WITH_SRC: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script[src]").expect("static selector is valid")
});

/// Outcome of one generator run.
#[derive(Debug, Clone)]
pub struct InventoryReport {
    pub output_path: PathBuf,
    /// The entries as written, sorted.
    pub entries: Vec<ScriptEntry>,
    /// Number of entries that came from the configuration.
    pub predefined: usize,
}

impl InventoryReport {
    pub fn local_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_local()).count()
    }
    /// Local entries whose name contains `chunk`.
    pub fn chunk_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.is_local() && entry.name.contains("chunk"))
            .count()
    }
    pub fn external_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_external()).count()
    }
}

impl fmt::Display for InventoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Found {} total scripts ({} predefined):", self.entries.len(), self.predefined)?;
        writeln!(f, " - {} local scripts ({} chunks)", self.local_count(), self.chunk_count())?;
        write!(f, " - {} external scripts", self.external_count())
    }
}

/// A local script waiting to be hashed.
struct PendingScript {
    name: String,
    path: PathBuf,
}

/// Builds the inventory for `config.target` and writes it to
/// `config.inventory_path()`, replacing any previous file.
///
/// Unreadable scripts are logged and recorded with a `null` hash. A missing
/// or unparsable index file aborts the run.
pub fn generate(config: &Config) -> Result<InventoryReport> {
    let target = config.target.as_path();
    let mut processed = HashSet::<PathBuf>::new();

    let mut inventory = hash_predefined(config, &mut processed);
    let predefined = inventory.len();

    let index_path = config.index_path();
    let source = std::fs::read_to_string(&index_path).map_err(|source| Error::io(&index_path, source))?;
    let document = Document::parse(&source).map_err(|source| Error::html(&index_path, source))?;

    let referenced = collect_referenced_scripts(&document, target, &mut inventory, &mut processed);
    inventory.extend(hash_pending(referenced, target));

    let discovered = collect_unreferenced_files(config, &inventory, &processed)?;
    inventory.extend(hash_pending(discovered, target));

    inventory.sort_by(compare_entries);

    let output_path = config.inventory_path();
    let json = serde_json::to_string_pretty(&inventory)?;
    std::fs::write(&output_path, json).map_err(|source| Error::io(&output_path, source))?;
    info!(path = %output_path.display(), entries = inventory.len(), "script inventory written");

    Ok(InventoryReport { output_path, entries: inventory, predefined })
}

/// Seeds the inventory with the configured entries, hashing the local ones
/// that exist in the build directory.
fn hash_predefined(config: &Config, processed: &mut HashSet<PathBuf>) -> Vec<ScriptEntry> {
    let mut entries = config.predefined.clone();
    let local = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.is_local())
        .map(|(index, entry)| (index, local_asset_path(&config.target, &entry.name)))
        .collect::<Vec<_>>();
    let hashes = local
        .par_iter()
        .map(|(index, path)| (*index, sri_hash_file(path)))
        .collect::<Vec<_>>();
    for (index, result) in hashes {
        let entry = &mut entries[index];
        match result {
            Ok(hash) => entry.hash = Some(hash),
            Err(error) => warn!("predefined local script not found: {} ({error})", entry.name),
        }
    }
    // Claimed even when missing so a later scan never duplicates the entry.
    processed.extend(local.into_iter().map(|(_, path)| path));
    entries
}

/// Walks `<script src>` elements in document order. External scripts are
/// added to `inventory` directly; local ones are returned for hashing.
fn collect_referenced_scripts(
    document: &Document,
    target: &Path,
    inventory: &mut Vec<ScriptEntry>,
    processed: &mut HashSet<PathBuf>,
) -> Vec<PendingScript> {
    let mut pending = Vec::<PendingScript>::new();
    let mut seen_sources = HashSet::<String>::new();
    for element in document.select(&SCRIPT_WITH_SRC) {
        let Some(src) = element.attr("src").filter(|src| !src.is_empty()) else {
            continue
        };
        if inventory.iter().any(|entry| entry.name == src) || !seen_sources.insert(src.clone()) {
            debug!(%src, "script already in inventory");
            continue
        }
        if is_external_reference(&src) {
            inventory.push(ScriptEntry::external(src));
            continue
        }
        let path = local_asset_path(target, &src);
        if !processed.insert(path.clone()) {
            debug!(%src, "script file already in inventory");
            continue
        }
        pending.push(PendingScript { name: file_name_of(&src), path });
    }
    pending
}

/// Script files in the build directory that no entry covers yet, either by
/// path or by name.
fn collect_unreferenced_files(
    config: &Config,
    inventory: &[ScriptEntry],
    processed: &HashSet<PathBuf>,
) -> Result<Vec<PendingScript>> {
    let files = find_files_by_extension(&config.target, &config.script_extension)?;
    let pending = files
        .into_iter()
        .filter(|path| !processed.contains(path))
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy().into_owned();
            let known = inventory
                .iter()
                .any(|entry| entry.name == name || entry.name.ends_with(&name));
            if known {
                debug!(%name, "script name already in inventory");
                return None
            }
            Some(PendingScript { name, path })
        })
        .collect();
    Ok(pending)
}

fn hash_pending(pending: Vec<PendingScript>, target: &Path) -> Vec<ScriptEntry> {
    pending
        .into_par_iter()
        .map(|script| {
            let hash = match sri_hash_file(&script.path) {
                Ok(hash) => Some(hash),
                Err(error) => {
                    warn!(
                        "could not generate hash for {}: {error}",
                        display_relative(&script.path, target),
                    );
                    None
                }
            };
            ScriptEntry::local(script.name, hash)
        })
        .collect()
}

/// External entries first, then by name.
pub fn compare_entries(a: &ScriptEntry, b: &ScriptEntry) -> Ordering {
    let rank = |entry: &ScriptEntry| match entry.script_type {
        ScriptType::External => 0,
        ScriptType::Local => 1,
    };
    rank(a).cmp(&rank(b)).then_with(|| compare_names(&a.name, &b.name))
}

thread_local! {
    static NAME_COLLATOR: Option<Collator> =
        Collator::try_new(&Default::default(), CollatorOptions::new()).ok();
}

/// Root-locale collation (lowercase before uppercase, `_` < `-` < `.` <
/// digits < letters). Code point order breaks collation ties.
fn compare_names(a: &str, b: &str) -> Ordering {
    NAME_COLLATOR
        .with(|collator| match collator {
            Some(collator) => collator.compare(a, b),
            None => Ordering::Equal,
        })
        .then_with(|| a.cmp(b))
}
