//! Adds Subresource Integrity attributes to HTML files of the build output.
//!
//! Every `<link>` and `<script>` that references a local file through `src`
//! (or `href`) and has no `integrity` attribute yet receives the `sha384-`
//! digest of that file. Elements that already carry `integrity` are left
//! exactly as they are, so running the injector again changes nothing.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::{Config, CrossOrigin};
use crate::error::{Error, Result};
use crate::hash::sri_hash_file;
use crate::html::{Document, Element, Selector};
use crate::path_utils::{is_external_reference, local_asset_path};

static ASSET_ELEMENTS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("link,script").expect("static selector is valid")
});

/// Result for one HTML file.
#[derive(Debug)]
pub struct SriFileReport {
    pub path: PathBuf,
    /// Number of elements that received an `integrity` attribute.
    pub outcome: Result<usize>,
}

impl SriFileReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Processes every configured HTML file. A failure in one file is logged and
/// does not stop the others.
pub fn inject(config: &Config) -> Vec<SriFileReport> {
    config.html_files
        .iter()
        .map(|file| {
            let path = config.target.join(file);
            let outcome = inject_file(&config.target, &path, config.crossorigin);
            match &outcome {
                Ok(count) => info!(file = %file.display(), elements = count, "SRI hashes added"),
                Err(error) => warn!(file = %file.display(), "{error}"),
            }
            SriFileReport { path, outcome }
        })
        .collect()
}

/// An element waiting for its digest.
struct Reference {
    element: Element,
    reference: String,
    path: PathBuf,
}

/// Adds `integrity` attributes to one HTML file and rewrites it in place.
/// References are resolved against `target`. The file is only rewritten when
/// at least one element changed.
pub fn inject_file(target: &Path, path: &Path, crossorigin: CrossOrigin) -> Result<usize> {
    let source = std::fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
    let document = Document::parse(&source).map_err(|source| Error::html(path, source))?;

    let references = collect_references(&document, target);
    let digests = references
        .iter()
        .map(|reference| reference.path.clone())
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|path| sri_hash_file(&path))
        .collect::<Vec<_>>();

    let mut tagged = 0usize;
    for (reference, digest) in references.iter().zip(digests) {
        match digest {
            Ok(hash) => {
                reference.element.set_attr("integrity", &hash);
                if let Some(value) = crossorigin.attribute_value() {
                    if !reference.element.has_attr("crossorigin") {
                        reference.element.set_attr("crossorigin", value);
                    }
                }
                info!("SRI hash for {}: {hash}", reference.reference);
                tagged += 1;
            }
            Err(error) => warn!("could not hash {}: {error}", reference.reference),
        }
    }

    if tagged > 0 {
        let output = document.to_html_string().map_err(|source| Error::io(path, source))?;
        std::fs::write(path, output).map_err(|source| Error::io(path, source))?;
    }
    Ok(tagged)
}

fn collect_references(document: &Document, target: &Path) -> Vec<Reference> {
    document
        .select(&ASSET_ELEMENTS)
        .into_iter()
        .filter_map(|element| {
            let reference = element
                .attr("src")
                .filter(|src| !src.is_empty())
                .or_else(|| element.attr("href").filter(|href| !href.is_empty()))?;
            if is_external_reference(&reference) {
                debug!(%reference, "external reference skipped");
                return None
            }
            if element.has_attr("integrity") {
                debug!(%reference, "integrity already present");
                return None
            }
            let path = local_asset_path(target, &reference);
            Some(Reference { element, reference, path })
        })
        .collect()
}
