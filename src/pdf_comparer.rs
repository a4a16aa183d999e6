//! Compare PDFs under test against expected ("gold") files.
//!
//! The comparison itself sits behind [`PdfDiffer`]. [`PageDiffer`], the
//! default, compares every page together with the objects it draws.

use crate::path_utils::replace_qualifier;
use crate::pdf_utils::page_resources;
use crate::{ComparerConfig, Description, Error, Matcher, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const DIFF_QUALIFIER: &str = "diff";
const RESULT_QUALIFIER: &str = "result";

const MAX_OBJECT_DEPTH: usize = 32;

// Back links into the page and field trees; following them would pull in
// the whole document.
const SKIPPED_KEYS: [&[u8]; 3] = [b"Parent", b"P", b"Length"];

// ── Differ ───────────────────────────────────────────────────────────────────

/// Outcome of comparing two PDFs.
#[derive(Debug, Clone, Default)]
pub struct PdfDiff {
    pub expected_pages: usize,
    pub actual_pages: usize,

    /// 1-based page numbers of the tested PDF that differ from the expected one.
    pub differing_pages: Vec<u32>,

    /// PDF bytes describing the differences, if the differ produces one.
    pub artifact: Option<Vec<u8>>,
}

impl PdfDiff {
    pub fn is_equal(&self) -> bool {
        self.differing_pages.is_empty() && self.expected_pages == self.actual_pages
    }
}

/// Produces an equal / not-equal verdict for two PDFs.
pub trait PdfDiffer {
    fn diff(&self, expected: &[u8], actual: &[u8]) -> Result<PdfDiff>;
}

/// Compares page counts, then each page's decoded content stream together
/// with everything it draws: the resolved `/Resources` (XObjects, fonts,
/// patterns and their stream data) and the appearance streams of its
/// annotations, where filled-in form field values live.
///
/// Object numbers are ignored, so a re-saved but otherwise identical
/// document compares equal. The artifact is the tested PDF reduced to its
/// differing pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageDiffer;

impl PdfDiffer for PageDiffer {
    fn diff(&self, expected: &[u8], actual: &[u8]) -> Result<PdfDiff> {
        let expected_doc = Document::load_mem(expected)?;
        let mut actual_doc = Document::load_mem(actual)?;

        let expected_pages: Vec<ObjectId> = expected_doc.get_pages().into_values().collect();
        let actual_pages = actual_doc.get_pages();

        let mut differing_pages = Vec::new();
        for (&page_no, &page_id) in &actual_pages {
            let same = expected_pages
                .get(page_no as usize - 1)
                .is_some_and(|&expected_id| {
                    page_fingerprint(&expected_doc, expected_id) == page_fingerprint(&actual_doc, page_id)
                });
            if !same {
                differing_pages.push(page_no);
            }
        }

        let artifact = if differing_pages.is_empty() {
            None
        } else {
            let unchanged: Vec<u32> = actual_pages
                .keys()
                .copied()
                .filter(|n| !differing_pages.contains(n))
                .collect();
            actual_doc.delete_pages(&unchanged);
            let mut buf = Vec::new();
            actual_doc.save_to(&mut buf)?;
            Some(buf)
        };

        Ok(PdfDiff {
            expected_pages: expected_pages.len(),
            actual_pages: actual_pages.len(),
            differing_pages,
            artifact,
        })
    }
}

/// A canonical rendering of what a page draws, independent of object
/// numbering.
fn page_fingerprint(document: &Document, page_id: ObjectId) -> Vec<u8> {
    let mut out = document.get_page_content(page_id).unwrap_or_default();

    out.extend_from_slice(b"\n%resources\n");
    if let Some(resources) = page_resources(document, page_id) {
        write_dictionary(document, resources, &mut Vec::new(), &mut out);
    }

    out.extend_from_slice(b"\n%annots\n");
    let annots = document
        .get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"Annots").ok());
    if let Some(annots) = annots {
        write_object(document, annots, &mut Vec::new(), &mut out);
    }
    out
}

/// Serialize `object` with references replaced by their targets, dictionary
/// keys sorted and streams decoded. `path` holds the references being
/// expanded; a reference back into it is written as a cycle marker.
fn write_object(document: &Document, object: &Object, path: &mut Vec<ObjectId>, out: &mut Vec<u8>) {
    match object {
        Object::Reference(id) => {
            if path.contains(id) || path.len() >= MAX_OBJECT_DEPTH {
                out.extend_from_slice(b"<cycle>");
                return;
            }
            let Ok(target) = document.get_object(*id) else {
                out.extend_from_slice(b"null");
                return;
            };
            path.push(*id);
            write_object(document, target, path, out);
            path.pop();
        }
        Object::Dictionary(dict) => write_dictionary(document, dict, path, out),
        Object::Array(items) => {
            out.push(b'[');
            for item in items {
                write_object(document, item, path, out);
                out.push(b' ');
            }
            out.push(b']');
        }
        Object::Stream(stream) => {
            let mut dict = stream.dict.clone();
            dict.remove(b"Filter");
            dict.remove(b"DecodeParms");
            write_dictionary(document, &dict, path, out);
            out.extend_from_slice(b"stream\n");
            match stream.decompressed_content() {
                Ok(content) => out.extend_from_slice(&content),
                Err(_) => out.extend_from_slice(&stream.content),
            }
            out.extend_from_slice(b"\nendstream");
        }
        other => out.extend_from_slice(format!("{other:?}").as_bytes()),
    }
}

fn write_dictionary(document: &Document, dict: &Dictionary, path: &mut Vec<ObjectId>, out: &mut Vec<u8>) {
    let mut entries: Vec<(&Vec<u8>, &Object)> = dict
        .iter()
        .filter(|(key, _)| !SKIPPED_KEYS.contains(&key.as_slice()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    out.extend_from_slice(b"<<");
    for (key, value) in entries {
        out.push(b'/');
        out.extend_from_slice(key);
        out.push(b' ');
        write_object(document, value, path, out);
        out.push(b' ');
    }
    out.extend_from_slice(b">>");
}

// ── PdfComparer ──────────────────────────────────────────────────────────────

/// Compares PDFs to gold files, a sort of "digital lightbox".
///
/// ```no_run
/// use formmatchers::{assert_that, ComparerConfig, PdfComparer};
///
/// let comparer = PdfComparer::new(ComparerConfig {
///     gold_dir: Some("tests/gold".into()),
///     actual_dir: "target/actual".into(),
/// })
/// .unwrap();
///
/// let rendered = std::fs::read("target/out/invoice.pdf").unwrap();
/// assert_that(rendered.as_slice(), comparer.compares_equal("invoice_gold.pdf"));
/// ```
pub struct PdfComparer {
    gold_dir: Option<PathBuf>,
    actual_dir: PathBuf,
    differ: Box<dyn PdfDiffer>,
}

impl PdfComparer {
    /// Fails when `gold_dir` is set but is missing or not a directory.
    pub fn new(config: ComparerConfig) -> Result<Self> {
        if let Some(ref gold) = config.gold_dir {
            if !gold.exists() {
                return Err(Error::InvalidConfig(
                    "Expected (Gold) Results Directory does not exist.".into(),
                ));
            }
            if !gold.is_dir() {
                return Err(Error::InvalidConfig(
                    "Expected (Gold) Results Path does not point to a directory.".into(),
                ));
            }
        }
        Ok(Self {
            gold_dir: config.gold_dir,
            actual_dir: config.actual_dir,
            differ: Box::new(PageDiffer),
        })
    }

    /// Replace the comparison strategy.
    pub fn with_differ(mut self, differ: impl PdfDiffer + 'static) -> Self {
        self.differ = Box::new(differ);
        self
    }

    /// Matches PDF bytes equal to `expected`.
    ///
    /// A relative `expected` path is resolved against the gold directory. On
    /// a difference the tested bytes are written to the actual directory as
    /// `<name>_result.<ext>` and the diff artifact as `<name>_diff.<ext>`.
    pub fn compares_equal<P: AsRef<Path>>(&self, expected: P) -> impl Matcher<[u8]> + '_ {
        ComparesEqual {
            comparer: self,
            expected: self.resolve_gold(expected.as_ref()),
        }
    }

    /// Matches PDF bytes that differ from `expected`. Nothing is written.
    pub fn compares_not_equal<P: AsRef<Path>>(&self, expected: P) -> impl Matcher<[u8]> + '_ {
        ComparesNotEqual {
            comparer: self,
            expected: self.resolve_gold(expected.as_ref()),
        }
    }

    fn resolve_gold(&self, expected: &Path) -> PathBuf {
        match self.gold_dir {
            Some(ref gold) if expected.is_relative() => gold.join(expected),
            _ => expected.to_path_buf(),
        }
    }

    fn compare(&self, gold: &Path, actual: &[u8]) -> PdfDiff {
        let diff = std::fs::read(gold)
            .map_err(Error::from)
            .and_then(|expected| self.differ.diff(&expected, actual));
        match diff {
            Ok(diff) => {
                debug!(gold = %gold.display(), equal = diff.is_equal(), "compared PDFs");
                diff
            }
            Err(e) => panic!("error while comparing PDFs against {}: {e}", gold.display()),
        }
    }

    fn result_path(&self, gold: &Path, qualifier: &str) -> PathBuf {
        let renamed = replace_qualifier(gold, qualifier);
        let name = renamed.file_name().unwrap_or(renamed.as_os_str());
        self.actual_dir.join(name)
    }

    /// Write the tested bytes and the diff artifact; returns the artifact path.
    fn write_results(&self, gold: &Path, actual: &[u8], diff: &PdfDiff) -> Result<Option<PathBuf>> {
        std::fs::create_dir_all(&self.actual_dir)?;

        let result_path = self.result_path(gold, RESULT_QUALIFIER);
        std::fs::write(&result_path, actual)?;
        debug!(path = %result_path.display(), "wrote tested PDF");

        let Some(ref artifact) = diff.artifact else {
            return Ok(None);
        };
        let diff_path = self.result_path(gold, DIFF_QUALIFIER);
        std::fs::write(&diff_path, artifact)?;
        debug!(path = %diff_path.display(), "wrote PDF diff");
        Ok(Some(diff_path))
    }
}

struct ComparesEqual<'a> {
    comparer: &'a PdfComparer,
    expected: PathBuf,
}

impl Matcher<[u8]> for ComparesEqual<'_> {
    fn describe_to(&self, description: &mut Description) {
        description
            .append_text("pdfs should match ")
            .append_text(&self.expected.display().to_string());
    }

    fn matches(&self, item: &[u8], mismatch: &mut Description) -> bool {
        let diff = self.comparer.compare(&self.expected, item);
        if diff.is_equal() {
            return true;
        }

        mismatch.append_text("Differences were found");
        match self.comparer.write_results(&self.expected, item, &diff) {
            Ok(Some(path)) => {
                mismatch.append_text(&format!(", Diff written to {}", path.display()));
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "cannot write comparison results");
                mismatch.append_text(&format!(", results could not be written ({e})"));
            }
        }
        mismatch.append_text(&format!(
            " (pages expected={}, actual={}, differing=",
            diff.expected_pages, diff.actual_pages
        ));
        mismatch.append_value_list("[", ",", "]", &diff.differing_pages).append_text(")");
        false
    }
}

struct ComparesNotEqual<'a> {
    comparer: &'a PdfComparer,
    expected: PathBuf,
}

impl Matcher<[u8]> for ComparesNotEqual<'_> {
    fn describe_to(&self, description: &mut Description) {
        description
            .append_text("pdfs should differ from ")
            .append_text(&self.expected.display().to_string());
    }

    fn matches(&self, item: &[u8], mismatch: &mut Description) -> bool {
        let result = !self.comparer.compare(&self.expected, item).is_equal();
        if !result {
            mismatch.append_text("no differences were found.");
        }
        result
    }
}
