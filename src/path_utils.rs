//! Filename helpers for deriving result and diff file names from a gold file.
//!
//! A *qualifier* is the segment after the last `_` of a file name, before the
//! extension: in `foo_result.pdf` the qualifier is `result`.
//!
//! All functions are string based and never touch the file system. Paths are
//! not normalised, so a trailing `.` segment is treated as a file name.
//! Trailing separators are ignored: `parent/` names the file `parent`.

use std::path::{is_separator, Path, PathBuf};

const EXTENSION_CHAR: char = '.';
const QUALIFIER_CHAR: char = '_';

// ── Filename ─────────────────────────────────────────────────────────────────

/// A path split into directory, base name, qualifier and extension.
///
/// ```
/// use formmatchers::path_utils::Filename;
///
/// let f = Filename::parse("gold/invoice_gold.pdf");
/// assert_eq!(f.directory.as_deref(), Some("gold"));
/// assert_eq!(f.base_name, "invoice");
/// assert_eq!(f.qualifier.as_deref(), Some("gold"));
/// assert_eq!(f.extension.as_deref(), Some("pdf"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filename {
    pub directory: Option<String>,
    pub base_name: String,
    pub qualifier: Option<String>,
    pub extension: Option<String>,
}

impl Filename {
    pub fn parse<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_string_lossy();
        let (directory, name) = split_parent(&path);

        let (stem, extension) = match name.rfind(EXTENSION_CHAR) {
            Some(idx) => {
                let ext = &name[idx + 1..];
                (&name[..idx], (!ext.is_empty()).then(|| ext.to_string()))
            }
            None => (name, None),
        };

        // An underscore in first position is part of the name, not a qualifier.
        let has_qualifier = stem.find(QUALIFIER_CHAR).is_some_and(|idx| idx > 0);
        let (base_name, qualifier) = match stem.rfind(QUALIFIER_CHAR) {
            Some(idx) if has_qualifier => (&stem[..idx], Some(stem[idx + 1..].to_string())),
            _ => (stem, None),
        };

        Self {
            directory: directory.map(str::to_string),
            base_name: base_name.to_string(),
            qualifier,
            extension,
        }
    }

    /// Returns a copy with the qualifier replaced (or added).
    pub fn with_qualifier(&self, qualifier: &str) -> Self {
        Self {
            qualifier: Some(qualifier.to_string()),
            ..self.clone()
        }
    }

    /// The file name part: `base[_qualifier][.extension]`.
    pub fn file_name(&self) -> String {
        let mut name = self.base_name.clone();
        if let Some(ref q) = self.qualifier {
            name.push(QUALIFIER_CHAR);
            name.push_str(q);
        }
        if let Some(ref ext) = self.extension {
            name.push(EXTENSION_CHAR);
            name.push_str(ext);
        }
        name
    }

    pub fn to_path(&self) -> PathBuf {
        replace_filename(self.directory.as_deref(), &self.file_name())
    }
}

// ── Operations ───────────────────────────────────────────────────────────────

/// Removes the extension from the final path segment.
///
/// ```
/// use formmatchers::path_utils::remove_extension;
/// use std::path::PathBuf;
///
/// assert_eq!(remove_extension("parent/foo.bar"), PathBuf::from("parent/foo"));
/// assert_eq!(remove_extension("foo"), PathBuf::from("foo"));
/// ```
pub fn remove_extension<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref().to_string_lossy();
    let (directory, name) = split_parent(&path);
    replace_filename(directory, truncate_from(name, EXTENSION_CHAR))
}

/// Returns the extension of the final path segment, or an empty string if it
/// has none.
pub fn extension<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref().to_string_lossy();
    let (_, name) = split_parent(&path);
    name.rfind(EXTENSION_CHAR)
        .map(|idx| name[idx + 1..].to_string())
        .unwrap_or_default()
}

/// Replaces the qualifier of a file name while keeping its extension.
///
/// ```
/// use formmatchers::path_utils::replace_qualifier;
/// use std::path::PathBuf;
///
/// assert_eq!(replace_qualifier("foo_gold.pdf", "diff"), PathBuf::from("foo_diff.pdf"));
/// assert_eq!(replace_qualifier("foo.pdf", "diff"), PathBuf::from("foo_diff.pdf"));
/// ```
pub fn replace_qualifier<P: AsRef<Path>>(path: P, new_qualifier: &str) -> PathBuf {
    Filename::parse(path).with_qualifier(new_qualifier).to_path()
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn split_parent(path: &str) -> (Option<&str>, &str) {
    let path = match path.trim_end_matches(is_separator) {
        // Nothing but separators: the root itself.
        "" if !path.is_empty() => return (Some(&path[..1]), ""),
        trimmed => trimmed,
    };
    match path.rfind(is_separator) {
        // Keep the root separator for absolute paths like "/foo".
        Some(0) => (Some(&path[..1]), &path[1..]),
        Some(idx) => (Some(&path[..idx]), &path[idx + 1..]),
        None => (None, path),
    }
}

fn truncate_from(name: &str, target: char) -> &str {
    name.rfind(target).map_or(name, |idx| &name[..idx])
}

fn replace_filename(directory: Option<&str>, name: &str) -> PathBuf {
    match directory {
        Some(dir) if name.is_empty() => PathBuf::from(dir),
        Some(dir) => Path::new(dir).join(name),
        None => PathBuf::from(name),
    }
}
