//! # formmatchers
//!
//! Test matchers for the artifacts a forms/document platform produces: PDF
//! files, rendered HTML forms, raster images and HTTP responses.
//!
//! ## What this crate does
//!
//! 1. **Inspect PDFs** — [`Pdf`] answers structural questions (dynamic,
//!    interactive, tagged, XFA, fonts, usage rights) by walking the low-level
//!    object graph directly.
//! 2. **Derive result filenames** — [`path_utils`] strips extensions and swaps
//!    `_qualifier` suffixes (`foo_gold.pdf` → `foo_diff.pdf`).
//! 3. **Assert with readable failures** — every check is a [`Matcher`] with a
//!    description of what was expected and what was found.
//! 4. **Compare against gold files** — [`PdfComparer`] and [`image_matcher`]
//!    compare output with expected files and write diffs when they differ.
//!
//! ## Quick example
//!
//! ```no_run
//! use formmatchers::{assert_that, pdf_matchers, Pdf};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pdf = Pdf::from_path("SampleForm.pdf")?;
//!
//! assert_that(&pdf, pdf_matchers::is_interactive());
//! assert_that(&pdf, pdf_matchers::has_xfa(true));
//!
//! if let Some(rights) = pdf.usage_rights()? {
//!     println!("{rights}");
//! }
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use thiserror::Error;

mod matcher;
mod pdf;
mod pdf_utils;
mod usage_rights;

pub mod error_matchers;
pub mod html_form;
pub mod image_matcher;
pub mod path_utils;
pub mod pdf_comparer;
pub mod pdf_matchers;
pub mod response_matchers;

pub use html_form::HtmlForm;
pub use matcher::{
    all_of, assert_that, check, contains_string, equal_to, feature, not, ContainsString, Description,
    Matcher,
};
pub use pdf::Pdf;
pub use pdf_comparer::{PageDiffer, PdfComparer, PdfDiff, PdfDiffer};
pub use usage_rights::{UsageRights, UsageRightsBuilder};

// ── Configuration ────────────────────────────────────────────────────────────

/// Directories used by [`PdfComparer`].
#[derive(Debug, Clone, Default)]
pub struct ComparerConfig {
    /// Directory holding the expected ("gold") PDFs. Relative expected paths
    /// are resolved against it. When set it must already exist.
    pub gold_dir: Option<PathBuf>,

    /// Directory where the tested bytes and the diff artifact are written when
    /// a comparison fails. Created on demand.
    pub actual_dir: PathBuf,
}

/// Tolerances used by [`image_matcher`].
#[derive(Debug, Clone, Copy)]
pub struct ImageCompareConfig {
    /// Percentage (0–100) of pixels allowed to differ before two images
    /// stop matching.
    pub allowed_percent_different_pixels: f64,

    /// Normalised RGB distance (0–1) below which two pixels count as equal.
    pub pixel_tolerance: f64,
}

impl Default for ImageCompareConfig {
    fn default() -> Self {
        Self {
            allowed_percent_different_pixels: 0.0001165,
            pixel_tolerance: 0.1,
        }
    }
}

// ── Error type ───────────────────────────────────────────────────────────────

/// Every error that this crate can produce.
///
/// Errors come in two tiers. Load and I/O failures are ordinary errors the
/// caller is expected to handle. Structural assumptions about the PDF under
/// test that turn out to be wrong are defects: see [`Error::is_defect`].
#[derive(Error, Debug)]
pub enum Error {
    /// A filesystem or stream I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The underlying lopdf parser returned an error.
    #[error("PDF parse error: {0}")]
    Parse(#[from] lopdf::Error),

    /// The input parsed but is not a usable PDF document.
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// Loading a PDF from the file system failed.
    #[error("Error reading file ({}): {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// An image could not be decoded or encoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// An HTML selector could not be compiled.
    #[error("HTML error: {0}")]
    Html(String),

    /// A matcher or comparer was configured with an unusable value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The PDF has a shape this crate does not support (e.g. a usage rights
    /// signature with more than one reference).
    #[error("unsupported PDF structure: {0}")]
    UnsupportedStructure(String),

    /// A font listed in a resource dictionary could not be resolved.
    #[error("cannot resolve font '{name}': {reason}")]
    FontResolution { name: String, reason: String },
}

impl Error {
    /// Returns `true` for defect-class errors.
    ///
    /// A defect means the document under test broke an assumption about its
    /// structure; it is not something a caller can recover from and matchers
    /// let it fail the test as-is.
    pub fn is_defect(&self) -> bool {
        match self {
            Error::UnsupportedStructure(_) | Error::FontResolution { .. } => true,
            Error::ReadFile { source, .. } => source.is_defect(),
            _ => false,
        }
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
