use crate::pdf_utils::{dict_entry, dict_entry_array, dict_entry_dict, name_to_string, page_resources, resolve_dict};
use crate::{Error, Result, UsageRights};
use lopdf::{Dictionary, Document, Object};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

const NEEDS_RENDERING_KEY: &[u8] = b"NeedsRendering";
const PERMISSIONS_KEY: &[u8] = b"Perms";
const USAGE_RIGHTS_KEY_OLD: &[u8] = b"UR";
const USAGE_RIGHTS_KEY_NEW: &[u8] = b"UR3";
const FONT_FILE_KEYS: [&[u8]; 3] = [b"FontFile", b"FontFile2", b"FontFile3"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FontFilter {
    All,
    Embedded,
}

// ── Pdf ──────────────────────────────────────────────────────────────────────

/// A parsed PDF that can be queried about its properties.
///
/// Every query reads the low-level dictionaries of the document directly.
///
/// The `Pdf` owns its parsed object graph exclusively. It is released when
/// the value is dropped or passed to [`Pdf::close`]. Parallel tests should
/// each load their own `Pdf`.
///
/// ```no_run
/// use formmatchers::Pdf;
///
/// let pdf = Pdf::from_path("SampleForm.pdf").unwrap();
/// println!("dynamic     : {}", pdf.is_dynamic());
/// println!("interactive : {}", pdf.is_interactive());
/// println!("fonts       : {:?}", pdf.embedded_fonts().unwrap());
/// pdf.close();
/// ```
#[derive(Debug)]
pub struct Pdf {
    document: Document,
}

impl Pdf {
    // ── Constructors ──────────────────────────────────────────────────────────

    /// Wrap an already parsed document. Fails when it has no catalog.
    pub fn from_document(document: Document) -> Result<Self> {
        document
            .catalog()
            .map_err(|e| Error::InvalidPdf(format!("missing or invalid catalog: {e}")))?;
        debug!(pages = document.get_pages().len(), "loaded PDF");
        Ok(Self { document })
    }

    /// Load a PDF from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_document(Document::load_mem(data)?)
    }

    /// Load a PDF by reading `reader` to the end.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Load a PDF from the file system. Errors carry the offending path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        std::fs::read(path)
            .map_err(Error::from)
            .and_then(|data| Self::from_bytes(&data))
            .map_err(|e| Error::ReadFile {
                path: path.to_path_buf(),
                source: Box::new(e),
            })
    }

    /// Release the parsed document.
    pub fn close(self) {
        drop(self.document);
    }

    /// Returns a reference to the underlying [`lopdf::Document`].
    pub fn document(&self) -> &Document {
        &self.document
    }

    // ── Structure ─────────────────────────────────────────────────────────────

    /// Returns `true` for a dynamic (XFA rendered) PDF, `false` for a static
    /// one. Reads the catalog's `/NeedsRendering` flag.
    pub fn is_dynamic(&self) -> bool {
        self.catalog_entry(NEEDS_RENDERING_KEY)
            .and_then(|o| o.as_bool().ok())
            .unwrap_or(false)
    }

    /// Returns `true` when the catalog carries an interactive form
    /// (`/AcroForm`) dictionary.
    pub fn is_interactive(&self) -> bool {
        self.acro_form().is_some()
    }

    /// Returns `true` when the interactive form carries an XFA package.
    pub fn has_xfa(&self) -> bool {
        self.acro_form().is_some_and(|form| form.has(b"XFA"))
    }

    /// Returns `true` when `/MarkInfo` declares the document as marked.
    pub fn is_tagged(&self) -> bool {
        self.catalog_entry(b"MarkInfo")
            .and_then(|o| o.as_dict().ok())
            .and_then(|mark_info| dict_entry(&self.document, mark_info, b"Marked"))
            .and_then(|o| o.as_bool().ok())
            .unwrap_or(false)
    }

    // ── Fonts ─────────────────────────────────────────────────────────────────

    /// Names of the fonts used by the document.
    ///
    /// For an interactive form this reads the form's default resources and,
    /// like [`Pdf::embedded_fonts`], only reports embedded fonts. For other
    /// documents every page's resources are scanned and the de-duplicated
    /// names are returned in sorted order.
    pub fn all_fonts(&self) -> Result<Vec<String>> {
        self.list_fonts(FontFilter::All)
    }

    /// Names of the fonts embedded in the document.
    pub fn embedded_fonts(&self) -> Result<Vec<String>> {
        self.list_fonts(FontFilter::Embedded)
    }

    fn list_fonts(&self, filter: FontFilter) -> Result<Vec<String>> {
        if let Some(acro_form) = self.acro_form() {
            // Interactive form: default resources, embedded fonts only.
            let Some(resources) = dict_entry_dict(&self.document, acro_form, b"DR") else {
                return Ok(Vec::new());
            };
            return self.font_names(resources, FontFilter::Embedded);
        }

        let mut names = BTreeSet::new();
        for (page_no, page_id) in self.document.get_pages() {
            match page_resources(&self.document, page_id) {
                Some(resources) => names.extend(self.font_names(resources, filter)?),
                None => debug!(page_no, "page has no resources"),
            }
        }
        Ok(names.into_iter().collect())
    }

    fn font_names(&self, resources: &Dictionary, filter: FontFilter) -> Result<Vec<String>> {
        let Some(fonts) = dict_entry_dict(&self.document, resources, b"Font") else {
            return Ok(Vec::new());
        };

        let mut names = Vec::new();
        for (key, value) in fonts.iter() {
            let resource_name = String::from_utf8_lossy(key).into_owned();
            let font = resolve_dict(&self.document, value).ok_or_else(|| Error::FontResolution {
                name: resource_name.clone(),
                reason: "font entry does not resolve to a dictionary".into(),
            })?;

            if filter == FontFilter::Embedded && !self.is_embedded(font) {
                continue;
            }

            let name = [b"BaseFont" as &[u8], b"Name"]
                .into_iter()
                .find_map(|k| font.get(k).ok().and_then(name_to_string))
                .unwrap_or(resource_name);
            names.push(name);
        }
        Ok(names)
    }

    fn is_embedded(&self, font: &Dictionary) -> bool {
        match font.get(b"Subtype").and_then(Object::as_name) {
            // Type 3 glyphs are always defined inside the document.
            Ok(b"Type3") => true,
            Ok(b"Type0") => dict_entry_array(&self.document, font, b"DescendantFonts")
                .and_then(|kids| kids.first())
                .and_then(|kid| resolve_dict(&self.document, kid))
                .is_some_and(|kid| self.has_font_file(kid)),
            _ => self.has_font_file(font),
        }
    }

    fn has_font_file(&self, font: &Dictionary) -> bool {
        dict_entry_dict(&self.document, font, b"FontDescriptor")
            .is_some_and(|descriptor| FONT_FILE_KEYS.iter().any(|k| descriptor.has(k)))
    }

    // ── Usage rights ──────────────────────────────────────────────────────────

    /// Returns `Ok(true)` when usage rights have been assigned to the document.
    pub fn has_rights(&self) -> Result<bool> {
        Ok(self.usage_rights()?.is_some())
    }

    /// Read the usage rights granted by Reader Extensions or Acrobat.
    ///
    /// The rights live at:
    ///
    /// ```text
    /// Catalog
    ///   /Perms
    ///     /UR or /UR3                 ← usage rights signature
    ///       /Reference [ << ... >> ]  ← exactly one signature reference
    ///         /TransformParams
    ///           /Annots /Form /FormEx /EF   ← arrays of right names
    /// ```
    ///
    /// Returns `Ok(None)` when `/Perms`, the signature dictionary or its
    /// `/Reference` array is missing. A `/Reference` array with anything other
    /// than one entry, or a malformed entry below it, is reported as
    /// [`Error::UnsupportedStructure`].
    pub fn usage_rights(&self) -> Result<Option<UsageRights>> {
        let document = &self.document;

        let Some(perms) = self.catalog_entry(PERMISSIONS_KEY).and_then(|o| o.as_dict().ok()) else {
            return Ok(None);
        };
        let Some(signature) = [USAGE_RIGHTS_KEY_OLD, USAGE_RIGHTS_KEY_NEW]
            .into_iter()
            .find_map(|key| dict_entry_dict(document, perms, key))
        else {
            return Ok(None);
        };
        let Some(references) = dict_entry_array(document, signature, b"Reference") else {
            return Ok(None);
        };

        if references.len() != 1 {
            warn!(entries = references.len(), "unexpected usage rights reference count");
            return Err(Error::UnsupportedStructure(format!(
                "Expected only 1 entry in the UR Array, found {}.",
                references.len()
            )));
        }

        let reference = resolve_dict(document, &references[0]).ok_or_else(|| {
            Error::UnsupportedStructure("usage rights reference is not a dictionary".into())
        })?;
        let params = dict_entry_dict(document, reference, b"TransformParams").ok_or_else(|| {
            Error::UnsupportedStructure("usage rights reference has no /TransformParams".into())
        })?;

        let mut builder = UsageRights::builder();
        for right in self.right_names(params, b"Annots")? {
            builder.add_annots_right(right);
        }
        for right in self.right_names(params, b"Form")? {
            builder.add_form_right(right);
        }
        for right in self.right_names(params, b"FormEx")? {
            builder.add_form_ex_right(right);
        }
        for right in self.right_names(params, b"EF")? {
            builder.add_ef_right(right);
        }

        let rights = builder.build();
        debug!(%rights, "read usage rights");
        Ok(Some(rights))
    }

    /// Names listed under `key` in `/TransformParams`; empty when absent.
    fn right_names(&self, params: &Dictionary, key: &[u8]) -> Result<Vec<String>> {
        let Some(values) = dict_entry_array(&self.document, params, key) else {
            return Ok(Vec::new());
        };
        values
            .iter()
            .map(|v| {
                name_to_string(v).ok_or_else(|| {
                    Error::UnsupportedStructure(format!(
                        "/{} usage right is not a name",
                        String::from_utf8_lossy(key)
                    ))
                })
            })
            .collect()
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn catalog_entry(&self, key: &[u8]) -> Option<&Object> {
        let catalog = self.document.catalog().ok()?;
        dict_entry(&self.document, catalog, key)
    }

    fn acro_form(&self) -> Option<&Dictionary> {
        self.catalog_entry(b"AcroForm").and_then(|o| o.as_dict().ok())
    }
}
