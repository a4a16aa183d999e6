// Shared fixtures: small PDFs assembled in memory with lopdf.
#![allow(dead_code)]

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

// ── Builder ───────────────────────────────────────────────────────────────────

pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    catalog: Dictionary,
    inherited_resources: Option<Dictionary>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            catalog: dictionary! {
                "Type" => "Catalog",
                "Pages" => pages_id,
            },
            inherited_resources: None,
        }
    }

    pub fn add_object(&mut self, object: impl Into<Object>) -> ObjectId {
        self.doc.add_object(object)
    }

    /// Add a page; `None` resources makes the page inherit from the page tree.
    pub fn page(self, resources: Option<Dictionary>, content: &str) -> Self {
        self.annotated_page(resources, content, Vec::new())
    }

    pub fn annotated_page(mut self, resources: Option<Dictionary>, content: &str, annots: Vec<Object>) -> Self {
        let content_id = self.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => media_box(612, 792),
            "Contents" => content_id,
        };
        if let Some(resources) = resources {
            page.set("Resources", resources);
        }
        if !annots.is_empty() {
            page.set("Annots", annots);
        }
        let page_id = self.add_object(page);
        self.kids.push(page_id.into());
        self
    }

    pub fn inherited_resources(mut self, resources: Dictionary) -> Self {
        self.inherited_resources = Some(resources);
        self
    }

    pub fn catalog_entry(mut self, key: &str, value: impl Into<Object>) -> Self {
        self.catalog.set(key, value);
        self
    }

    pub fn build(mut self) -> Document {
        let mut pages = dictionary! {
            "Type" => "Pages",
            "Count" => self.kids.len() as i64,
            "Kids" => self.kids,
        };
        if let Some(resources) = self.inherited_resources {
            pages.set("Resources", resources);
        }
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));
        let catalog_id = self.doc.add_object(self.catalog);
        self.doc.trailer.set("Root", catalog_id);
        self.doc
    }

    pub fn to_bytes(self) -> Vec<u8> {
        let mut doc = self.build();
        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("failed to save test PDF");
        buf
    }
}

fn media_box(width: i64, height: i64) -> Vec<Object> {
    vec![Object::Integer(0), Object::Integer(0), Object::Integer(width), Object::Integer(height)]
}

// ── Fonts ─────────────────────────────────────────────────────────────────────

pub fn standard_font(base_font: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
    }
}

fn font_descriptor(b: &mut PdfBuilder, base_font: &str, file_key: &str) -> ObjectId {
    let file_id = b.add_object(Stream::new(dictionary! {}, vec![0u8; 16]));
    let mut descriptor = dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => base_font,
        "Flags" => 32i64,
    };
    descriptor.set(file_key, file_id);
    b.add_object(descriptor)
}

pub fn embedded_truetype(b: &mut PdfBuilder, base_font: &str) -> ObjectId {
    let descriptor_id = font_descriptor(b, base_font, "FontFile2");
    b.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "TrueType",
        "BaseFont" => base_font,
        "FontDescriptor" => descriptor_id,
    })
}

pub fn embedded_opentype(b: &mut PdfBuilder, base_font: &str) -> ObjectId {
    let descriptor_id = font_descriptor(b, base_font, "FontFile3");
    b.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "FontDescriptor" => descriptor_id,
    })
}

pub fn embedded_type0(b: &mut PdfBuilder, base_font: &str) -> ObjectId {
    let descriptor_id = font_descriptor(b, base_font, "FontFile3");
    let descendant_id = b.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType0",
        "BaseFont" => base_font,
        "FontDescriptor" => descriptor_id,
    });
    b.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => base_font,
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::from(descendant_id)],
    })
}

pub fn type3_font(b: &mut PdfBuilder, name: &str) -> ObjectId {
    b.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type3",
        "Name" => name,
        "FontBBox" => media_box(1000, 1000),
    })
}

// ── Documents ─────────────────────────────────────────────────────────────────

/// Three-page static document without a form.
///
/// Page fonts: Helvetica (standard), ArialMT (embedded), T3 (Type 3) and,
/// inherited from the page tree on page 3, HeiseiMin-W3 (embedded CID font).
pub fn non_interactive_pdf() -> PdfBuilder {
    let mut b = PdfBuilder::new();
    let arial = embedded_truetype(&mut b, "ArialMT");
    let t3 = type3_font(&mut b, "T3");
    let heisei = embedded_type0(&mut b, "HeiseiMin-W3");

    b.page(
        Some(dictionary! {
            "Font" => dictionary! {
                "F1" => standard_font("Helvetica"),
                "F2" => arial,
            },
        }),
        "BT /F1 12 Tf 72 720 Td (Page one) Tj ET",
    )
    .page(
        Some(dictionary! {
            "Font" => dictionary! {
                "F2" => arial,
                "F3" => t3,
            },
        }),
        "BT /F2 12 Tf 72 720 Td (Page two) Tj ET",
    )
    .inherited_resources(dictionary! {
        "Font" => dictionary! { "F4" => heisei },
    })
    .page(None, "BT /F4 12 Tf 72 720 Td (Page three) Tj ET")
}

/// Dynamic, tagged XFA form.
///
/// The form's default resources hold the embedded MyriadPro-Regular and the
/// standard Helvetica.
pub fn sample_form_pdf() -> PdfBuilder {
    let mut b = PdfBuilder::new();
    let myriad = embedded_opentype(&mut b, "MyriadPro-Regular");
    let xfa = b.add_object(Stream::new(
        dictionary! {},
        b"<xdp:xdp xmlns:xdp=\"http://ns.adobe.com/xdp/\"></xdp:xdp>".to_vec(),
    ));

    b.page(
        Some(dictionary! {
            "Font" => dictionary! { "Helv" => standard_font("Helvetica") },
        }),
        "BT /Helv 12 Tf 72 720 Td (Please wait...) Tj ET",
    )
    .catalog_entry("NeedsRendering", true)
    .catalog_entry("MarkInfo", dictionary! { "Marked" => true })
    .catalog_entry(
        "AcroForm",
        dictionary! {
            "Fields" => Vec::<Object>::new(),
            "XFA" => xfa,
            "DR" => dictionary! {
                "Font" => dictionary! {
                    "MyriadPro" => myriad,
                    "Helv" => standard_font("Helvetica"),
                },
            },
        },
    )
}

/// A usage rights signature reference granting a typical Reader Extensions
/// rights set.
pub fn rights_reference() -> Dictionary {
    let names = |names: &[&str]| names.iter().map(|&n| Object::from(n)).collect::<Vec<_>>();
    dictionary! {
        "Type" => "SigRef",
        "TransformMethod" => "UR3",
        "TransformParams" => dictionary! {
            "Type" => "TransformParams",
            "Annots" => names(&["Create", "Delete", "Modify", "Copy", "Import", "Export"]),
            "Form" => names(&["Add", "Delete", "FillIn", "Import", "Export", "SubmitStandalone", "SpawnTemplate"]),
            "FormEx" => names(&["BarcodePlaintext"]),
            "EF" => names(&["Create", "Delete", "Modify", "Import"]),
            "V" => "2.2",
        },
    }
}

/// A form whose `/Perms` holds a signature under `key` (`UR` or `UR3`) with
/// the given `/Reference` entries.
pub fn rights_pdf(key: &str, references: Vec<Object>) -> PdfBuilder {
    let mut signature = dictionary! {
        "Type" => "Sig",
        "Filter" => "Adobe.PPKLite",
        "SubFilter" => "adbe.pkcs7.detached",
    };
    signature.set("Reference", references);
    let mut perms = Dictionary::new();
    perms.set(key, signature);

    PdfBuilder::new()
        .page(
            Some(dictionary! {
                "Font" => dictionary! { "Helv" => standard_font("Helvetica") },
            }),
            "BT /Helv 12 Tf 72 720 Td (Rights enabled) Tj ET",
        )
        .catalog_entry("AcroForm", dictionary! { "Fields" => Vec::<Object>::new() })
        .catalog_entry("Perms", perms)
}

/// Document with one page per entry, each page showing its text.
pub fn text_pdf(pages: &[&str]) -> Vec<u8> {
    let mut b = PdfBuilder::new();
    for text in pages {
        b = b.page(
            Some(dictionary! {
                "Font" => dictionary! { "F1" => standard_font("Helvetica") },
            }),
            &format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET"),
        );
    }
    b.to_bytes()
}

/// One page painting a 1x1 grey image of the given level. `padding` unused
/// objects are added first, shifting every object number.
pub fn image_pdf(gray: u8, padding: usize) -> Vec<u8> {
    let mut b = PdfBuilder::new();
    for _ in 0..padding {
        b.add_object(Object::Null);
    }
    let image = b.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1i64,
            "Height" => 1i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8i64,
        },
        vec![gray],
    ));
    b.page(
        Some(dictionary! { "XObject" => dictionary! { "Im1" => image } }),
        "q 100 0 0 100 72 600 cm /Im1 Do Q",
    )
    .to_bytes()
}

/// One page with a text field widget whose normal appearance shows `value`.
pub fn filled_field_pdf(value: &str) -> Vec<u8> {
    let mut b = PdfBuilder::new();
    let appearance = b.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => media_box(200, 20),
        },
        format!("/Tx BMC BT /Helv 10 Tf 2 6 Td ({value}) Tj ET EMC").into_bytes(),
    ));
    let widget = b.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => Object::string_literal("name"),
        "Rect" => media_box(200, 20),
        "AP" => dictionary! { "N" => appearance },
    });
    let field = Object::from(widget);
    b.annotated_page(
        Some(dictionary! {
            "Font" => dictionary! { "Helv" => standard_font("Helvetica") },
        }),
        "",
        vec![field.clone()],
    )
    .catalog_entry("AcroForm", dictionary! { "Fields" => vec![field] })
    .to_bytes()
}
