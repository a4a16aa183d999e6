//! Matchers over a parsed [`Pdf`].
//!
//! ```no_run
//! use formmatchers::{assert_that, pdf_matchers::*, Pdf};
//!
//! let pdf = Pdf::from_path("SampleForm.pdf").unwrap();
//! assert_that(&pdf, is_interactive());
//! assert_that(&pdf, is_dynamic());
//! assert_that(&pdf, has_xfa(true));
//! assert_that(&pdf, has_embedded_fonts(&["MyriadPro-Regular"]));
//! ```
//!
//! Defect-class errors raised while inspecting the document (see
//! [`crate::Error::is_defect`]) are not mismatches; they fail the test with a
//! panic carrying the error.

use crate::{Description, Matcher, Pdf, Result};

// ── Boolean properties ───────────────────────────────────────────────────────

struct Property {
    expected: &'static str,
    actual_when_false: &'static str,
    test: fn(&Pdf) -> bool,
}

impl Matcher<Pdf> for Property {
    fn describe_to(&self, description: &mut Description) {
        description.append_text(self.expected);
    }

    fn matches(&self, item: &Pdf, mismatch: &mut Description) -> bool {
        let result = (self.test)(item);
        if !result {
            mismatch.append_text(self.actual_when_false);
        }
        result
    }
}

pub fn is_interactive() -> impl Matcher<Pdf> {
    Property {
        expected: "should be interactive.",
        actual_when_false: "was non-interactive.",
        test: Pdf::is_interactive,
    }
}

pub fn is_non_interactive() -> impl Matcher<Pdf> {
    Property {
        expected: "should be non-interactive.",
        actual_when_false: "was interactive.",
        test: |pdf| !pdf.is_interactive(),
    }
}

pub fn is_dynamic() -> impl Matcher<Pdf> {
    Property {
        expected: "should be dynamic.",
        actual_when_false: "was static.",
        test: Pdf::is_dynamic,
    }
}

pub fn is_static() -> impl Matcher<Pdf> {
    Property {
        expected: "should be static.",
        actual_when_false: "was dynamic.",
        test: |pdf| !pdf.is_dynamic(),
    }
}

pub fn is_tagged() -> impl Matcher<Pdf> {
    Property {
        expected: "should be tagged.",
        actual_when_false: "was not tagged.",
        test: Pdf::is_tagged,
    }
}

struct HasXfa(bool);

impl Matcher<Pdf> for HasXfa {
    fn describe_to(&self, description: &mut Description) {
        description
            .append_text("should")
            .append_text(if self.0 { " " } else { " not " })
            .append_text("be an XFA Pdf.");
    }

    fn matches(&self, item: &Pdf, mismatch: &mut Description) -> bool {
        let result = item.has_xfa() == self.0;
        if !result {
            mismatch
                .append_text("was")
                .append_text(if self.0 { " not " } else { " " })
                .append_text("an XFA Pdf.");
        }
        result
    }
}

/// Matches when the presence of an XFA package equals `has_xfa`.
pub fn has_xfa(has_xfa: bool) -> impl Matcher<Pdf> {
    HasXfa(has_xfa)
}

// ── Usage rights ─────────────────────────────────────────────────────────────

struct HasRights;

impl Matcher<Pdf> for HasRights {
    fn describe_to(&self, description: &mut Description) {
        description.append_text("should have usage rights.");
    }

    fn matches(&self, item: &Pdf, mismatch: &mut Description) -> bool {
        let result = or_panic(item.has_rights());
        if !result {
            mismatch.append_text("had no usage rights.");
        }
        result
    }
}

pub fn has_rights() -> impl Matcher<Pdf> {
    HasRights
}

// ── Fonts ────────────────────────────────────────────────────────────────────

struct HasFonts {
    expected: Vec<String>,
    embedded_only: bool,
}

impl Matcher<Pdf> for HasFonts {
    fn describe_to(&self, description: &mut Description) {
        description
            .append_text(if self.embedded_only { "should have embedded fonts " } else { "should have fonts " })
            .append_value_list("['", "','", "']", &self.expected)
            .append_text(".");
    }

    fn matches(&self, item: &Pdf, mismatch: &mut Description) -> bool {
        let actual = or_panic(if self.embedded_only {
            item.embedded_fonts()
        } else {
            item.all_fonts()
        });
        let result = self.expected.iter().all(|name| actual.contains(name));
        if !result {
            mismatch
                .append_text("fonts were ")
                .append_value_list("['", "','", "']", &actual)
                .append_text(".");
        }
        result
    }
}

/// Matches when every name in `font_names` is among [`Pdf::all_fonts`].
pub fn has_fonts(font_names: &[&str]) -> impl Matcher<Pdf> {
    HasFonts {
        expected: font_names.iter().map(|s| s.to_string()).collect(),
        embedded_only: false,
    }
}

/// Matches when every name in `font_names` is among [`Pdf::embedded_fonts`].
pub fn has_embedded_fonts(font_names: &[&str]) -> impl Matcher<Pdf> {
    HasFonts {
        expected: font_names.iter().map(|s| s.to_string()).collect(),
        embedded_only: true,
    }
}

fn or_panic<T>(result: Result<T>) -> T {
    result.unwrap_or_else(|e| panic!("error while inspecting PDF: {e}"))
}
