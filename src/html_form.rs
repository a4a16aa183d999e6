//! Rendered HTML5 forms and matchers over them.

use crate::{Description, Error, Matcher, Result};
use scraper::{Html, Selector};

const TITLE_SELECTOR: &str = "title";
const FIELD_LABEL_SELECTOR: &str = "div.guideFieldLabel > label";

/// A parsed HTML form page.
///
/// ```
/// use formmatchers::HtmlForm;
///
/// let html = br#"<html><head><title>Sample</title></head>
///   <body><div class="guideFieldLabel"><label>Name</label></div></body></html>"#;
/// let form = HtmlForm::create(html, "http://localhost/").unwrap();
/// assert_eq!(form.title().as_deref(), Some("Sample"));
/// assert!(form.has_field_label("Name"));
/// ```
pub struct HtmlForm {
    document: Html,
    base_uri: String,
    title_selector: Selector,
    field_label_selector: Selector,
}

impl HtmlForm {
    /// Parse `html` as UTF-8 (invalid sequences are replaced).
    pub fn create(html: &[u8], base_uri: &str) -> Result<Self> {
        Ok(Self {
            document: Html::parse_document(&String::from_utf8_lossy(html)),
            base_uri: base_uri.to_string(),
            title_selector: parse_selector(TITLE_SELECTOR)?,
            field_label_selector: parse_selector(FIELD_LABEL_SELECTOR)?,
        })
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Text of the first `<title>` element, if any.
    pub fn title(&self) -> Option<String> {
        self.document
            .select(&self.title_selector)
            .next()
            .map(|e| normalize_whitespace(&e.text().collect::<String>()))
    }

    /// Text of every field label, in document order.
    pub fn field_labels(&self) -> Vec<String> {
        self.document
            .select(&self.field_label_selector)
            .map(|e| normalize_whitespace(&e.text().collect::<String>()))
            .collect()
    }

    pub fn has_field_label(&self, candidate: &str) -> bool {
        self.field_labels().iter().any(|l| l == candidate)
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Html(format!("invalid selector '{selector}': {e}")))
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Matchers ─────────────────────────────────────────────────────────────────

struct HasTitle(String);

impl Matcher<HtmlForm> for HasTitle {
    fn describe_to(&self, description: &mut Description) {
        description
            .append_text("Page title should be '")
            .append_text(&self.0)
            .append_text("'");
    }

    fn matches(&self, item: &HtmlForm, mismatch: &mut Description) -> bool {
        match item.title() {
            Some(title) if title == self.0 => true,
            Some(title) => {
                mismatch.append_text("was '").append_text(&title).append_text("'.");
                false
            }
            None => {
                mismatch.append_text("page had no title.");
                false
            }
        }
    }
}

pub fn has_title(expected_title: &str) -> impl Matcher<HtmlForm> {
    HasTitle(expected_title.to_string())
}

struct ContainsFieldLabel(String);

impl Matcher<HtmlForm> for ContainsFieldLabel {
    fn describe_to(&self, description: &mut Description) {
        description
            .append_text("Page should have a field label '")
            .append_text(&self.0)
            .append_text("'");
    }

    fn matches(&self, item: &HtmlForm, mismatch: &mut Description) -> bool {
        let labels = item.field_labels();
        if labels.is_empty() {
            mismatch.append_text("Couldn't find any field labels.");
            return false;
        }
        let result = labels.iter().any(|l| *l == self.0);
        if !result {
            mismatch
                .append_text("field labels were ")
                .append_value_list("['", "','", "']", &labels);
        }
        result
    }
}

/// Matches a form that has an input field labelled `expected_label`.
pub fn contains_field_label(expected_label: &str) -> impl Matcher<HtmlForm> {
    ContainsFieldLabel(expected_label.to_string())
}
