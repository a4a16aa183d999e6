use std::collections::BTreeSet;
use std::fmt;

// ── UsageRights ──────────────────────────────────────────────────────────────

/// Usage rights granted to a PDF by Reader Extensions or Acrobat.
///
/// Read from the `/TransformParams` of the usage rights signature; see
/// [`crate::Pdf::usage_rights`]. The sets are frozen once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageRights {
    annots_rights: BTreeSet<String>,
    form_rights: BTreeSet<String>,
    form_ex_rights: BTreeSet<String>,
    ef_rights: BTreeSet<String>,
}

impl UsageRights {
    pub fn builder() -> UsageRightsBuilder {
        UsageRightsBuilder::default()
    }

    /// Annotation rights (`/Annots`), e.g. `Create`, `Delete`, `Modify`.
    pub fn annots_rights(&self) -> &BTreeSet<String> {
        &self.annots_rights
    }

    /// Form rights (`/Form`), e.g. `FillIn`, `Import`, `SubmitStandalone`.
    pub fn form_rights(&self) -> &BTreeSet<String> {
        &self.form_rights
    }

    /// Extended form rights (`/FormEx`), e.g. `BarcodePlaintext`.
    pub fn form_ex_rights(&self) -> &BTreeSet<String> {
        &self.form_ex_rights
    }

    /// Embedded file rights (`/EF`).
    pub fn ef_rights(&self) -> &BTreeSet<String> {
        &self.ef_rights
    }

    /// Returns `true` when no right of any kind is granted.
    pub fn is_empty(&self) -> bool {
        self.annots_rights.is_empty()
            && self.form_rights.is_empty()
            && self.form_ex_rights.is_empty()
            && self.ef_rights.is_empty()
    }
}

impl fmt::Display for UsageRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UsageRights [annotsRights={}, formRights={}, formExRights={}, efRights={}]",
            FmtSet(&self.annots_rights),
            FmtSet(&self.form_rights),
            FmtSet(&self.form_ex_rights),
            FmtSet(&self.ef_rights),
        )
    }
}

struct FmtSet<'a>(&'a BTreeSet<String>);

impl fmt::Display for FmtSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, right) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(right)?;
        }
        f.write_str("]")
    }
}

// ── UsageRightsBuilder ───────────────────────────────────────────────────────

/// Accumulates right names while the rights dictionary is walked.
#[derive(Debug, Default)]
pub struct UsageRightsBuilder {
    rights: UsageRights,
}

impl UsageRightsBuilder {
    pub fn add_annots_right(&mut self, right: impl Into<String>) -> &mut Self {
        self.rights.annots_rights.insert(right.into());
        self
    }

    pub fn add_form_right(&mut self, right: impl Into<String>) -> &mut Self {
        self.rights.form_rights.insert(right.into());
        self
    }

    pub fn add_form_ex_right(&mut self, right: impl Into<String>) -> &mut Self {
        self.rights.form_ex_rights.insert(right.into());
        self
    }

    pub fn add_ef_right(&mut self, right: impl Into<String>) -> &mut Self {
        self.rights.ef_rights.insert(right.into());
        self
    }

    pub fn build(self) -> UsageRights {
        self.rights
    }
}
