// Matcher messages over the in-memory fixture documents.

mod common;

use common::{non_interactive_pdf, rights_pdf, rights_reference, sample_form_pdf};
use formmatchers::pdf_matchers::*;
use formmatchers::{assert_that, check, not, Pdf};

fn sample_form() -> Pdf {
    Pdf::from_bytes(&sample_form_pdf().to_bytes()).unwrap()
}

fn non_interactive() -> Pdf {
    Pdf::from_bytes(&non_interactive_pdf().to_bytes()).unwrap()
}

// ── Happy path ────────────────────────────────────────────────────────────────

#[test]
fn sample_form_matches_form_properties() {
    let pdf = sample_form();
    assert_that(&pdf, is_interactive());
    assert_that(&pdf, is_dynamic());
    assert_that(&pdf, is_tagged());
    assert_that(&pdf, has_xfa(true));
    assert_that(&pdf, has_embedded_fonts(&["MyriadPro-Regular"]));
    assert_that(&pdf, has_fonts(&["MyriadPro-Regular"]));
}

#[test]
fn non_interactive_matches_negated_properties() {
    let pdf = non_interactive();
    assert_that(&pdf, is_non_interactive());
    assert_that(&pdf, is_static());
    assert_that(&pdf, has_xfa(false));
    assert_that(&pdf, not(is_tagged()));
    assert_that(&pdf, not(has_rights()));
    assert_that(&pdf, has_fonts(&["Helvetica", "T3"]));
    assert_that(&pdf, has_embedded_fonts(&[]));
}

#[test]
fn rights_enabled_form_has_rights() {
    let bytes = rights_pdf("UR3", vec![rights_reference().into()]).to_bytes();
    assert_that(&Pdf::from_bytes(&bytes).unwrap(), has_rights());
}

// ── Mismatch messages ─────────────────────────────────────────────────────────

#[test]
fn is_interactive_mismatch() {
    let msg = check(&non_interactive(), is_interactive()).unwrap_err();
    assert_eq!(msg, "\nExpected: should be interactive.\n     but: was non-interactive.");
}

#[test]
fn is_non_interactive_mismatch() {
    let msg = check(&sample_form(), is_non_interactive()).unwrap_err();
    assert_eq!(msg, "\nExpected: should be non-interactive.\n     but: was interactive.");
}

#[test]
fn is_dynamic_and_static_mismatch() {
    let msg = check(&non_interactive(), is_dynamic()).unwrap_err();
    assert_eq!(msg, "\nExpected: should be dynamic.\n     but: was static.");

    let msg = check(&sample_form(), is_static()).unwrap_err();
    assert_eq!(msg, "\nExpected: should be static.\n     but: was dynamic.");
}

#[test]
fn is_tagged_mismatch() {
    let msg = check(&non_interactive(), is_tagged()).unwrap_err();
    assert_eq!(msg, "\nExpected: should be tagged.\n     but: was not tagged.");
}

#[test]
fn has_xfa_mismatch() {
    let msg = check(&non_interactive(), has_xfa(true)).unwrap_err();
    assert_eq!(msg, "\nExpected: should be an XFA Pdf.\n     but: was not an XFA Pdf.");

    let msg = check(&sample_form(), has_xfa(false)).unwrap_err();
    assert_eq!(msg, "\nExpected: should not be an XFA Pdf.\n     but: was an XFA Pdf.");
}

#[test]
fn has_rights_mismatch() {
    let msg = check(&sample_form(), has_rights()).unwrap_err();
    assert_eq!(msg, "\nExpected: should have usage rights.\n     but: had no usage rights.");
}

#[test]
fn has_fonts_mismatch_lists_actual_fonts() {
    let msg = check(&non_interactive(), has_fonts(&["Courier"])).unwrap_err();
    assert_eq!(
        msg,
        "\nExpected: should have fonts ['Courier'].\n     but: fonts were ['ArialMT','HeiseiMin-W3','Helvetica','T3']."
    );
}

#[test]
fn has_embedded_fonts_mismatch() {
    let msg = check(&non_interactive(), has_embedded_fonts(&["Helvetica"])).unwrap_err();
    assert_eq!(
        msg,
        "\nExpected: should have embedded fonts ['Helvetica'].\n     but: fonts were ['ArialMT','HeiseiMin-W3','T3']."
    );
}

#[test]
#[should_panic(expected = "Expected only 1 entry in the UR Array, found 2.")]
fn has_rights_panics_on_unsupported_structure() {
    let bytes = rights_pdf("UR3", vec![rights_reference().into(), rights_reference().into()]).to_bytes();
    let _ = check(&Pdf::from_bytes(&bytes).unwrap(), has_rights());
}
