// Error message and source-chain matchers.

use formmatchers::error_matchers::{error_msg_contains_all, has_source, has_source_matching, has_source_matching_all};
use formmatchers::{assert_that, check, not, Error, Matcher};
use std::error::Error as StdError;
use std::path::PathBuf;

type DynError = dyn StdError + 'static;

fn read_error() -> Error {
    Error::ReadFile {
        path: PathBuf::from("forms/SampleForm.pdf"),
        source: Box::new(Error::InvalidPdf("missing or invalid catalog".into())),
    }
}

#[test]
fn message_contains_single_string() {
    assert_that(&read_error(), error_msg_contains_all("SampleForm.pdf", &[]));
}

#[test]
fn message_contains_all_strings() {
    assert_that(&read_error(), error_msg_contains_all("Error reading file", &["SampleForm.pdf", "catalog"]));
    assert_that(&read_error(), not(error_msg_contains_all("SampleForm.pdf", &["gold"])));
}

#[test]
fn message_mismatch_names_the_feature() {
    let err = Error::InvalidConfig("bad".into());
    let msg = check(&err, error_msg_contains_all("gold", &[])).unwrap_err();
    assert_eq!(
        msg,
        "\nExpected: Error message a string containing \"gold\"\n     but: Error message was \"invalid configuration: bad\""
    );
}

#[test]
fn source_is_matched() {
    let err = read_error();
    assert_that(
        &err,
        has_source_matching(error_msg_contains_all::<DynError>("Invalid PDF", &[])),
    );
}

#[test]
fn missing_source_is_a_mismatch() {
    let err = Error::InvalidConfig("bad".into());
    let msg = check(
        &err,
        has_source_matching(error_msg_contains_all::<DynError>("anything", &[])),
    )
    .unwrap_err();
    assert!(msg.starts_with("\nExpected: an error with source Error message"), "message was {msg}");
    assert!(msg.ends_with("but: source was missing"), "message was {msg}");
}

#[test]
fn io_errors_are_matched_through_the_crate_error() {
    let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
    assert_that(&err, error_msg_contains_all("I/O error", &["gone"]));
    assert_that(&err, has_source_matching(error_msg_contains_all::<DynError>("gone", &[])));
}

#[test]
fn source_is_matched_by_every_matcher() {
    let err = read_error();
    let rest: Vec<Box<dyn Matcher<DynError>>> = vec![Box::new(error_msg_contains_all::<DynError>("catalog", &[]))];
    assert_that(&err, has_source_matching_all(error_msg_contains_all::<DynError>("Invalid PDF", &[]), rest));

    let rest: Vec<Box<dyn Matcher<DynError>>> = vec![Box::new(error_msg_contains_all::<DynError>("trailer", &[]))];
    let msg = check(
        &err,
        has_source_matching_all(error_msg_contains_all::<DynError>("Invalid PDF", &[]), rest),
    )
    .unwrap_err();
    assert!(msg.contains("but: source "), "message was {msg}");
    assert!(msg.contains("\"trailer\""), "message was {msg}");
}

#[test]
fn source_is_the_same_instance() {
    let err = read_error();
    let source = err.source().unwrap();
    assert_that(&err, has_source(source));

    let lookalike = Error::InvalidPdf("missing or invalid catalog".into());
    let msg = check(&err, has_source(&lookalike)).unwrap_err();
    assert_eq!(
        msg,
        "\nExpected: an error with source the same instance as \"Invalid PDF: missing or invalid catalog\"\n     \
         but: source was \"Invalid PDF: missing or invalid catalog\""
    );

    let msg = check(&Error::InvalidConfig("bad".into()), has_source(&lookalike)).unwrap_err();
    assert!(msg.ends_with("but: source was missing"), "message was {msg}");
}
