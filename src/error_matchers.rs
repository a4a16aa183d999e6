//! Matchers over [`std::error::Error`] values.
//!
//! ```
//! use formmatchers::{assert_that, error_matchers::*, Error};
//!
//! let err = Error::InvalidConfig("gold directory does not exist".into());
//! assert_that(&err, error_msg_contains_all("gold", &["does not exist"]));
//! ```

use crate::{all_of, contains_string, feature, Description, Matcher};
use std::error::Error as StdError;

/// Matches errors whose `Display` message contains `first` and every string
/// in `rest`.
pub fn error_msg_contains_all<E>(first: &str, rest: &[&str]) -> impl Matcher<E>
where
    E: StdError + ?Sized,
{
    let sub_matcher: Box<dyn Matcher<String>> = if rest.is_empty() {
        Box::new(contains_string(first))
    } else {
        Box::new(all_of(
            std::iter::once(first)
                .chain(rest.iter().copied())
                .map(|s| Box::new(contains_string(s)) as Box<dyn Matcher<String>>)
                .collect(),
        ))
    };
    feature("Error message", |e: &E| e.to_string(), sub_matcher)
}

struct HasSourceMatching<M>(M);

impl<E, M> Matcher<E> for HasSourceMatching<M>
where
    E: StdError + ?Sized,
    M: Matcher<dyn StdError + 'static>,
{
    fn describe_to(&self, description: &mut Description) {
        description.append_text("an error with source ");
        self.0.describe_to(description);
    }

    fn matches(&self, item: &E, mismatch: &mut Description) -> bool {
        let Some(source) = item.source() else {
            mismatch.append_text("source was missing");
            return false;
        };
        let mut inner = Description::new();
        let result = self.0.matches(source, &mut inner);
        if !result {
            mismatch.append_text("source ").append_text(inner.as_str());
        }
        result
    }
}

/// Matches errors whose [`source`](StdError::source) matches `matcher`.
pub fn has_source_matching<E, M>(matcher: M) -> impl Matcher<E>
where
    E: StdError + ?Sized,
    M: Matcher<dyn StdError + 'static>,
{
    HasSourceMatching(matcher)
}

/// Matches errors whose source matches `first` and every matcher in `rest`.
pub fn has_source_matching_all<E, M>(first: M, rest: Vec<Box<dyn Matcher<dyn StdError + 'static>>>) -> impl Matcher<E>
where
    E: StdError + ?Sized,
    M: Matcher<dyn StdError + 'static> + 'static,
{
    let sub_matcher: Box<dyn Matcher<dyn StdError + 'static>> = if rest.is_empty() {
        Box::new(first)
    } else {
        let mut matchers: Vec<Box<dyn Matcher<dyn StdError + 'static>>> = vec![Box::new(first)];
        matchers.extend(rest);
        Box::new(all_of(matchers))
    };
    HasSourceMatching(sub_matcher)
}

struct HasSource<'a, S: ?Sized>(&'a S);

impl<E, S> Matcher<E> for HasSource<'_, S>
where
    E: StdError + ?Sized,
    S: StdError + ?Sized,
{
    fn describe_to(&self, description: &mut Description) {
        description
            .append_text("an error with source the same instance as ")
            .append_value(&self.0.to_string());
    }

    fn matches(&self, item: &E, mismatch: &mut Description) -> bool {
        let expected = (self.0 as *const S).cast::<()>();
        match item.source() {
            Some(source) if std::ptr::eq((source as *const dyn StdError).cast::<()>(), expected) => true,
            Some(source) => {
                mismatch.append_text("source was ").append_value(&source.to_string());
                false
            }
            None => {
                mismatch.append_text("source was missing");
                false
            }
        }
    }
}

/// Matches errors whose source is `expected` itself, not merely an equal
/// error.
pub fn has_source<'a, E, S>(expected: &'a S) -> impl Matcher<E> + 'a
where
    E: StdError + ?Sized,
    S: StdError + ?Sized,
{
    HasSource(expected)
}
