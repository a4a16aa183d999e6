//! Matcher trait and the plumbing that turns a failed match into a readable
//! assertion message.

use std::fmt::{self, Debug, Display};
use std::marker::PhantomData;

// ── Description ──────────────────────────────────────────────────────────────

/// Text accumulated by [`Matcher::describe_to`] and [`Matcher::matches`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Description {
    text: String,
}

impl Description {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_text(&mut self, text: &str) -> &mut Self {
        self.text.push_str(text);
        self
    }

    /// Append a value using its `Debug` form (strings come out quoted).
    pub fn append_value<V: Debug + ?Sized>(&mut self, value: &V) -> &mut Self {
        self.text.push_str(&format!("{value:?}"));
        self
    }

    pub fn append_value_list<I, V>(&mut self, start: &str, separator: &str, end: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        self.text.push_str(start);
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.text.push_str(separator);
            }
            self.text.push_str(&value.to_string());
        }
        self.text.push_str(end);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// ── Matcher ──────────────────────────────────────────────────────────────────

/// A predicate over `T` that can explain itself.
pub trait Matcher<T: ?Sized> {
    /// Describe what a matching item looks like.
    fn describe_to(&self, description: &mut Description);

    /// Returns `true` when `item` matches. On a mismatch the reason is
    /// appended to `mismatch`.
    fn matches(&self, item: &T, mismatch: &mut Description) -> bool;
}

impl<T: ?Sized, M: Matcher<T> + ?Sized> Matcher<T> for Box<M> {
    fn describe_to(&self, description: &mut Description) {
        (**self).describe_to(description)
    }

    fn matches(&self, item: &T, mismatch: &mut Description) -> bool {
        (**self).matches(item, mismatch)
    }
}

impl<T: ?Sized, M: Matcher<T> + ?Sized> Matcher<T> for &M {
    fn describe_to(&self, description: &mut Description) {
        (**self).describe_to(description)
    }

    fn matches(&self, item: &T, mismatch: &mut Description) -> bool {
        (**self).matches(item, mismatch)
    }
}

/// Run `matcher` against `item`, returning the assertion message on failure.
///
/// ```
/// use formmatchers::{check, contains_string};
///
/// assert!(check("hello world", contains_string("world")).is_ok());
/// let msg = check("hello", contains_string("world")).unwrap_err();
/// assert!(msg.contains("Expected: a string containing \"world\""));
/// ```
pub fn check<T: ?Sized, M: Matcher<T>>(item: &T, matcher: M) -> Result<(), String> {
    let mut mismatch = Description::new();
    if matcher.matches(item, &mut mismatch) {
        return Ok(());
    }
    let mut expected = Description::new();
    matcher.describe_to(&mut expected);
    Err(format!("\nExpected: {expected}\n     but: {mismatch}"))
}

/// Panic with a descriptive message unless `matcher` matches `item`.
#[track_caller]
pub fn assert_that<T: ?Sized, M: Matcher<T>>(item: &T, matcher: M) {
    if let Err(message) = check(item, matcher) {
        panic!("{message}");
    }
}

// ── Combinators ──────────────────────────────────────────────────────────────

struct AllOf<T: ?Sized> {
    matchers: Vec<Box<dyn Matcher<T>>>,
}

impl<T: ?Sized> Matcher<T> for AllOf<T> {
    fn describe_to(&self, description: &mut Description) {
        description.append_text("(");
        for (i, m) in self.matchers.iter().enumerate() {
            if i > 0 {
                description.append_text(" and ");
            }
            m.describe_to(description);
        }
        description.append_text(")");
    }

    fn matches(&self, item: &T, mismatch: &mut Description) -> bool {
        for m in &self.matchers {
            let mut inner = Description::new();
            if !m.matches(item, &mut inner) {
                m.describe_to(mismatch);
                mismatch.append_text(" ").append_text(inner.as_str());
                return false;
            }
        }
        true
    }
}

/// Matches when every matcher matches; reports the first failure.
pub fn all_of<T: ?Sized>(matchers: Vec<Box<dyn Matcher<T>>>) -> impl Matcher<T> {
    AllOf { matchers }
}

struct Not<M>(M);

impl<T: ?Sized, M: Matcher<T>> Matcher<T> for Not<M> {
    fn describe_to(&self, description: &mut Description) {
        description.append_text("not ");
        self.0.describe_to(description);
    }

    fn matches(&self, item: &T, mismatch: &mut Description) -> bool {
        if self.0.matches(item, &mut Description::new()) {
            mismatch.append_text("was matched by ");
            self.0.describe_to(mismatch);
            false
        } else {
            true
        }
    }
}

/// Inverts a matcher.
pub fn not<T: ?Sized, M: Matcher<T>>(matcher: M) -> impl Matcher<T> {
    Not(matcher)
}

/// Returned by [`contains_string`]; matches both `str` and `String`.
pub struct ContainsString(String);

impl Matcher<str> for ContainsString {
    fn describe_to(&self, description: &mut Description) {
        description
            .append_text("a string containing ")
            .append_value(self.0.as_str());
    }

    fn matches(&self, item: &str, mismatch: &mut Description) -> bool {
        let result = item.contains(&self.0);
        if !result {
            mismatch.append_text("was ").append_value(item);
        }
        result
    }
}

impl Matcher<String> for ContainsString {
    fn describe_to(&self, description: &mut Description) {
        Matcher::<str>::describe_to(self, description)
    }

    fn matches(&self, item: &String, mismatch: &mut Description) -> bool {
        Matcher::<str>::matches(self, item.as_str(), mismatch)
    }
}

/// Matches strings containing `substring`.
pub fn contains_string(substring: &str) -> ContainsString {
    ContainsString(substring.to_string())
}

struct EqualTo<V>(V);

impl<T, V> Matcher<T> for EqualTo<V>
where
    T: PartialEq<V> + Debug + ?Sized,
    V: Debug,
{
    fn describe_to(&self, description: &mut Description) {
        description.append_value(&self.0);
    }

    fn matches(&self, item: &T, mismatch: &mut Description) -> bool {
        let result = PartialEq::eq(item, &self.0);
        if !result {
            mismatch.append_text("was ").append_value(item);
        }
        result
    }
}

/// Matches items equal to `expected`.
pub fn equal_to<T, V>(expected: V) -> impl Matcher<T>
where
    T: PartialEq<V> + Debug + ?Sized,
    V: Debug,
{
    EqualTo(expected)
}

struct Feature<F, M, U> {
    name: String,
    extract: F,
    sub_matcher: M,
    _feature: PhantomData<fn() -> U>,
}

impl<T, U, F, M> Matcher<T> for Feature<F, M, U>
where
    T: ?Sized,
    F: Fn(&T) -> U,
    M: Matcher<U>,
{
    fn describe_to(&self, description: &mut Description) {
        description.append_text(&self.name).append_text(" ");
        self.sub_matcher.describe_to(description);
    }

    fn matches(&self, item: &T, mismatch: &mut Description) -> bool {
        let value = (self.extract)(item);
        let mut inner = Description::new();
        let result = self.sub_matcher.matches(&value, &mut inner);
        if !result {
            mismatch.append_text(&self.name).append_text(" ").append_text(inner.as_str());
        }
        result
    }
}

/// Match a feature of an item: `extract` pulls the value that `sub_matcher`
/// is applied to, and `name` labels it in messages.
pub fn feature<T, U, F, M>(name: &str, extract: F, sub_matcher: M) -> impl Matcher<T>
where
    T: ?Sized,
    F: Fn(&T) -> U,
    M: Matcher<U>,
{
    Feature {
        name: name.to_string(),
        extract,
        sub_matcher,
        _feature: PhantomData,
    }
}
