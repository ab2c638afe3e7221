//! Issue-form body parser.
//!
//! # Responsibility
//! - Split a rendered issue form into `heading -> value` pairs.
//! - Normalize the "no response" placeholder to an empty value.
//!
//! # Invariants
//! - Parsing never fails; malformed input only yields fewer labels.
//! - Text before the first `###` heading is discarded.
//! - Values keep inner newlines and non-ASCII text verbatim.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Placeholder the issue tracker renders for optional fields left blank.
pub const NO_RESPONSE_PLACEHOLDER: &str = "_No response_";

static SECTION_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n###\s+").expect("valid section marker regex"));
static NO_RESPONSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^_No response_[ \t]*$").expect("valid placeholder regex"));

/// Raw `heading -> value` mapping produced by [`parse_form`].
///
/// Lookups of absent labels return `""`; callers never see `Option` here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    values: BTreeMap<String, String>,
}

impl FormFields {
    /// Value for `label`, or `""` when the label is absent.
    pub fn get(&self, label: &str) -> &str {
        self.values.get(label).map_or("", String::as_str)
    }

    /// First non-empty value among `labels`, trimmed; `""` when none match.
    pub fn first_non_empty(&self, labels: &[&str]) -> &str {
        labels
            .iter()
            .map(|label| self.get(label).trim())
            .find(|value| !value.is_empty())
            .unwrap_or("")
    }

    pub fn contains(&self, label: &str) -> bool {
        self.values.contains_key(label)
    }

    /// Labels in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FormFields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Parses an issue-form body into labeled values.
///
/// Rules:
/// - A section starts at a line beginning with `###` plus whitespace; the rest
///   of that line is the label.
/// - The value is every following line up to the next section, trimmed.
/// - Lines that are exactly `_No response_` are dropped.
/// - A repeated label keeps its last value.
pub fn parse_form(body: &str) -> FormFields {
    let normalized = body.replace("\r\n", "\n");
    let prefixed = format!("\n{}", normalized.trim());

    let mut values = BTreeMap::new();
    // The first piece is whatever precedes the first marker.
    for section in SECTION_MARKER_RE.split(&prefixed).skip(1) {
        let section = section.trim();
        if section.is_empty() {
            continue;
        }

        let (label, raw_value) = section.split_once('\n').unwrap_or((section, ""));
        let value = NO_RESPONSE_RE.replace_all(raw_value.trim(), "");
        values.insert(label.trim().to_string(), value.trim().to_string());
    }

    FormFields { values }
}
