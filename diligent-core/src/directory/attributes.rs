//! Normalization of raw directory search results
//!
//! A directory entry comes back as attribute names mapped to lists of byte
//! strings. Most attributes are single-valued and are kept as plain strings;
//! the grouped ones (distinguished name, group memberships) encode several
//! `KEY=value` components per value and are folded into a map of sets.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use super::{DISTINGUISHED_NAME, GROUPED_ATTRIBUTES};

static KEY_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9]+)=([A-Za-z0-9\-@]+)").expect("key/value pattern is valid")
});

/// `KEY=value` components of a grouped attribute, keyed by component name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedAttribute(BTreeMap<String, BTreeSet<String>>);

impl GroupedAttribute {
    /// Values recorded under `key`, empty when the key never appeared
    pub fn values(&self, key: &str) -> impl Iterator<Item = &str> {
        self.0.get(key).into_iter().flatten().map(String::as_str)
    }

    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.0.get(key).is_some_and(|values| values.contains(value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// A normalized attribute value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Scalar(String),
    Grouped(GroupedAttribute),
}

/// Normalized attributes of one directory entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryAttributes(BTreeMap<String, AttributeValue>);

impl DirectoryAttributes {
    pub fn scalar(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(AttributeValue::Scalar(value)) => Some(value),
            _ => None,
        }
    }

    pub fn grouped(&self, name: &str) -> Option<&GroupedAttribute> {
        match self.0.get(name) {
            Some(AttributeValue::Grouped(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Organizational units named in the distinguished name
    pub fn organizational_units(&self) -> impl Iterator<Item = &str> {
        self.grouped(DISTINGUISHED_NAME)
            .into_iter()
            .flat_map(|dn| dn.values("OU"))
    }
}

/// Normalize a raw search result entry.
///
/// Grouped attributes accumulate every `KEY=value` component of every value;
/// all other attributes keep only their first value. Attributes returned
/// without any value are dropped.
pub fn normalize_attributes<I, V>(raw: I) -> DirectoryAttributes
where
    I: IntoIterator<Item = (String, V)>,
    V: IntoIterator,
    V::Item: AsRef<[u8]>,
{
    let mut attributes = BTreeMap::new();

    for (name, values) in raw {
        let value = if GROUPED_ATTRIBUTES.contains(&name.as_str()) {
            AttributeValue::Grouped(parse_grouped(values))
        } else {
            match values.into_iter().next() {
                Some(first) => AttributeValue::Scalar(decode(first.as_ref())),
                None => continue,
            }
        };
        attributes.insert(name, value);
    }

    DirectoryAttributes(attributes)
}

/// Fold the `KEY=value` components of grouped values into a map of sets.
///
/// Commas are treated as separators; anything that does not look like a
/// component is ignored.
pub fn parse_grouped<V>(values: V) -> GroupedAttribute
where
    V: IntoIterator,
    V::Item: AsRef<[u8]>,
{
    let mut grouped: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for value in values {
        let text = decode(value.as_ref()).replace(',', " ");
        for captures in KEY_VALUE.captures_iter(&text) {
            grouped
                .entry(captures[1].to_string())
                .or_default()
                .insert(captures[2].to_string());
        }
    }

    GroupedAttribute(grouped)
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
