//! Label pairs, label schemas and label indexes.
//!
//! A vector declares an ordered list of label keys (its schema). Callers
//! supply `(key, value)` pairs in any order and may omit keys; the schema
//! turns them into a [`LabelIndex`]: one value per schema key, with
//! [`DEFAULT_LABEL_VALUE`] in every position the caller left unset.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SelfMonError};
use crate::pool::{BufferPool, Pooled};

/// Value used for schema keys the caller did not supply.
pub const DEFAULT_LABEL_VALUE: &str = "-";

/// Separator written before each value in a cache key.
const KEY_SEPARATOR: char = '|';
const KEY_ESCAPE: char = '\\';

/// Anything that can be read as a `(key, value)` label.
pub trait AsLabel {
    fn key(&self) -> &str;
    fn value(&self) -> &str;
}

/// Owned label pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelPair {
    pub key: String,
    pub value: String,
}

impl LabelPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl AsLabel for LabelPair {
    fn key(&self) -> &str {
        &self.key
    }
    fn value(&self) -> &str {
        &self.value
    }
}

impl AsLabel for (&str, &str) {
    fn key(&self) -> &str {
        self.0
    }
    fn value(&self) -> &str {
        self.1
    }
}

impl AsLabel for (String, String) {
    fn key(&self) -> &str {
        &self.0
    }
    fn value(&self) -> &str {
        &self.1
    }
}

impl<L: AsLabel + ?Sized> AsLabel for &L {
    fn key(&self) -> &str {
        (**self).key()
    }
    fn value(&self) -> &str {
        (**self).value()
    }
}

/// Convert any label list into owned pairs, keeping order.
pub fn to_pairs<L: AsLabel>(labels: &[L]) -> Vec<LabelPair> {
    labels
        .iter()
        .map(|l| LabelPair::new(l.key(), l.value()))
        .collect()
}

/// Ordered label-key schema of a vector.
pub struct LabelSchema {
    keys: Vec<String>,
    slots: BufferPool<Vec<Option<usize>>>,
}

impl LabelSchema {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            keys,
            slots: BufferPool::new(|| Vec::with_capacity(10)),
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Build the index for `labels`.
    ///
    /// Pairs already in schema order resolve positionally; anything else
    /// falls back to a scan by key. A key supplied twice keeps its last value.
    pub fn index<'a, L: AsLabel>(&'a self, labels: &'a [L]) -> Result<LabelIndex<'a, L>> {
        if labels.len() > self.keys.len() {
            return Err(SelfMonError::TooManyLabels {
                expected: self.keys.len(),
                got: labels.len(),
                defined: self.keys.clone(),
            });
        }

        let mut slots = self.slots.get();
        slots.resize(self.keys.len(), None);

        for (d, label) in labels.iter().enumerate() {
            if self.keys[d] == label.key() {
                slots[d] = Some(d);
                continue;
            }
            let pos = self
                .keys
                .iter()
                .position(|k| k == label.key())
                .ok_or_else(|| SelfMonError::UndefinedLabel {
                    key: label.key().to_string(),
                    defined: self.keys.clone(),
                })?;
            slots[pos] = Some(d);
        }

        Ok(LabelIndex { labels, slots })
    }
}

/// Canonical label values for one lookup, borrowed from the caller's pairs.
///
/// The index lives only as long as one cache lookup; use
/// [`LabelIndex::to_values`] to keep the values.
pub struct LabelIndex<'a, L: AsLabel> {
    labels: &'a [L],
    slots: Pooled<'a, Vec<Option<usize>>>,
}

impl<'a, L: AsLabel> LabelIndex<'a, L> {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Values in schema order.
    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.slots.iter().map(|slot| match slot {
            Some(i) => self.labels[*i].value(),
            None => DEFAULT_LABEL_VALUE,
        })
    }

    pub fn to_values(&self) -> Vec<String> {
        self.values().map(str::to_string).collect()
    }

    /// Write the cache key for this index into `out`.
    pub fn write_key(&self, out: &mut String) {
        write_cache_key(self.values(), out);
    }
}

/// Encode label values as a cache key.
///
/// Each value is preceded by `|`; `|` and `\` inside a value are escaped
/// with `\`. An unescaped `|` always starts a value, so equal keys imply
/// equal value sequences.
pub fn write_cache_key<'v>(values: impl IntoIterator<Item = &'v str>, out: &mut String) {
    for value in values {
        out.push(KEY_SEPARATOR);
        for c in value.chars() {
            if c == KEY_SEPARATOR || c == KEY_ESCAPE {
                out.push(KEY_ESCAPE);
            }
            out.push(c);
        }
    }
}

/// Convenience wrapper around [`write_cache_key`].
pub fn cache_key<'v>(values: impl IntoIterator<Item = &'v str>) -> String {
    let mut out = String::new();
    write_cache_key(values, &mut out);
    out
}
