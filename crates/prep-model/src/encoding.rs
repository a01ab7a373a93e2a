//! Label encodings for categorical columns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sorted label vocabulary of one column; a label's code is its index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnEncoding {
    labels: Vec<String>,
}

impl ColumnEncoding {
    /// Build the vocabulary from observed values. Duplicates collapse and
    /// labels are ordered lexicographically.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        labels.sort();
        labels.dedup();
        Self { labels }
    }

    pub fn code(&self, label: &str) -> Option<i64> {
        self.labels
            .binary_search_by(|probe| probe.as_str().cmp(label))
            .ok()
            .map(|idx| idx as i64)
    }

    pub fn label(&self, code: i64) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| self.labels.get(idx))
            .map(String::as_str)
    }

    /// Code used for labels outside the vocabulary.
    pub fn sentinel(&self) -> i64 {
        self.labels.len() as i64
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label to code pairs, in code order.
    pub fn mapping(&self) -> BTreeMap<&str, i64> {
        self.labels
            .iter()
            .enumerate()
            .map(|(idx, label)| (label.as_str(), idx as i64))
            .collect()
    }
}

/// Encodings of every categorical column, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingMap {
    columns: BTreeMap<String, ColumnEncoding>,
}

impl EncodingMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, encoding: ColumnEncoding) {
        self.columns.insert(column.into(), encoding);
    }

    pub fn get(&self, column: &str) -> Option<&ColumnEncoding> {
        self.columns.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnEncoding)> {
        self.columns
            .iter()
            .map(|(name, encoding)| (name.as_str(), encoding))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_sorted_labels() {
        let encoding = ColumnEncoding::from_labels(["Online", "Aviation", "Offline", "Online"]);
        assert_eq!(encoding.labels(), ["Aviation", "Offline", "Online"]);
        assert_eq!(encoding.code("Aviation"), Some(0));
        assert_eq!(encoding.code("Online"), Some(2));
        assert_eq!(encoding.code("Corporate"), None);
        assert_eq!(encoding.label(1), Some("Offline"));
        assert_eq!(encoding.label(-1), None);
        assert_eq!(encoding.sentinel(), 3);
    }

    #[test]
    fn mapping_is_label_to_code() {
        let encoding = ColumnEncoding::from_labels(["Not_Canceled", "Canceled"]);
        let mapping = encoding.mapping();
        assert_eq!(mapping.get("Canceled"), Some(&0));
        assert_eq!(mapping.get("Not_Canceled"), Some(&1));
    }
}
