use std::collections::BTreeMap;
use std::fmt::Display;

/// Filters for list operations, serialized into a query string.
///
/// Keys are kept sorted so the same filters always produce the same URL,
/// whatever order callers added them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilters {
    filters: BTreeMap<String, String>,
}

impl QueryFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds the filter only when a value is present.
    pub fn with_opt<V: Display>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Display) {
        self.filters.insert(key.into(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.filters.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.filters.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn extend(&mut self, other: QueryFilters) {
        self.filters.extend(other.filters);
    }

    /// `a=1&b=2`, form-encoded, or an empty string when there are no filters.
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.filters.iter())
            .finish()
    }

    /// The encoded filters with a leading `?`, ready to append to a path.
    pub fn to_query_string(&self) -> String {
        if self.filters.is_empty() {
            String::new()
        } else {
            format!("?{}", self.encode())
        }
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for QueryFilters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = QueryFilters::new();
        for (key, value) in iter {
            filters.insert(key, value);
        }
        filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_keys_regardless_of_insertion_order() {
        let forward = QueryFilters::new().with("a", "1").with("b", "2");
        let backward = QueryFilters::new().with("b", "2").with("a", "1");
        assert_eq!(forward.encode(), "a=1&b=2");
        assert_eq!(backward.encode(), "a=1&b=2");
    }

    #[test]
    fn encodes_reserved_characters() {
        let filters = QueryFilters::new()
            .with("name~", "my share")
            .with("export_location_path", "10.0.0.1:/a&b");
        assert_eq!(
            filters.to_query_string(),
            "?export_location_path=10.0.0.1%3A%2Fa%26b&name%7E=my+share"
        );
    }

    #[test]
    fn empty_filters_produce_no_query() {
        assert_eq!(QueryFilters::new().to_query_string(), "");
    }

    #[test]
    fn optional_values_are_skipped_when_absent() {
        let filters = QueryFilters::new()
            .with_opt("status", Some("available"))
            .with_opt::<&str>("host", None);
        assert_eq!(filters.encode(), "status=available");
    }

    #[test]
    fn later_values_replace_earlier_ones() {
        let filters: QueryFilters = vec![("limit", "5"), ("limit", "10")].into_iter().collect();
        assert_eq!(filters.get("limit"), Some("10"));
    }
}
