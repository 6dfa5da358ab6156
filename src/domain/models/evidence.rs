//! Evidence accumulated while verifying a hypothesis.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Flat string-keyed map of facts gathered by executing verification steps.
///
/// Entries are add-only: the first write of a key wins, later writes of the
/// same key are ignored. Evidence gathered early in a collection pass must not
/// be silently rewritten by later steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evidence {
    entries: BTreeMap<String, serde_json::Value>,
}

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fact. Returns false (and keeps the existing value) if the key
    /// was already present.
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) -> bool {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, value);
        true
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.entries.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.entries.get(key).and_then(serde_json::Value::as_bool)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.entries.get(key).and_then(serde_json::Value::as_f64)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(serde_json::Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_write_wins() {
        let mut evidence = Evidence::new();
        assert!(evidence.insert("is_spac", json!(false)));
        assert!(!evidence.insert("is_spac", json!(true)));
        assert_eq!(evidence.get_bool("is_spac"), Some(false));
    }

    #[test]
    fn test_typed_getters() {
        let mut evidence = Evidence::new();
        evidence.insert("years_before_ipo", json!(10.8));
        evidence.insert("alternate_cik", json!("0009999999"));
        assert_eq!(evidence.get_f64("years_before_ipo"), Some(10.8));
        assert_eq!(evidence.get_str("alternate_cik"), Some("0009999999"));
        assert_eq!(evidence.get_bool("years_before_ipo"), None);
    }
}
