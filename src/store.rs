use std::collections::HashMap;

/// String key-value persistence. Backed by localStorage on the web and a
/// JSON file natively; tests use the in-memory store.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

#[derive(Default)]
pub struct MemStore {
    entries: HashMap<String, String>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let mut store = MemStore::new();
        assert_eq!(store.get("highScore"), None);
        store.set("highScore", "12500");
        assert_eq!(store.get("highScore").as_deref(), Some("12500"));
        store.set("highScore", "20000");
        assert_eq!(store.get("highScore").as_deref(), Some("20000"));
    }
}
