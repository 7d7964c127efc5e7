use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::store::KvStore;

/// Store backed by a JSON file of string pairs, read once on open and
/// rewritten on every set. A missing or malformed file opens empty.
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    pub fn open<P: Into<PathBuf>>(path: P) -> FileStore {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("ignoring malformed save file {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        FileStore { path, entries }
    }

    fn save(&self) {
        match serde_json::to_string(&self.entries) {
            Ok(contents) => {
                if let Err(e) = fs::write(&self.path, contents) {
                    log::warn!("writing save file {} failed: {}", self.path.display(), e);
                }
            }
            Err(e) => log::warn!("encoding save file failed: {}", e),
        }
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("cabinet-store-{}-{}", std::process::id(), name));
        path
    }

    #[test]
    fn test_round_trips_through_file() {
        let path = temp_path("roundtrip");
        let _ = fs::remove_file(&path);
        {
            let mut store = FileStore::open(path.clone());
            assert_eq!(store.get("audioEnabled"), None);
            store.set("audioEnabled", "0");
        }
        let store = FileStore::open(path.clone());
        assert_eq!(store.get("audioEnabled"), Some("0".to_string()));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let path = temp_path("missing");
        let _ = fs::remove_file(&path);
        let store = FileStore::open(path);
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn test_malformed_file_opens_empty() {
        let path = temp_path("malformed");
        fs::write(&path, "not json at all").unwrap();
        let store = FileStore::open(path.clone());
        assert_eq!(store.get("anything"), None);
        let _ = fs::remove_file(&path);
    }
}
