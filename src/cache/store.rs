//! Persistent store for the single cache file
//!
//! Provides a `CacheStore` that reads the whole cache file into a `CacheFile`
//! and writes it back in full. A missing or unreadable file is never an error
//! on read; it loads as an empty `CacheFile`.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::data::NationalSite;

/// Default cache file, relative to the working directory
pub const DEFAULT_CACHE_FILE: &str = "nps_cache.json";

/// Errors that can occur when writing the cache file
#[derive(Debug, Error)]
pub enum StoreError {
    /// Creating, writing or replacing the file failed
    #[error("cache file I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The cache could not be encoded as JSON
    #[error("failed to encode cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The root structure persisted to disk
///
/// `CacheStore::load` decodes each namespace on its own; one that is absent
/// or unreadable loads as empty without touching the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheFile {
    /// Lowercase state name to state listing URL
    #[serde(default)]
    pub state_index: BTreeMap<String, String>,
    /// Site URL to site record
    #[serde(default)]
    pub site_detail: BTreeMap<String, NationalSite>,
    /// State listing URL to ordered site URLs
    #[serde(default)]
    pub state_site_list: BTreeMap<String, Vec<String>>,
    /// Site URL to raw places API response
    #[serde(default)]
    pub nearby_places: BTreeMap<String, Value>,
}

impl CacheFile {
    /// Returns true when all four namespaces are empty
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.state_index.is_empty()
            && self.site_detail.is_empty()
            && self.state_site_list.is_empty()
            && self.nearby_places.is_empty()
    }
}

/// Why `load` fell back to an empty cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// No file at the cache path
    Missing,
    /// The file exists but could not be read
    Unreadable(String),
    /// The file was read but is not a valid cache
    Corrupt(String),
}

/// Outcome of reading the cache file
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    /// The file was read and parsed
    Existing(CacheFile),
    /// Nothing usable on disk; the cache starts empty
    Empty(EmptyReason),
}

impl Loaded {
    /// Consumes the outcome, yielding the cache contents
    pub fn into_file(self) -> CacheFile {
        match self {
            Loaded::Existing(file) => file,
            Loaded::Empty(_) => CacheFile::default(),
        }
    }
}

/// Reads and writes the cache file
///
/// This is the only type in the crate that touches the cache on disk. Every
/// save rewrites the whole file.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Location of the cache file
    path: PathBuf,
}

impl CacheStore {
    /// Creates a store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the sibling file written before the final rename
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Reads the cache file
    ///
    /// Never fails: a missing, unreadable or unparsable file yields
    /// `Loaded::Empty` with the reason attached. Each namespace is decoded
    /// separately, so a bad record only costs that record.
    pub fn load(&self) -> Loaded {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Loaded::Empty(EmptyReason::Missing);
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cache file unreadable, starting empty");
                return Loaded::Empty(EmptyReason::Unreadable(e.to_string()));
            }
        };

        let mut root = match serde_json::from_str::<Map<String, Value>>(&content) {
            Ok(root) => root,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cache file corrupt, starting empty");
                return Loaded::Empty(EmptyReason::Corrupt(e.to_string()));
            }
        };

        Loaded::Existing(CacheFile {
            state_index: decode_namespace(&mut root, "StateIndex"),
            site_detail: decode_namespace(&mut root, "SiteDetail"),
            state_site_list: decode_namespace(&mut root, "StateSiteList"),
            nearby_places: decode_namespace(&mut root, "NearbyPlaces"),
        })
    }

    /// Writes the whole cache, replacing the previous file
    ///
    /// The JSON is written to a sibling temporary file first and then renamed
    /// over the cache path, so a failed write leaves the previous version in
    /// place.
    pub fn save(&self, file: &CacheFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(file)?;
        let temp = self.temp_path();
        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;

        tracing::debug!(path = %self.path.display(), "cache saved");
        Ok(())
    }
}

/// Decodes one namespace of the cache file, entry by entry
///
/// An entry that does not decode is dropped on its own; a namespace that is
/// not a mapping loads as empty. Neither affects the other namespaces.
fn decode_namespace<T: DeserializeOwned>(root: &mut Map<String, Value>, name: &str) -> BTreeMap<String, T> {
    let section = match root.remove(name) {
        None | Some(Value::Null) => return BTreeMap::new(),
        Some(Value::Object(section)) => section,
        Some(_) => {
            tracing::warn!(namespace = name, "cache namespace is not a mapping, starting it empty");
            return BTreeMap::new();
        }
    };

    section
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value(value) {
            Ok(record) => Some((key, record)),
            Err(e) => {
                tracing::warn!(namespace = name, key = %key, error = %e, "dropping unreadable cache entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (CacheStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = CacheStore::new(temp_dir.path().join("cache.json"));
        (store, temp_dir)
    }

    fn sample_file() -> CacheFile {
        let mut file = CacheFile::default();
        file.state_index.insert(
            "michigan".to_string(),
            "https://www.nps.gov/state/mi/index.htm".to_string(),
        );
        file.site_detail.insert(
            "https://www.nps.gov/isro/index.htm".to_string(),
            NationalSite {
                category: "National Park".to_string(),
                name: "Isle Royale".to_string(),
                address: "Houghton, MI".to_string(),
                zip_code: "49931".to_string(),
                phone: "906-482-0984".to_string(),
            },
        );
        file.state_site_list.insert(
            "https://www.nps.gov/state/mi/index.htm".to_string(),
            vec!["https://www.nps.gov/isro/index.htm".to_string()],
        );
        file.nearby_places.insert(
            "https://www.nps.gov/isro/index.htm".to_string(),
            json!({ "searchResults": [{ "name": "Ranger III", "city": "Houghton" }] }),
        );
        file
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let (store, _temp_dir) = create_test_store();

        let loaded = store.load();

        assert_eq!(loaded, Loaded::Empty(EmptyReason::Missing));
        assert!(loaded.into_file().is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let (store, _temp_dir) = create_test_store();
        fs::write(store.path(), "{ not json").expect("Should write file");

        let loaded = store.load();

        assert!(matches!(loaded, Loaded::Empty(EmptyReason::Corrupt(_))));
        assert!(loaded.into_file().is_empty());
    }

    #[test]
    fn test_load_directory_is_unreadable() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = CacheStore::new(temp_dir.path());

        let loaded = store.load();

        assert!(matches!(loaded, Loaded::Empty(EmptyReason::Unreadable(_))));
    }

    #[test]
    fn test_load_file_missing_namespaces_defaults_them() {
        let (store, _temp_dir) = create_test_store();
        fs::write(
            store.path(),
            r#"{"StateIndex": {"ohio": "https://www.nps.gov/state/oh/index.htm"}, "P1": {}}"#,
        )
        .expect("Should write file");

        let file = match store.load() {
            Loaded::Existing(file) => file,
            other => panic!("expected existing cache, got {:?}", other),
        };

        assert_eq!(file.state_index.len(), 1);
        assert!(file.site_detail.is_empty());
        assert!(file.state_site_list.is_empty());
        assert!(file.nearby_places.is_empty());
    }

    #[test]
    fn test_load_drops_only_the_bad_entry() {
        let (store, _temp_dir) = create_test_store();
        fs::write(
            store.path(),
            r#"{
                "SiteDetail": {
                    "https://x/": {"name": "X"},
                    "https://www.nps.gov/isro/index.htm": {
                        "category": "National Park",
                        "name": "Isle Royale",
                        "address": "Houghton, MI",
                        "zipCode": "49931",
                        "phone": "906-482-0984"
                    }
                },
                "StateSiteList": {"https://www.nps.gov/state/mi/index.htm": ["https://www.nps.gov/isro/index.htm"]},
                "NearbyPlaces": null,
                "StateIndex": ["not", "a", "mapping"]
            }"#,
        )
        .expect("Should write file");

        let file = match store.load() {
            Loaded::Existing(file) => file,
            other => panic!("expected existing cache, got {:?}", other),
        };

        assert_eq!(file.site_detail.len(), 1);
        assert!(file.site_detail.contains_key("https://www.nps.gov/isro/index.htm"));
        assert_eq!(file.state_site_list.len(), 1);
        assert!(file.nearby_places.is_empty());
        assert!(file.state_index.is_empty());
    }

    #[test]
    fn test_load_top_level_array_is_corrupt() {
        let (store, _temp_dir) = create_test_store();
        fs::write(store.path(), "[]").expect("Should write file");

        assert!(matches!(store.load(), Loaded::Empty(EmptyReason::Corrupt(_))));
    }

    #[test]
    fn test_save_then_load_preserves_everything() {
        let (store, _temp_dir) = create_test_store();
        let original = sample_file();

        store.save(&original).expect("Save should succeed");
        let loaded = store.load().into_file();

        assert_eq!(loaded, original);
    }

    #[test]
    fn test_save_of_load_leaves_content_unchanged() {
        let (store, _temp_dir) = create_test_store();
        store.save(&sample_file()).expect("Save should succeed");
        let before: Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();

        store.save(&store.load().into_file()).expect("Save should succeed");
        let after: Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();

        assert_eq!(before, after);
    }

    #[test]
    fn test_save_writes_all_four_namespaces() {
        let (store, _temp_dir) = create_test_store();

        store.save(&CacheFile::default()).expect("Save should succeed");

        let content = fs::read_to_string(store.path()).expect("Should read file");
        let value: Value = serde_json::from_str(&content).expect("Should be JSON");
        for key in ["StateIndex", "SiteDetail", "StateSiteList", "NearbyPlaces"] {
            assert!(value.get(key).is_some(), "missing namespace {}", key);
        }
    }

    #[test]
    fn test_site_record_uses_zip_code_field_name() {
        let (store, _temp_dir) = create_test_store();

        store.save(&sample_file()).expect("Save should succeed");

        let content = fs::read_to_string(store.path()).expect("Should read file");
        assert!(content.contains("\"zipCode\""));
        assert!(!content.contains("\"zip_code\""));
    }

    #[test]
    fn test_save_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir.path().join("nested").join("dir").join("cache.json");
        let store = CacheStore::new(nested.clone());

        store.save(&CacheFile::default()).expect("Save should succeed");

        assert!(nested.exists(), "Cache file should exist");
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let (store, temp_dir) = create_test_store();

        store.save(&sample_file()).expect("Save should succeed");

        assert!(!temp_dir.path().join("cache.json.tmp").exists());
    }

    #[test]
    fn test_save_replaces_corrupt_file() {
        let (store, _temp_dir) = create_test_store();
        fs::write(store.path(), "garbage").expect("Should write file");

        store.save(&sample_file()).expect("Save should succeed");

        assert_eq!(store.load(), Loaded::Existing(sample_file()));
    }
}
