//! Profile persistence

use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ahash::AHashMap;

use crate::core::error::Result;
use crate::progression::profile::Profile;

/// Where profiles live between sessions
///
/// A missing or unreadable profile loads as `None`; the caller decides on
/// the fallback.
pub trait ProfileStore {
    fn load_profile(&self, character_id: &str) -> Option<Profile>;

    fn save_profile(&mut self, profile: &Profile, character_id: &str) -> Result<()>;
}

/// One pretty-printed JSON file per character under a directory
#[derive(Debug, Clone)]
pub struct JsonProfileStore {
    dir: PathBuf,
}

impl JsonProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File for `character_id`; bytes outside `[A-Za-z0-9_-]` are
    /// percent-encoded so distinct ids never share a file.
    pub fn path_for(&self, character_id: &str) -> PathBuf {
        let mut file = String::with_capacity(character_id.len());
        for byte in character_id.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                file.push(byte as char);
            } else {
                let _ = write!(file, "%{byte:02X}");
            }
        }
        self.dir.join(format!("{file}.json"))
    }
}

impl ProfileStore for JsonProfileStore {
    fn load_profile(&self, character_id: &str) -> Option<Profile> {
        let path = self.path_for(character_id);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("could not read profile {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!("corrupt profile {}: {}", path.display(), e);
                None
            }
        }
    }

    fn save_profile(&mut self, profile: &Profile, character_id: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(profile)?;
        fs::write(self.path_for(character_id), json)?;
        Ok(())
    }
}

/// In-memory store for tests and throwaway sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    profiles: AHashMap<String, Profile>,
    /// Number of successful saves
    pub saves: usize,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, character_id: &str, profile: Profile) -> Self {
        self.profiles.insert(character_id.to_string(), profile);
        self
    }

    pub fn get(&self, character_id: &str) -> Option<&Profile> {
        self.profiles.get(character_id)
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load_profile(&self, character_id: &str) -> Option<Profile> {
        self.profiles.get(character_id).cloned()
    }

    fn save_profile(&mut self, profile: &Profile, character_id: &str) -> Result<()> {
        self.profiles.insert(character_id.to_string(), profile.clone());
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("arena-duel-{}-{}", name, uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = scratch_dir("store");
        let mut store = JsonProfileStore::new(&dir);
        let mut profile = Profile::new_default();
        profile.level = 7;
        profile.weapon = "sword".into();

        store.save_profile(&profile, "knight").unwrap();
        assert_eq!(store.load_profile("knight"), Some(profile));
        assert_eq!(store.load_profile("nobody"), None);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_corrupt_file_loads_as_none() {
        let dir = scratch_dir("corrupt");
        let store = JsonProfileStore::new(&dir);
        fs::write(store.path_for("broken"), "{ not json").unwrap();

        assert_eq!(store.load_profile("broken"), None);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_ids_are_encoded_into_file_names() {
        let store = JsonProfileStore::new("/profiles");
        assert_eq!(store.path_for("../evil id"), PathBuf::from("/profiles/%2E%2E%2Fevil%20id.json"));
        assert_eq!(store.path_for("sir_lancelot"), PathBuf::from("/profiles/sir_lancelot.json"));
    }

    #[test]
    fn test_similar_ids_keep_separate_profiles() {
        let dir = scratch_dir("similar");
        let mut store = JsonProfileStore::new(&dir);
        let ids = ["sir lancelot", "sir_lancelot", "sir.lancelot", "sir%20lancelot"];
        for (i, id) in ids.iter().enumerate() {
            let mut profile = Profile::new_default();
            profile.level = i as u32 + 2;
            store.save_profile(&profile, id).unwrap();
        }

        for (i, id) in ids.iter().enumerate() {
            assert_eq!(store.load_profile(id).map(|p| p.level), Some(i as u32 + 2), "{id}");
        }

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let mut store = MemoryProfileStore::new();
        store.save_profile(&Profile::new_default(), "a").unwrap();
        store.save_profile(&Profile::new_default(), "a").unwrap();
        assert_eq!(store.saves, 2);
        assert!(store.get("a").is_some());
    }
}
