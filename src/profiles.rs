use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::model::{ProfileState, WorkspaceProfile};

/// Durable CRUD over the profiles file. Every mutating operation reads the
/// full state, computes the next one, and writes it back whole; there is no
/// cross-process locking, so the last writer wins and callers holding a
/// snapshot must reload after mutating.
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Conventional per-user location: `$LAKEVIEW_PROFILES` wins when set,
    /// otherwise `$HOME/.config/lakeview/profiles.json`.
    pub fn from_default_location() -> Result<Self> {
        if let Ok(path) = std::env::var("LAKEVIEW_PROFILES")
            && !path.trim().is_empty()
        {
            return Ok(Self::new(path));
        }

        let home = std::env::var("HOME")
            .context("could not determine home directory (HOME is unset)")?;
        Ok(Self::new(
            PathBuf::from(home).join(".config/lakeview/profiles.json"),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load never fails: a missing, unreadable, or corrupt file yields an
    /// empty state.
    pub fn load(&self) -> ProfileState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return ProfileState::default(),
        };

        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(error) => {
                warn!(
                    "ignoring unreadable profiles file {}: {error}",
                    self.path.display()
                );
                ProfileState::default()
            }
        }
    }

    /// Write failures propagate; partial writes are not attempted.
    pub fn save(&self, state: &ProfileState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let rendered =
            serde_json::to_string_pretty(state).context("failed to serialize profile state")?;
        fs::write(&self.path, rendered)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    /// Upsert by name: an existing profile is replaced in place, keeping its
    /// position; otherwise the profile is appended. The first profile ever
    /// added becomes active.
    pub fn add_profile(&self, profile: WorkspaceProfile) -> Result<()> {
        let mut state = self.load();
        let name = profile.name.clone();
        match state
            .profiles
            .iter_mut()
            .find(|existing| existing.name == name)
        {
            Some(slot) => *slot = profile,
            None => state.profiles.push(profile),
        }
        if state.active.is_none() {
            state.active = Some(name);
        }
        self.save(&state)
    }

    /// Returns false (and leaves the file untouched) when `name` is absent.
    /// Removing the active profile reassigns `active` to the first remaining
    /// one, or unsets it when none remain.
    pub fn remove_profile(&self, name: &str) -> Result<bool> {
        let mut state = self.load();
        let before = state.profiles.len();
        state.profiles.retain(|profile| profile.name != name);
        if state.profiles.len() == before {
            return Ok(false);
        }

        if state.active.as_deref() == Some(name) {
            state.active = state.profiles.first().map(|profile| profile.name.clone());
        }
        self.save(&state)?;
        Ok(true)
    }

    /// Returns false without persisting when `name` is absent.
    pub fn set_active(&self, name: &str) -> Result<bool> {
        let mut state = self.load();
        if !state.profiles.iter().any(|profile| profile.name == name) {
            return Ok(false);
        }

        state.active = Some(name.to_string());
        self.save(&state)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::ProfileStore;
    use crate::model::{ProfileState, WorkspaceProfile};
    use std::fs;

    fn profile(name: &str) -> WorkspaceProfile {
        WorkspaceProfile {
            name: name.to_string(),
            host: format!("https://{name}.cloud.example.com"),
            token: format!("token-{name}"),
            warehouse_id: None,
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> ProfileStore {
        ProfileStore::new(dir.path().join("profiles.json"))
    }

    #[test]
    fn load_of_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        assert_eq!(store.load(), ProfileState::default());
    }

    #[test]
    fn load_of_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        fs::write(store.path(), "not json {").expect("write corrupt file");
        assert_eq!(store.load(), ProfileState::default());
    }

    #[test]
    fn save_then_load_round_trips_order_and_active() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let state = ProfileState {
            active: Some("b".to_string()),
            profiles: vec![profile("c"), profile("a"), profile("b")],
        };

        store.save(&state).expect("save state");
        assert_eq!(store.load(), state);
    }

    #[test]
    fn first_add_sets_active() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);

        store.add_profile(profile("dev")).expect("add profile");

        let state = store.load();
        assert_eq!(state.active.as_deref(), Some("dev"));
        assert_eq!(state.profiles.len(), 1);
    }

    #[test]
    fn add_with_existing_name_replaces_in_place() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.add_profile(profile("a")).expect("add a");
        store.add_profile(profile("b")).expect("add b");
        store.add_profile(profile("c")).expect("add c");

        let mut replacement = profile("b");
        replacement.host = "https://elsewhere.example.com".to_string();
        store.add_profile(replacement).expect("replace b");

        let state = store.load();
        let names = state
            .profiles
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(state.profiles[1].host, "https://elsewhere.example.com");
        assert_eq!(state.active.as_deref(), Some("a"));
    }

    #[test]
    fn remove_of_missing_name_leaves_file_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.add_profile(profile("a")).expect("add a");
        let before = fs::read(store.path()).expect("read profiles file");

        assert!(!store.remove_profile("missing").expect("remove missing"));
        let after = fs::read(store.path()).expect("read profiles file");
        assert_eq!(before, after);
    }

    #[test]
    fn removing_the_active_profile_reassigns_to_first_remaining() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.add_profile(profile("a")).expect("add a");
        store.add_profile(profile("b")).expect("add b");
        store.add_profile(profile("c")).expect("add c");
        assert!(store.set_active("b").expect("set active"));

        assert!(store.remove_profile("b").expect("remove b"));

        let state = store.load();
        let names = state
            .profiles
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(state.active.as_deref(), Some("a"));
    }

    #[test]
    fn removing_the_last_profile_unsets_active() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.add_profile(profile("only")).expect("add only");

        assert!(store.remove_profile("only").expect("remove only"));

        let state = store.load();
        assert!(state.profiles.is_empty());
        assert!(state.active.is_none());
    }

    #[test]
    fn set_active_of_missing_name_is_a_persisted_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.add_profile(profile("a")).expect("add a");
        let before = fs::read(store.path()).expect("read profiles file");

        assert!(!store.set_active("missing").expect("set active missing"));
        let after = fs::read(store.path()).expect("read profiles file");
        assert_eq!(before, after);
        assert_eq!(store.load().active.as_deref(), Some("a"));
    }
}
