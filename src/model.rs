use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter};

/// One saved connection to a remote workspace. `name` is the unique key;
/// collisions are resolved by upsert, never rejected.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspaceProfile {
    pub name: String,
    pub host: String,
    pub token: String,
    #[serde(
        rename = "warehouseId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub warehouse_id: Option<String>,
}

impl fmt::Debug for WorkspaceProfile {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("WorkspaceProfile")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .field("warehouse_id", &self.warehouse_id)
            .finish()
    }
}

/// The persisted shape of the profiles file. Insertion order of `profiles`
/// is meaningful and survives load/save cycles.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
    #[serde(default)]
    pub profiles: Vec<WorkspaceProfile>,
}

impl ProfileState {
    /// Resolve the active profile. `active` may lag behind the profile list
    /// (deleted out from under it by another process); an unset or stale
    /// reference falls back to the first profile in order.
    pub fn active_profile(&self) -> Option<&WorkspaceProfile> {
        let Some(active) = self.active.as_deref() else {
            return self.profiles.first();
        };
        self.profiles
            .iter()
            .find(|profile| profile.name == active)
            .or_else(|| self.profiles.first())
    }

    /// Position of the resolved active profile, 0 when nothing resolves.
    pub fn active_position(&self) -> usize {
        let Some(active) = self.active_profile() else {
            return 0;
        };
        self.profiles
            .iter()
            .position(|profile| profile.name == active.name)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RefreshPhase {
    Idle,
    Loading,
    Ready,
    Error,
}

#[cfg(test)]
mod tests {
    use super::{ProfileState, WorkspaceProfile};

    fn profile(name: &str) -> WorkspaceProfile {
        WorkspaceProfile {
            name: name.to_string(),
            host: format!("https://{name}.example.com"),
            token: "secret".to_string(),
            warehouse_id: None,
        }
    }

    #[test]
    fn unset_active_resolves_to_first_profile() {
        let state = ProfileState {
            active: None,
            profiles: vec![profile("a"), profile("b")],
        };
        assert_eq!(state.active_profile().map(|p| p.name.as_str()), Some("a"));
        assert_eq!(state.active_position(), 0);
    }

    #[test]
    fn stale_active_falls_back_to_first_profile() {
        let state = ProfileState {
            active: Some("gone".to_string()),
            profiles: vec![profile("a"), profile("b")],
        };
        assert_eq!(state.active_profile().map(|p| p.name.as_str()), Some("a"));
    }

    #[test]
    fn active_resolves_by_name() {
        let state = ProfileState {
            active: Some("b".to_string()),
            profiles: vec![profile("a"), profile("b"), profile("c")],
        };
        assert_eq!(state.active_profile().map(|p| p.name.as_str()), Some("b"));
        assert_eq!(state.active_position(), 1);
    }

    #[test]
    fn empty_state_resolves_to_none() {
        let state = ProfileState::default();
        assert!(state.active_profile().is_none());
        assert_eq!(state.active_position(), 0);
    }

    #[test]
    fn serialized_shape_matches_the_profiles_file() {
        let state = ProfileState {
            active: Some("dev".to_string()),
            profiles: vec![WorkspaceProfile {
                name: "dev".to_string(),
                host: "https://x".to_string(),
                token: "t".to_string(),
                warehouse_id: Some("w1".to_string()),
            }],
        };
        let rendered = serde_json::to_value(&state).expect("serialize state");
        assert_eq!(rendered["active"], "dev");
        assert_eq!(rendered["profiles"][0]["warehouseId"], "w1");
    }

    #[test]
    fn unset_fields_are_omitted_from_json() {
        let state = ProfileState {
            active: None,
            profiles: vec![profile("a")],
        };
        let rendered = serde_json::to_value(&state).expect("serialize state");
        assert!(rendered.get("active").is_none());
        assert!(rendered["profiles"][0].get("warehouseId").is_none());
    }

    #[test]
    fn debug_output_redacts_the_token() {
        let rendered = format!("{:?}", profile("a"));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("secret"));
    }
}
