use chrono::{DateTime, Local};

use crate::input::Action;
use crate::model::{ProfileState, RefreshPhase, WorkspaceProfile};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FocusPane {
    Workspaces,
    Catalogs,
}

/// Side effect requested by a state transition, executed by the main loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    None,
    Refresh,
    Activate { name: String },
    Delete { name: String },
}

/// Completion event of one spawned catalog refresh. `generation` identifies
/// the refresh that produced it; completions of superseded generations are
/// dropped on arrival.
#[derive(Debug)]
pub struct CatalogRefresh {
    pub generation: u64,
    pub workspace: String,
    pub result: Result<Vec<String>, String>,
}

/// Transient session state. The profile list is a snapshot of the store and
/// is re-synchronized from disk after every mutating command; the store, not
/// this struct, is the source of truth.
pub struct App {
    running: bool,
    profiles: Vec<WorkspaceProfile>,
    active: Option<String>,
    selected: usize,
    focus: FocusPane,
    catalogs: Vec<String>,
    catalog_cursor: usize,
    phase: RefreshPhase,
    status: String,
    last_refreshed: Option<DateTime<Local>>,
    refresh_generation: u64,
}

impl App {
    pub fn new(state: &ProfileState) -> Self {
        Self {
            running: true,
            profiles: state.profiles.clone(),
            active: state.active_profile().map(|profile| profile.name.clone()),
            selected: state.active_position(),
            focus: FocusPane::Workspaces,
            catalogs: Vec::new(),
            catalog_cursor: 0,
            phase: RefreshPhase::Idle,
            status: "Ready".to_string(),
            last_refreshed: None,
            refresh_generation: 0,
        }
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn focus(&self) -> FocusPane {
        self.focus
    }

    pub fn profiles(&self) -> &[WorkspaceProfile] {
        &self.profiles
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_profile(&self) -> Option<&WorkspaceProfile> {
        self.profiles.get(self.selected)
    }

    pub fn catalogs(&self) -> &[String] {
        &self.catalogs
    }

    pub fn catalog_cursor(&self) -> usize {
        self.catalog_cursor
    }

    pub fn phase(&self) -> RefreshPhase {
        self.phase
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Local>> {
        self.last_refreshed
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn apply_action(&mut self, action: Action) -> AppCommand {
        match action {
            Action::Quit => {
                self.running = false;
                self.status = "Exit requested".to_string();
                AppCommand::None
            }
            Action::Up => {
                self.move_cursor(-1);
                AppCommand::None
            }
            Action::Down => {
                self.move_cursor(1);
                AppCommand::None
            }
            Action::ToggleFocus => {
                self.focus = match self.focus {
                    FocusPane::Workspaces => FocusPane::Catalogs,
                    FocusPane::Catalogs => FocusPane::Workspaces,
                };
                self.status = match self.focus {
                    FocusPane::Workspaces => "Focus: workspaces".to_string(),
                    FocusPane::Catalogs => "Focus: catalogs".to_string(),
                };
                AppCommand::None
            }
            Action::Select => match (self.focus, self.selected_profile()) {
                (FocusPane::Workspaces, Some(profile)) => AppCommand::Activate {
                    name: profile.name.clone(),
                },
                _ => AppCommand::None,
            },
            Action::Delete => match (self.focus, self.selected_profile()) {
                (FocusPane::Workspaces, Some(profile)) => AppCommand::Delete {
                    name: profile.name.clone(),
                },
                _ => AppCommand::None,
            },
            Action::Refresh => AppCommand::Refresh,
        }
    }

    /// Replace the profile snapshot with a fresh store load and clamp the
    /// selection into the new bounds.
    pub fn sync_profiles(&mut self, state: &ProfileState) {
        self.profiles = state.profiles.clone();
        self.active = state.active_profile().map(|profile| profile.name.clone());
        if self.profiles.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.profiles.len() {
            self.selected = self.profiles.len() - 1;
        }
    }

    /// Stamp a new refresh generation for the profile under the cursor.
    /// Returns `None` when there is nothing to refresh, in which case the
    /// session settles in `Idle` with an empty catalog list.
    pub fn begin_refresh(&mut self) -> Option<(u64, WorkspaceProfile)> {
        let Some(profile) = self.selected_profile().cloned() else {
            self.catalogs.clear();
            self.catalog_cursor = 0;
            self.phase = RefreshPhase::Idle;
            self.status = "No workspaces configured (run: lakeview login)".to_string();
            return None;
        };

        self.refresh_generation += 1;
        self.phase = RefreshPhase::Loading;
        self.status = format!("Loading catalogs for '{}'...", profile.name);
        Some((self.refresh_generation, profile))
    }

    pub fn finish_refresh(&mut self, refresh: CatalogRefresh) {
        if refresh.generation < self.refresh_generation {
            return;
        }

        match refresh.result {
            Ok(catalogs) => {
                self.status = format!(
                    "Loaded {} catalogs for '{}'",
                    catalogs.len(),
                    refresh.workspace
                );
                self.catalogs = catalogs;
                self.catalog_cursor = 0;
                self.phase = RefreshPhase::Ready;
                self.last_refreshed = Some(Local::now());
            }
            Err(error) => {
                self.catalogs.clear();
                self.catalog_cursor = 0;
                self.phase = RefreshPhase::Error;
                self.status = format!(
                    "Failed loading catalogs for '{}': {error}",
                    refresh.workspace
                );
            }
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        match self.focus {
            FocusPane::Workspaces => {
                if self.profiles.is_empty() {
                    return;
                }
                let last = self.profiles.len() - 1;
                self.selected = self.selected.saturating_add_signed(delta).min(last);
            }
            FocusPane::Catalogs => {
                if self.catalogs.is_empty() {
                    return;
                }
                let last = self.catalogs.len() - 1;
                self.catalog_cursor = self.catalog_cursor.saturating_add_signed(delta).min(last);
            }
        }
    }
}
