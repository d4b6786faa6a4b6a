use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Gate consulted before a battle can be requested.
pub trait SessionGate: Send + Sync {
    fn is_authenticated(&self) -> bool;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub username: Option<String>,
    pub roles: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub credentials: Option<Credentials>,
    pub theme: Theme,
}

/// Process-wide auth and preference state. Created once at startup and
/// passed to whatever needs it; changes are broadcast to subscribers.
#[derive(Clone)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
    changes: Arc<watch::Sender<SessionState>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let state = SessionState::default();
        let (changes, _) = watch::channel(state.clone());
        Self {
            state: Arc::new(RwLock::new(state)),
            changes: Arc::new(changes),
        }
    }

    fn update(&self, f: impl FnOnce(&mut SessionState)) {
        let mut state = self.state.write();
        f(&mut state);
        self.changes.send_replace(state.clone());
    }

    pub fn sign_in(&self, credentials: Credentials) {
        info!(username = ?credentials.username, "signed in");
        self.update(|state| state.credentials = Some(credentials));
    }

    pub fn sign_out(&self) {
        info!("signed out");
        self.update(|state| state.credentials = None);
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().credentials.as_ref().map(|c| c.token.clone())
    }

    pub fn username(&self) -> Option<String> {
        self.state
            .read()
            .credentials
            .as_ref()
            .and_then(|c| c.username.clone())
    }

    pub fn theme(&self) -> Theme {
        self.state.read().theme
    }

    pub fn toggle_theme(&self) -> Theme {
        let mut theme = Theme::default();
        self.update(|state| {
            state.theme = state.theme.toggled();
            theme = state.theme;
        });
        theme
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.changes.subscribe()
    }
}

impl SessionGate for Session {
    fn is_authenticated(&self) -> bool {
        self.state.read().credentials.is_some()
    }
}
