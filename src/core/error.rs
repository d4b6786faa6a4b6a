/// Failure reported by a remote collaborator (battle authority, monster
/// catalog). The message is shown to the user verbatim.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ServiceError {
    pub status: Option<u16>,
    pub message: String,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("malformed turn log: {0}")]
    MalformedLog(String),
    #[error("frontier {frontier} is outside 0..={len}")]
    OutOfRange { frontier: usize, len: usize },
    #[error("invalid combatant '{name}': max hp must be positive, got {max_hp}")]
    InvalidCombatant { name: String, max_hp: i32 },
    #[error("not authenticated")]
    Unauthenticated,
    #[error("no hero selected")]
    MissingHero,
    #[error("no monsters available even after populating defaults")]
    EmptyMonsterPool,
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("auto-play needs a running tokio runtime")]
    NoRuntime,
    #[error("configuration error: {0}")]
    Config(String),
}

impl ReplayError {
    /// The single message a shell should display for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ReplayError::Service(err) => err.message.clone(),
            ReplayError::MalformedLog(_) => "Failed to start battle".to_string(),
            other => other.to_string(),
        }
    }

    /// Recoverable failures send the user elsewhere (login, hero creation)
    /// instead of showing an error screen.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ReplayError::Unauthenticated | ReplayError::MissingHero)
    }
}
