use crate::core::error::ReplayError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    pub max_hp: i32,
}

impl Combatant {
    pub fn new(name: impl Into<String>, max_hp: i32) -> Result<Self, ReplayError> {
        let name = name.into();
        if max_hp <= 0 {
            return Err(ReplayError::InvalidCombatant { name, max_hp });
        }
        Ok(Self { name, max_hp })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnEvent {
    pub turn_number: i64,
    pub attacker: String,
    pub defender: String,
    pub damage: i32,
    pub defender_hp_after: i32,
}

/// Payload of `GET /battles/{id}/details`. `logs` stays raw until
/// [`TurnLog::from_details`] validates it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BattleDetails {
    pub id: i64,
    #[serde(default)]
    pub logs: Option<Value>,
}

impl BattleDetails {
    pub fn new(id: i64, events: &[TurnEvent]) -> Result<Self, ReplayError> {
        let logs = serde_json::to_value(events).map_err(|err| ReplayError::MalformedLog(err.to_string()))?;
        Ok(Self { id, logs: Some(logs) })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BattleSummary {
    pub id: i64,
}

/// Resolved, validated record of one battle. Never mutated after construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnLog {
    events: Vec<TurnEvent>,
}

impl TurnLog {
    pub fn new(events: Vec<TurnEvent>) -> Result<Self, ReplayError> {
        for (idx, event) in events.iter().enumerate() {
            let expected = idx as i64 + 1;
            if event.turn_number != expected {
                return Err(ReplayError::MalformedLog(format!(
                    "expected turn {} at index {}, found turn {}",
                    expected, idx, event.turn_number
                )));
            }
            if event.damage < 0 {
                return Err(ReplayError::MalformedLog(format!(
                    "turn {} has negative damage {}",
                    event.turn_number, event.damage
                )));
            }
        }
        Ok(Self { events })
    }

    pub fn empty() -> Self {
        Self { events: Vec::new() }
    }

    /// A missing or null `logs` field is an empty battle, not an error.
    /// Events that do not decode are a malformed log.
    pub fn from_details(details: BattleDetails) -> Result<Self, ReplayError> {
        let events = match details.logs {
            None | Some(Value::Null) => Vec::new(),
            Some(raw) => serde_json::from_value::<Vec<TurnEvent>>(raw)
                .map_err(|err| ReplayError::MalformedLog(format!("battle {}: {}", details.id, err)))?,
        };
        Self::new(events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[TurnEvent] {
        &self.events
    }

    /// Event at 0-based `index`.
    pub fn get(&self, index: usize) -> Option<&TurnEvent> {
        self.events.get(index)
    }

    /// Events visible at `frontier`, clamped to the log length.
    pub fn revealed(&self, frontier: usize) -> &[TurnEvent] {
        &self.events[..frontier.min(self.events.len())]
    }
}
