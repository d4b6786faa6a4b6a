use crate::core::error::ReplayError;
use crate::core::turn_log::Combatant;
use serde::{Deserialize, Serialize};

fn default_level() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    pub hp: i32,
    #[serde(default)]
    pub attack: i32,
    #[serde(default)]
    pub defense: i32,
}

impl Hero {
    pub fn to_combatant(&self) -> Result<Combatant, ReplayError> {
        Combatant::new(self.name.clone(), self.hp)
    }
}

/// Body of `POST /heroes`. New heroes start at zero experience.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHero {
    pub name: String,
    pub level: u32,
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub xp: u32,
}

impl Default for NewHero {
    fn default() -> Self {
        Self {
            name: String::new(),
            level: 1,
            hp: 100,
            attack: 10,
            defense: 5,
            xp: 0,
        }
    }
}

impl NewHero {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ReplayError> {
        if self.name.is_empty() {
            return Err(ReplayError::Config("hero name must not be empty".to_string()));
        }
        Combatant::new(self.name.clone(), self.hp).map(|_| ())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monster {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    pub hp: i32,
    #[serde(default)]
    pub attack: i32,
    #[serde(default)]
    pub defense: i32,
    #[serde(default)]
    pub area: Option<String>,
    /// Carried for display only; battle selection is uniform.
    #[serde(default)]
    pub spawn_weight: Option<u32>,
}

impl Monster {
    pub fn to_combatant(&self) -> Result<Combatant, ReplayError> {
        Combatant::new(self.name.clone(), self.hp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_hero_defaults_and_wire_format() {
        let hero = NewHero::named("  Markus the Brave ");
        assert_eq!(hero.name, "Markus the Brave");
        let json = serde_json::to_value(&hero).expect("encode");
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Markus the Brave",
                "level": 1,
                "hp": 100,
                "attack": 10,
                "defense": 5,
                "xp": 0
            })
        );
    }

    #[test]
    fn test_new_hero_validation() {
        assert!(NewHero::named("Aria").validate().is_ok());
        assert!(NewHero::named("   ").validate().is_err());
        let fragile = NewHero {
            hp: 0,
            ..NewHero::named("Aria")
        };
        assert!(matches!(
            fragile.validate(),
            Err(ReplayError::InvalidCombatant { max_hp: 0, .. })
        ));
    }
}
