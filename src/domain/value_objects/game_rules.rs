use serde::{Deserialize, Serialize};

/// Game constants shared by the engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRules {
    /// Players needed to start a game or a new round
    pub min_players: usize,
    /// Characters in a join code
    pub join_code_length: usize,
    /// Awarded to every non-impostor when the impostor is voted out
    pub caught_bonus: i64,
    /// Awarded to the impostor when an innocent player is voted out
    pub evaded_bonus: i64,
    pub max_display_name_len: usize,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            min_players: 3,
            join_code_length: 6,
            caught_bonus: 2,
            evaded_bonus: 3,
            max_display_name_len: 32,
        }
    }
}

impl GameRules {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.min_players < 3 {
            return Err("At least 3 players are needed for one impostor");
        }
        if self.join_code_length < 4 {
            return Err("Join codes must be at least 4 characters");
        }
        Ok(())
    }

    /// Trim a display name and check its length
    pub fn clean_display_name(&self, name: &str) -> Result<String, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Display name is required".to_string());
        }
        if name.chars().count() > self.max_display_name_len {
            return Err(format!(
                "Display name must be at most {} characters",
                self.max_display_name_len
            ));
        }
        Ok(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        assert!(GameRules::default().validate().is_ok());
    }

    #[test]
    fn test_clean_display_name() {
        let rules = GameRules::default();
        assert_eq!(rules.clean_display_name("  Ada ").unwrap(), "Ada");
        assert!(rules.clean_display_name("   ").is_err());
        assert!(rules.clean_display_name(&"x".repeat(33)).is_err());
    }
}
