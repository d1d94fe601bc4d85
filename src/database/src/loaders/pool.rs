use farm_core::{Character, CharacterAttributes, Job, StoreError, StoreResult};
use serde::Deserialize;

const STATIC_CHARACTERS_JSON: &str = include_str!("../data/characters.json");

#[derive(Debug, Clone, Deserialize)]
pub struct CharacterEntity {
    pub name: String,
    pub strength: u8,
    pub handy: u8,
    pub stamina: u8,
    pub physical: u8,
}

impl CharacterEntity {
    pub fn attributes(&self) -> CharacterAttributes {
        CharacterAttributes::new(self.strength, self.handy, self.stamina, self.physical)
    }

    /// Builds the character in the job its attributes suit best.
    pub fn to_character(&self) -> Character {
        let attributes = self.attributes();
        Character::new(&self.name, Job::suggested_for(&attributes), attributes)
    }
}

pub struct CharacterPoolLoader;

impl CharacterPoolLoader {
    pub fn load() -> StoreResult<Vec<CharacterEntity>> {
        Self::parse(STATIC_CHARACTERS_JSON)
    }

    fn parse(json: &str) -> StoreResult<Vec<CharacterEntity>> {
        let entities: Vec<CharacterEntity> = serde_json::from_str(json).map_err(|source| StoreError::Serde {
            key: String::from("characters"),
            source,
        })?;

        for entity in &entities {
            entity.attributes().validate().map_err(|reason| StoreError::Invalid {
                key: entity.name.clone(),
                reason,
            })?;
        }

        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_embedded_pool_loads() {
        let pool = CharacterPoolLoader::load().unwrap();

        assert!(pool.len() >= 18);

        let names: HashSet<&str> = pool.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), pool.len());
    }

    #[test]
    fn test_pool_covers_every_job() {
        let pool = CharacterPoolLoader::load().unwrap();

        for job in Job::ALL {
            assert!(pool.iter().any(|c| c.to_character().job == job), "no {} in pool", job);
        }
    }

    #[test]
    fn test_out_of_range_attribute_rejected() {
        let json = r#"[{ "name": "Giant", "strength": 14, "handy": 2, "stamina": 2, "physical": 2 }]"#;

        assert!(matches!(CharacterPoolLoader::parse(json), Err(StoreError::Invalid { .. })));
    }

    #[test]
    fn test_suggested_job() {
        let entity = CharacterEntity {
            name: String::from("Otis"),
            strength: 11,
            handy: 3,
            stamina: 6,
            physical: 8,
        };

        assert_eq!(entity.to_character().job, Job::LiftTender);
    }
}
