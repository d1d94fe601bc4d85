use crate::farm::{Character, Job};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const BENCH_SIZE: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub starters: BTreeMap<Job, Character>,
    #[serde(default)]
    pub bench: Vec<Character>,
}

impl Roster {
    pub fn new() -> Self {
        Roster::default()
    }

    /// Places a character into a starter slot, returning whoever held it.
    pub fn assign(&mut self, job: Job, mut character: Character) -> Option<Character> {
        character.job = job;
        self.starters.insert(job, character)
    }

    /// Returns the character back when the bench is already full.
    pub fn add_to_bench(&mut self, character: Character) -> Result<(), Character> {
        if self.bench.len() >= BENCH_SIZE {
            return Err(character);
        }

        self.bench.push(character);
        Ok(())
    }

    pub fn missing_jobs(&self) -> Vec<Job> {
        Job::ALL
            .into_iter()
            .filter(|job| !self.starters.contains_key(job))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_jobs().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.starters.is_empty() && self.bench.is_empty()
    }

    pub fn starters(&self) -> impl Iterator<Item = &Character> {
        self.starters.values()
    }

    pub fn starters_mut(&mut self) -> impl Iterator<Item = &mut Character> {
        self.starters.values_mut()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.starters().chain(self.bench.iter()).any(|c| c.name == name)
    }

    /// Sum of every attribute across the starters
    pub fn strength(&self) -> u32 {
        self.starters().map(|c| c.attributes.total()).sum()
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut names: Vec<&str> = Vec::new();

        for (job, character) in &self.starters {
            if character.job != *job {
                return Err(format!(
                    "{} sits in the {} slot but is recorded as {}",
                    character.name, job, character.job
                ));
            }
        }

        if self.bench.len() > BENCH_SIZE {
            return Err(format!("bench holds {} characters", self.bench.len()));
        }

        for character in self.starters().chain(self.bench.iter()) {
            character
                .attributes
                .validate()
                .map_err(|e| format!("{}: {}", character.name, e))?;

            if names.contains(&character.name.as_str()) {
                return Err(format!("duplicate character {}", character.name));
            }
            names.push(&character.name);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farm::CharacterAttributes;

    fn character(name: &str) -> Character {
        Character::new(name, Job::FixMeiser, CharacterAttributes::new(5, 5, 5, 5))
    }

    #[test]
    fn test_assign_sets_job() {
        let mut roster = Roster::new();
        roster.assign(Job::LiftTender, character("Bo"));

        assert_eq!(roster.starters[&Job::LiftTender].job, Job::LiftTender);
    }

    #[test]
    fn test_completeness_requires_all_three_jobs() {
        let mut roster = Roster::new();
        roster.assign(Job::FixMeiser, character("A"));
        roster.assign(Job::SpeedRunner, character("B"));

        assert!(!roster.is_complete());
        assert_eq!(roster.missing_jobs(), vec![Job::LiftTender]);

        roster.assign(Job::LiftTender, character("C"));
        assert!(roster.is_complete());
    }

    #[test]
    fn test_bench_capacity() {
        let mut roster = Roster::new();
        assert!(roster.add_to_bench(character("A")).is_ok());
        assert!(roster.add_to_bench(character("B")).is_ok());
        assert!(roster.add_to_bench(character("C")).is_err());
    }

    #[test]
    fn test_bench_characters_do_not_count_as_starters() {
        let mut roster = Roster::new();
        roster.add_to_bench(character("A")).unwrap();
        roster.add_to_bench(character("B")).unwrap();

        assert!(!roster.is_complete());
        assert!(roster.contains("A"));
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let mut roster = Roster::new();
        roster.assign(Job::FixMeiser, character("Same"));
        roster.assign(Job::SpeedRunner, character("Same"));

        assert!(roster.validate().is_err());
    }

    #[test]
    fn test_strength_sums_starters_only() {
        let mut roster = Roster::new();
        roster.assign(Job::FixMeiser, character("A"));
        roster.assign(Job::SpeedRunner, character("B"));
        roster.add_to_bench(character("C")).unwrap();

        assert_eq!(roster.strength(), 40);
    }
}
