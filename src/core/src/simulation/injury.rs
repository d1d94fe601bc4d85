use crate::farm::Character;
use rand::RngExt;

const INJURY_FLAVORS: [&str; 5] = [
    "throwing out their back riding the mechanical bull at the local bar",
    "slipping on a rogue vegetable during lunch break",
    "an overenthusiastic victory dance",
    "trying to arm wrestle a gangster cow and losing",
    "falling off a hay wagon while waving to the neighbours",
];

const MISS_DAYS_CHANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Injury {
    pub point_loss: u32,
    /// Matchdays the character sits out after today, zero when they play on
    pub miss_days: u8,
}

pub struct InjuryModel;

impl InjuryModel {
    /// Rolls the daily injury check and applies it to the character's season counters.
    ///
    /// Triggers on a 1-in-3 roll combined with a 1..=11 roll above the
    /// character's physical attribute, so physical 11 never gets hurt.
    pub fn check<R: RngExt + ?Sized>(character: &mut Character, rng: &mut R) -> Option<Injury> {
        let first: u8 = rng.random_range(1..=3);
        let second: u8 = rng.random_range(1..=11);

        if first != 3 || second <= character.attributes.physical {
            return None;
        }

        let point_loss = rng.random_range(1..=2);
        character.injuries_this_season += 1;
        character.injury_points_lost += point_loss;

        let miss_days = if rng.random_bool(MISS_DAYS_CHANCE) {
            let days = rng.random_range(1..=2);
            character.miss_days = days;
            days
        } else {
            0
        };

        Some(Injury {
            point_loss,
            miss_days,
        })
    }

    pub fn describe<R: RngExt + ?Sized>(name: &str, injury: &Injury, rng: &mut R) -> String {
        let flavor = INJURY_FLAVORS[rng.random_range(0..INJURY_FLAVORS.len())];

        if injury.miss_days > 0 {
            format!(
                "Due to {}, {} got hurt and will miss {} matchday(s).",
                flavor, name, injury.miss_days
            )
        } else {
            format!("Due to {}, {} got hurt but will be back tomorrow.", flavor, name)
        }
    }
}
