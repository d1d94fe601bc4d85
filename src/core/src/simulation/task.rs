use crate::farm::{Character, Job};
use rand::RngExt;

const TASK_SUCCESS_POINTS: u32 = 2;
const EXTRA_SHIFT_POINTS: u32 = 1;
const TEAMWORK_POINTS: u32 = 1;
const FLAWLESS_POINTS: u32 = 1;

const TEAMWORK_CHANCE: f64 = 0.25;

struct FarmTask {
    chore: &'static str,
    failure: &'static str,
}

const FIX_MEISER_TASKS: [FarmTask; 3] = [
    FarmTask {
        chore: "patch the leaking irrigation pump",
        failure: "the pump sprayed everywhere",
    },
    FarmTask {
        chore: "rewire the barn lights",
        failure: "the fuse box won the argument",
    },
    FarmTask {
        chore: "tune up the old tractor",
        failure: "the tractor refused to start",
    },
];

const SPEED_RUNNER_TASKS: [FarmTask; 3] = [
    FarmTask {
        chore: "deliver eggs to the market before noon",
        failure: "half the eggs cracked on the way",
    },
    FarmTask {
        chore: "round up the escaped goats",
        failure: "the goats were faster",
    },
    FarmTask {
        chore: "haul feed across the north pasture",
        failure: "the feed cart tipped into the creek",
    },
];

const LIFT_TENDER_TASKS: [FarmTask; 3] = [
    FarmTask {
        chore: "stack the hay bales in the loft",
        failure: "the bales came tumbling back down",
    },
    FarmTask {
        chore: "lift the fallen fence posts",
        failure: "the posts would not budge",
    },
    FarmTask {
        chore: "unload the seed sacks from the truck",
        failure: "a sack split open across the yard",
    },
];

fn tasks_for(job: Job) -> &'static [FarmTask] {
    match job {
        Job::FixMeiser => &FIX_MEISER_TASKS,
        Job::SpeedRunner => &SPEED_RUNNER_TASKS,
        Job::LiftTender => &LIFT_TENDER_TASKS,
    }
}

fn secondary_attribute(character: &Character) -> u8 {
    let attrs = &character.attributes;
    match character.job {
        Job::FixMeiser => attrs.stamina,
        Job::SpeedRunner => attrs.strength,
        Job::LiftTender => attrs.handy,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub points: u32,
    pub lines: Vec<String>,
}

/// Resolves one character's chore for a matchday.
///
/// Every roll is drawn from the supplied generator, so a seeded generator
/// reproduces the same outcome and narrative.
pub struct TaskResolver;

impl TaskResolver {
    pub fn resolve<R: RngExt + ?Sized>(
        character: &Character,
        teammates: &[&str],
        rng: &mut R,
    ) -> TaskOutcome {
        let tasks = tasks_for(character.job);
        let task = &tasks[rng.random_range(0..tasks.len())];

        let mut points = 0;
        let mut lines = Vec::with_capacity(3);

        let roll: u8 = rng.random_range(1..=11);
        if roll <= character.primary_attribute() {
            points += TASK_SUCCESS_POINTS;

            if roll == 1 {
                points += FLAWLESS_POINTS;
                lines.push(format!(
                    "{} set out to {} and did it flawlessly.",
                    character.name, task.chore
                ));
            } else {
                lines.push(format!("{} managed to {}.", character.name, task.chore));
            }
        } else {
            lines.push(format!(
                "{} tried to {}, but {}.",
                character.name, task.chore, task.failure
            ));
        }

        let shift_roll: u8 = rng.random_range(1..=11);
        if shift_roll <= secondary_attribute(character) {
            points += EXTRA_SHIFT_POINTS;
            lines.push(format!("{} stayed late for an extra shift.", character.name));
        }

        if !teammates.is_empty() && rng.random_bool(TEAMWORK_CHANCE) {
            let helper = teammates[rng.random_range(0..teammates.len())];
            points += TEAMWORK_POINTS;
            lines.push(format!("{} lent {} a hand.", helper, character.name));
        }

        TaskOutcome { points, lines }
    }

    pub const fn max_points() -> u32 {
        TASK_SUCCESS_POINTS + FLAWLESS_POINTS + EXTRA_SHIFT_POINTS + TEAMWORK_POINTS
    }
}
