pub mod clock;
pub mod error;
pub mod farm;
pub mod league;
pub mod simulation;
pub mod store;
pub mod utils;

pub mod simulator;
pub use simulator::*;

pub use clock::MatchdayClock;
pub use error::{SeasonError, SeasonResult};
pub use store::{InMemoryStore, SeasonStore, StoreError, StoreResult};

pub use farm::{ATTRIBUTE_MAX, ATTRIBUTE_MIN, BENCH_SIZE, Character, CharacterAttributes, Job, Roster};

pub use league::{
    ArchivedTeam, League, LeagueLifecycle, LeagueOutcome, LeagueStatus, MatchupId, MatchupProgress,
    MatchupSchedule, MatchupScheduler, MatchupView, Pairing, PlayoffLedger, PlayoffRecord, Standing,
    StrengthComparison, DEFAULT_MATCHDAY_LIMIT,
};

pub use simulation::{
    Catastrophe, CatastropheKind, CatastropheModel, CharacterOutcome, CharacterStats, DailyRecord, Injury, InjuryModel,
    MatchdaySimulation, PlayerSeasonState, Season, SimulationPhase, TaskOutcome, TaskResolver,
    MATCHDAYS_PER_CYCLE,
};
