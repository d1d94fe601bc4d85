pub mod league;
pub mod ledger;
pub mod lifecycle;
pub mod matchup;
pub mod schedule;

pub use league::*;
pub use ledger::*;
pub use lifecycle::*;
pub use matchup::*;
pub use schedule::*;
