pub mod catastrophe;
pub mod engine;
pub mod injury;
pub mod record;
pub mod state;
pub mod task;

pub use catastrophe::*;
pub use engine::*;
pub use injury::*;
pub use record::*;
pub use state::*;
pub use task::*;
