pub mod character;
pub mod roster;

pub use character::*;
pub use roster::*;
