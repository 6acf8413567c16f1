//! Data models for the favorites engine.
//!
//! Wire models match the LifeHacks API JSON contract exactly for seamless
//! interoperability.

mod filter;
mod tip;

pub use filter::*;
pub use tip::*;
