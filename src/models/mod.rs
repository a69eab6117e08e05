//! Core data models: upstream records and the statistics derived from them.

mod fixture;
mod ids;
mod player;
mod snapshot;
mod stats;
mod team;

#[cfg(test)]
pub(crate) mod sample;

pub use fixture::*;
pub use ids::*;
pub use player::*;
pub use snapshot::*;
pub use stats::*;
pub use team::*;
