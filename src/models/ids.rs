//! Typed identifiers for upstream FPL records.
//!
//! The API numbers teams, fixtures and players ("elements") independently, so
//! each gets its own newtype to keep a team id from being passed where a
//! fixture id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw upstream number.
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

numeric_id!(
    /// Premier League club id (1..=20 in a normal season).
    TeamId
);

numeric_id!(
    /// Fixture id, unique across the season.
    FixtureId
);

numeric_id!(
    /// Player ("element") id.
    PlayerId
);

/// Parse a comma-separated id list such as `"1,4, 7"`.
///
/// Empty segments are ignored; the first malformed segment is returned as the
/// error value.
pub fn parse_id_list<T: FromStr>(s: &str) -> Result<Vec<T>, String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<T>().map_err(|_| part.to_string()))
        .collect()
}
