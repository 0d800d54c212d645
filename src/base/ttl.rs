//! Time-to-live values.

use core::fmt;
use core::str::FromStr;

//------------ Ttl -----------------------------------------------------------

/// The time-to-live of a resource record in seconds.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ttl(u32);

impl Ttl {
    /// A TTL of zero seconds.
    pub const ZERO: Self = Self(0);

    /// Creates a new value from a number of seconds.
    #[must_use]
    pub const fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    /// Returns the number of seconds of this value.
    #[must_use]
    pub const fn as_secs(self) -> u32 {
        self.0
    }
}

//--- FromStr and Display

impl FromStr for Ttl {
    type Err = core::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u32::from_str(s).map(Ttl)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}
