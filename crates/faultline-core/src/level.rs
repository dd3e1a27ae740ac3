//! Ordered trust levels.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// The trust tier an identity holds for one app.
///
/// Levels are totally ordered: `None < View < Edit < Admin`. Comparisons go
/// by ordinal, so "has at least view" is `level >= Level::View`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// No access. An explicit none grant still wins over the admin fallback.
    None,
    /// May read crash reports.
    View,
    /// May read reports and edit app configuration.
    Edit,
    /// May administer the app, including its permission mappings.
    Admin,
}

impl Level {
    /// Convert to the stored ordinal.
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Try to parse from a stored ordinal.
    pub fn from_ordinal(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::View),
            2 => Some(Self::Edit),
            3 => Some(Self::Admin),
            _ => None,
        }
    }

    /// Check whether this level meets a required one.
    pub fn satisfies(self, required: Level) -> bool {
        self >= required
    }

    /// The stored name of this level.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::View => "view",
            Self::Edit => "edit",
            Self::Admin => "admin",
        }
    }

    /// All levels, in ascending order.
    pub const ALL: [Level; 4] = [Level::None, Level::View, Level::Edit, Level::Admin];
}

impl TryFrom<u8> for Level {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_ordinal(value).ok_or(CoreError::InvalidLevel(value))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
