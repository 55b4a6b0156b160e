use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GuardError;

/// Stable identifier of a guild member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u64);

impl From<u64> for ActorId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Class of guarded action. Each category is limited independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Commands,
    CitySelection,
    RoleUpdates,
    ComboRoleUpdates,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Commands,
        Category::CitySelection,
        Category::RoleUpdates,
        Category::ComboRoleUpdates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Commands => "commands",
            Category::CitySelection => "city_selection",
            Category::RoleUpdates => "role_updates",
            Category::ComboRoleUpdates => "combo_role_updates",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| GuardError::UnknownCategory(s.to_string()))
    }
}
