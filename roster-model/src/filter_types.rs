use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::user::UserStatus;

/// Status filter of the user list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(UserStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: UserStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }

    /// Next option in the order the filter panel cycles through.
    pub fn cycle(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Only(UserStatus::Active),
            StatusFilter::Only(UserStatus::Active) => {
                StatusFilter::Only(UserStatus::Inactive)
            }
            StatusFilter::Only(UserStatus::Inactive) => StatusFilter::All,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => write!(f, "{status}"),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

/// Role filter of the user list; compares role names exactly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RoleFilter {
    #[default]
    All,
    Named(String),
}

impl RoleFilter {
    pub fn matches(&self, role: &str) -> bool {
        match self {
            RoleFilter::All => true,
            RoleFilter::Named(name) => name == role,
        }
    }
}

impl fmt::Display for RoleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleFilter::All => f.write_str("all"),
            RoleFilter::Named(name) => f.write_str(name),
        }
    }
}

/// Creation-date filter of the user list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    #[default]
    All,
    /// Created within the recent window (30 days unless configured).
    Recent,
}

impl DateRange {
    pub fn cycle(self) -> Self {
        match self {
            DateRange::All => DateRange::Recent,
            DateRange::Recent => DateRange::All,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRange::All => f.write_str("all"),
            DateRange::Recent => f.write_str("recent"),
        }
    }
}

impl std::str::FromStr for DateRange {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(DateRange::All),
            "recent" => Ok(DateRange::Recent),
            _ => Err(ModelError::InvalidDateRange(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserFilters {
    pub status: StatusFilter,
    pub role: RoleFilter,
    pub date_range: DateRange,
}

impl UserFilters {
    pub fn is_unfiltered(&self) -> bool {
        *self == UserFilters::default()
    }
}

/// User field the list can be ordered by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Id,
    #[default]
    Name,
    Email,
    Role,
    Status,
    LastLogin,
    CreatedAt,
}

impl SortKey {
    pub fn all() -> &'static [SortKey] {
        use SortKey::*;
        &[Id, Name, Email, Role, Status, LastLogin, CreatedAt]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Name => "name",
            SortKey::Email => "email",
            SortKey::Role => "role",
            SortKey::Status => "status",
            SortKey::LastLogin => "lastLogin",
            SortKey::CreatedAt => "createdAt",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "id" => Ok(SortKey::Id),
            "name" => Ok(SortKey::Name),
            "email" => Ok(SortKey::Email),
            "role" => Ok(SortKey::Role),
            "status" => Ok(SortKey::Status),
            "lastlogin" => Ok(SortKey::LastLogin),
            "createdat" => Ok(SortKey::CreatedAt),
            _ => Err(ModelError::InvalidSortKey(s.to_string())),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// Active sort column and direction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Column-header click: the active ascending key flips to descending,
    /// anything else selects `key` ascending.
    pub fn toggle(&mut self, key: SortKey) {
        let direction = if self.key == key
            && self.direction == SortDirection::Ascending
        {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        *self = SortConfig { key, direction };
    }
}

/// Every input of the derived user list besides the users themselves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserQuery {
    pub filters: UserFilters,
    pub search: String,
    pub sort: SortConfig,
}
