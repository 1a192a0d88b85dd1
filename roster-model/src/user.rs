use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::ids::UserId;
use crate::timestamp::Timestamp;

/// Account status shown next to each user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl UserStatus {
    pub fn all() -> &'static [UserStatus] {
        &[UserStatus::Active, UserStatus::Inactive]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            _ => Err(ModelError::InvalidStatus(s.to_string())),
        }
    }
}

/// A managed user account.
///
/// `role` names a [`Role`](crate::Role) by convention only; nothing checks
/// that the role exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: UserStatus,
    /// Refreshed on every create and edit.
    pub last_login: Timestamp,
    /// Only present on seeded records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl User {
    /// Build a record from a submitted draft.
    pub fn from_draft(id: UserId, draft: UserDraft, now: Timestamp) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            role: draft.role,
            status: draft.status,
            last_login: now,
            created_at: None,
        }
    }

    /// Replace the editable fields, keeping id and creation time.
    pub fn apply_draft(&mut self, draft: UserDraft, now: Timestamp) {
        self.name = draft.name;
        self.email = draft.email;
        self.role = draft.role;
        self.status = draft.status;
        self.last_login = now;
    }

    /// The editable fields of this record, as the edit form pre-fills them.
    pub fn to_draft(&self) -> UserDraft {
        UserDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
            status: self.status,
        }
    }
}

/// Editable user fields as collected by a form. No field is required.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: UserStatus,
}

impl UserDraft {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
        status: UserStatus,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role: role.into(),
            status,
        }
    }
}
