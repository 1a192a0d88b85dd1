use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::ids::RoleId;

/// The fixed permission vocabulary a role can carry.
///
/// Permissions are labels. Nothing in Roster checks them against what a
/// user is allowed to do.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
    Delete,
}

impl Permission {
    /// All permissions in display order.
    pub fn all() -> &'static [Permission] {
        &[Permission::Read, Permission::Write, Permission::Delete]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "read" => Ok(Permission::Read),
            "write" => Ok(Permission::Write),
            "delete" => Ok(Permission::Delete),
            _ => Err(ModelError::InvalidPermission(s.to_string())),
        }
    }
}

/// Insertion-ordered set of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Permission>", into = "Vec<Permission>")]
pub struct PermissionSet(Vec<Permission>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// Append `permission` unless already present.
    pub fn insert(&mut self, permission: Permission) -> bool {
        if self.contains(permission) {
            return false;
        }
        self.0.push(permission);
        true
    }

    pub fn remove(&mut self, permission: Permission) -> bool {
        let before = self.0.len();
        self.0.retain(|p| *p != permission);
        before != self.0.len()
    }

    /// Set membership of `permission` to `checked`, as a checkbox does.
    pub fn set(&mut self, permission: Permission, checked: bool) {
        if checked {
            self.insert(permission);
        } else {
            self.remove(permission);
        }
    }

    /// Flip membership of `permission`; returns whether it is now present.
    pub fn toggle(&mut self, permission: Permission) -> bool {
        let checked = !self.contains(permission);
        self.set(permission, checked);
        checked
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[Permission] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Permission>> for PermissionSet {
    fn from(value: Vec<Permission>) -> Self {
        value.into_iter().collect()
    }
}

impl From<PermissionSet> for Vec<Permission> {
    fn from(value: PermissionSet) -> Self {
        value.0
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut set = PermissionSet::new();
        for permission in iter {
            set.insert(permission);
        }
        set
    }
}

/// A named bundle of permissions users can be labelled with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub permissions: PermissionSet,
    pub description: String,
}

impl Role {
    pub fn from_draft(id: RoleId, draft: RoleDraft) -> Self {
        Self {
            id,
            name: draft.name,
            permissions: draft.permissions,
            description: draft.description,
        }
    }

    pub fn apply_draft(&mut self, draft: RoleDraft) {
        self.name = draft.name;
        self.permissions = draft.permissions;
        self.description = draft.description;
    }

    pub fn to_draft(&self) -> RoleDraft {
        RoleDraft {
            name: self.name.clone(),
            permissions: self.permissions.clone(),
            description: self.description.clone(),
        }
    }
}

/// Editable role fields as collected by a form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleDraft {
    pub name: String,
    pub permissions: PermissionSet,
    pub description: String,
}

impl RoleDraft {
    pub fn new(
        name: impl Into<String>,
        permissions: impl IntoIterator<Item = Permission>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            permissions: permissions.into_iter().collect(),
            description: description.into(),
        }
    }
}
