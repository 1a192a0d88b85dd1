//! Draft state of the add/edit dialogs.
//!
//! Users and roles each track their own editing id, so an open role dialog
//! can never submit into a user record with the same number.

use roster_model::{Permission, Role, RoleDraft, RoleId, User, UserDraft, UserId};

/// The add/edit user dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub draft: UserDraft,
    pub editing: Option<UserId>,
    pub open: bool,
}

impl UserForm {
    /// Open an empty form for a new user.
    pub fn open_new(&mut self) {
        *self = UserForm {
            open: true,
            ..Default::default()
        };
    }

    /// Open the form pre-filled with `user`.
    pub fn open_edit(&mut self, user: &User) {
        *self = UserForm {
            draft: user.to_draft(),
            editing: Some(user.id),
            open: true,
        };
    }

    /// Close without submitting; the draft is discarded.
    pub fn cancel(&mut self) {
        *self = UserForm::default();
    }

    /// Close the form and hand back what should be submitted.
    pub fn take_submission(&mut self) -> (Option<UserId>, UserDraft) {
        let form = std::mem::take(self);
        (form.editing, form.draft)
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn title(&self) -> &'static str {
        if self.is_editing() {
            "Edit User"
        } else {
            "Add New User"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() {
            "Update User"
        } else {
            "Add User"
        }
    }
}

/// The add/edit role dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleForm {
    pub draft: RoleDraft,
    pub editing: Option<RoleId>,
    pub open: bool,
}

impl RoleForm {
    pub fn open_new(&mut self) {
        *self = RoleForm {
            open: true,
            ..Default::default()
        };
    }

    pub fn open_edit(&mut self, role: &Role) {
        *self = RoleForm {
            draft: role.to_draft(),
            editing: Some(role.id),
            open: true,
        };
    }

    pub fn cancel(&mut self) {
        *self = RoleForm::default();
    }

    pub fn take_submission(&mut self) -> (Option<RoleId>, RoleDraft) {
        let form = std::mem::take(self);
        (form.editing, form.draft)
    }

    /// Checkbox click on a permission.
    pub fn toggle_permission(&mut self, permission: Permission) -> bool {
        self.draft.permissions.toggle(permission)
    }

    pub fn set_permission(&mut self, permission: Permission, checked: bool) {
        self.draft.permissions.set(permission, checked);
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn title(&self) -> &'static str {
        if self.is_editing() {
            "Edit Role"
        } else {
            "Add New Role"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() {
            "Update Role"
        } else {
            "Add Role"
        }
    }
}
