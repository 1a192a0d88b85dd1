//! The state holder behind every Roster front end.

use std::sync::Arc;

use chrono::Duration;
use roster_model::{
    DateRange, Role, RoleDraft, RoleFilter, RoleId, SortConfig, SortKey,
    StatusFilter, Timestamp, User, UserDraft, UserFilters, UserId, UserQuery,
};
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::forms::{RoleForm, UserForm};
use crate::ids::IdStrategy;
use crate::persistence::{
    Hydrated, ROLES_KEY, SnapshotSource, USERS_KEY, load_collection,
    save_collection,
};
use crate::seed::{seed_roles, seed_users};
use crate::storage::KeyValueStorage;
use crate::view::{DEFAULT_RECENT_WINDOW_DAYS, ViewCache, derive_users};

/// Behaviour switches for a [`Dashboard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    pub id_strategy: IdStrategy,
    /// Also snapshot roles under [`ROLES_KEY`] and restore them on load.
    pub persist_roles: bool,
    /// Width of the "recent" creation-date filter.
    pub recent_window: Duration,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            id_strategy: IdStrategy::default(),
            persist_roles: false,
            recent_window: Duration::days(DEFAULT_RECENT_WINDOW_DAYS as i64),
        }
    }
}

/// Users, roles, the list query, and the two edit forms.
///
/// Every user mutation rewrites the full user snapshot in storage after the
/// in-memory change is applied. Role mutations stay in memory unless
/// [`DashboardOptions::persist_roles`] is set.
pub struct Dashboard {
    users: Vec<User>,
    roles: Vec<Role>,
    query: UserQuery,
    show_filters: bool,
    pub user_form: UserForm,
    pub role_form: RoleForm,
    storage: Box<dyn KeyValueStorage>,
    clock: Arc<dyn Clock>,
    options: DashboardOptions,
    revision: u64,
    view: Option<ViewCache>,
    users_source: SnapshotSource,
    roles_source: SnapshotSource,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("users", &self.users.len())
            .field("roles", &self.roles.len())
            .field("query", &self.query)
            .field("revision", &self.revision)
            .field("options", &self.options)
            .finish()
    }
}

impl Dashboard {
    /// Hydrate from `storage`, falling back to the seed records.
    pub fn load<S>(storage: S, options: DashboardOptions) -> Self
    where
        S: KeyValueStorage + 'static,
    {
        Self::load_with_clock(storage, Arc::new(SystemClock), options)
    }

    pub fn load_with_clock<S>(
        storage: S,
        clock: Arc<dyn Clock>,
        options: DashboardOptions,
    ) -> Self
    where
        S: KeyValueStorage + 'static,
    {
        let users = load_collection(&storage, USERS_KEY, seed_users);
        let roles = if options.persist_roles {
            load_collection(&storage, ROLES_KEY, seed_roles)
        } else {
            Hydrated {
                items: seed_roles(),
                source: SnapshotSource::Absent,
            }
        };

        info!(
            users = users.items.len(),
            roles = roles.items.len(),
            users_source = ?users.source,
            "dashboard loaded"
        );

        Self {
            users: users.items,
            roles: roles.items,
            query: UserQuery::default(),
            show_filters: false,
            user_form: UserForm::default(),
            role_form: RoleForm::default(),
            storage: Box::new(storage),
            clock,
            options,
            revision: 0,
            view: None,
            users_source: users.source,
            roles_source: roles.source,
        }
    }

    pub fn options(&self) -> &DashboardOptions {
        &self.options
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn users_source(&self) -> SnapshotSource {
        self.users_source
    }

    pub fn roles_source(&self) -> SnapshotSource {
        self.roles_source
    }

    pub fn find_user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn find_role(&self, id: RoleId) -> Option<&Role> {
        self.roles.iter().find(|role| role.id == id)
    }

    /// Role names in display order, as offered by role pickers.
    pub fn role_names(&self) -> Vec<&str> {
        self.roles.iter().map(|role| role.name.as_str()).collect()
    }

    // ----- query -------------------------------------------------------

    pub fn query(&self) -> &UserQuery {
        &self.query
    }

    pub fn set_query(&mut self, query: UserQuery) {
        self.query = query;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.query.search = term.into();
    }

    pub fn set_filters(&mut self, filters: UserFilters) {
        self.query.filters = filters;
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.query.filters.status = status;
    }

    pub fn set_role_filter(&mut self, role: RoleFilter) {
        self.query.filters.role = role;
    }

    pub fn set_date_range(&mut self, range: DateRange) {
        self.query.filters.date_range = range;
    }

    /// Column-header click on `key`.
    pub fn sort_by(&mut self, key: SortKey) {
        self.query.sort.toggle(key);
    }

    pub fn set_sort(&mut self, sort: SortConfig) {
        self.query.sort = sort;
    }

    pub fn show_filters(&self) -> bool {
        self.show_filters
    }

    pub fn toggle_filters(&mut self) -> bool {
        self.show_filters = !self.show_filters;
        self.show_filters
    }

    /// The user list as currently filtered, searched and sorted.
    ///
    /// Recomputed only when the users or the query changed since the last
    /// call.
    pub fn visible_users(&mut self) -> &[User] {
        let fresh = self
            .view
            .as_ref()
            .is_some_and(|cache| cache.is_fresh(self.revision, &self.query));
        if !fresh {
            let users = derive_users(
                &self.users,
                &self.query,
                self.clock.now(),
                self.options.recent_window,
            );
            self.view = Some(ViewCache {
                revision: self.revision,
                query: self.query.clone(),
                users,
            });
        }
        self.view
            .as_ref()
            .map(|cache| cache.users.as_slice())
            .unwrap_or_default()
    }

    // ----- users -------------------------------------------------------

    /// Append a user built from `draft`; `last_login` is set to now.
    pub fn create_user(&mut self, draft: UserDraft) -> Result<User> {
        let id = self
            .options
            .id_strategy
            .next_id(self.users.iter().map(|user| user.id.get()));
        let user = User::from_draft(UserId(id), draft, self.now());
        self.users.push(user.clone());
        info!(id = %user.id, name = %user.name, "user created");
        self.users_changed()?;
        Ok(user)
    }

    /// Replace the editable fields of the user with `id`.
    ///
    /// Returns `None` (and writes nothing) if no such user exists.
    pub fn update_user(
        &mut self,
        id: UserId,
        draft: UserDraft,
    ) -> Result<Option<User>> {
        let now = self.now();
        let mut updated = None;
        for user in self.users.iter_mut().filter(|user| user.id == id) {
            user.apply_draft(draft.clone(), now);
            updated.get_or_insert_with(|| user.clone());
        }
        if updated.is_none() {
            warn!(%id, "update requested for unknown user");
            return Ok(None);
        }
        info!(%id, "user updated");
        self.users_changed()?;
        Ok(updated)
    }

    /// Remove the user with `id`; returns the removed record.
    pub fn delete_user(&mut self, id: UserId) -> Result<Option<User>> {
        let removed = self.find_user(id).cloned();
        if removed.is_none() {
            warn!(%id, "delete requested for unknown user");
            return Ok(None);
        }
        self.users.retain(|user| user.id != id);
        info!(%id, "user deleted");
        self.users_changed()?;
        Ok(removed)
    }

    /// Open the user form pre-filled with the user `id`.
    pub fn edit_user(&mut self, id: UserId) -> bool {
        match self.users.iter().find(|user| user.id == id) {
            Some(user) => {
                self.user_form.open_edit(user);
                true
            }
            None => false,
        }
    }

    /// Submit the user form: update when editing, create otherwise.
    pub fn submit_user_form(&mut self) -> Result<Option<User>> {
        match self.user_form.take_submission() {
            (Some(id), draft) => self.update_user(id, draft),
            (None, draft) => self.create_user(draft).map(Some),
        }
    }

    // ----- roles -------------------------------------------------------

    pub fn create_role(&mut self, draft: RoleDraft) -> Result<Role> {
        let id = self
            .options
            .id_strategy
            .next_id(self.roles.iter().map(|role| role.id.get()));
        let role = Role::from_draft(RoleId(id), draft);
        self.roles.push(role.clone());
        info!(id = %role.id, name = %role.name, "role created");
        self.roles_changed()?;
        Ok(role)
    }

    pub fn update_role(
        &mut self,
        id: RoleId,
        draft: RoleDraft,
    ) -> Result<Option<Role>> {
        let mut updated = None;
        for role in self.roles.iter_mut().filter(|role| role.id == id) {
            role.apply_draft(draft.clone());
            updated.get_or_insert_with(|| role.clone());
        }
        if updated.is_none() {
            warn!(%id, "update requested for unknown role");
            return Ok(None);
        }
        info!(%id, "role updated");
        self.roles_changed()?;
        Ok(updated)
    }

    /// Remove the role with `id`. Users labelled with its name keep the label.
    pub fn delete_role(&mut self, id: RoleId) -> Result<Option<Role>> {
        let removed = self.find_role(id).cloned();
        if removed.is_none() {
            warn!(%id, "delete requested for unknown role");
            return Ok(None);
        }
        self.roles.retain(|role| role.id != id);
        info!(%id, "role deleted");
        self.roles_changed()?;
        Ok(removed)
    }

    pub fn edit_role(&mut self, id: RoleId) -> bool {
        match self.roles.iter().find(|role| role.id == id) {
            Some(role) => {
                self.role_form.open_edit(role);
                true
            }
            None => false,
        }
    }

    pub fn submit_role_form(&mut self) -> Result<Option<Role>> {
        match self.role_form.take_submission() {
            (Some(id), draft) => self.update_role(id, draft),
            (None, draft) => self.create_role(draft).map(Some),
        }
    }

    // ----- sync --------------------------------------------------------

    /// Write the fallback records back when the stored snapshot was missing
    /// or malformed, so storage matches what the panel shows. An unreadable
    /// snapshot is left alone. Returns whether anything was written.
    ///
    /// Interactive front ends call this once when they open; one-shot reads
    /// leave storage untouched.
    pub fn persist_fallbacks(&mut self) -> Result<bool> {
        let mut wrote = false;
        if rewrite_on_open(self.users_source) {
            save_collection(&*self.storage, USERS_KEY, &self.users)
                .inspect_err(|err| {
                    warn!(error = %err, "failed to persist users");
                })?;
            info!(source = ?self.users_source, "wrote initial user snapshot");
            wrote = true;
        }
        if self.options.persist_roles && rewrite_on_open(self.roles_source) {
            save_collection(&*self.storage, ROLES_KEY, &self.roles)
                .inspect_err(|err| {
                    warn!(error = %err, "failed to persist roles");
                })?;
            wrote = true;
        }
        Ok(wrote)
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now())
    }

    fn users_changed(&mut self) -> Result<()> {
        self.revision += 1;
        save_collection(&*self.storage, USERS_KEY, &self.users)
            .inspect_err(|err| {
                warn!(error = %err, "failed to persist users");
            })
    }

    fn roles_changed(&mut self) -> Result<()> {
        if !self.options.persist_roles {
            return Ok(());
        }
        save_collection(&*self.storage, ROLES_KEY, &self.roles)
            .inspect_err(|err| {
                warn!(error = %err, "failed to persist roles");
            })
    }
}

fn rewrite_on_open(source: SnapshotSource) -> bool {
    matches!(source, SnapshotSource::Absent | SnapshotSource::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::StorageError;
    use crate::storage::{MemoryStorage, MockKeyValueStorage};
    use chrono::{TimeZone, Utc};
    use roster_model::{Permission, UserStatus};

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 4, 1, 8, 30, 0).unwrap())
    }

    fn dashboard(storage: MemoryStorage) -> (Dashboard, FixedClock) {
        let clock = clock();
        let dashboard = Dashboard::load_with_clock(
            storage,
            Arc::new(clock.clone()),
            DashboardOptions::default(),
        );
        (dashboard, clock)
    }

    #[test]
    fn create_sets_last_login_to_now_and_persists() {
        let storage = MemoryStorage::new();
        let (mut dash, clock) = dashboard(storage.clone());
        let user = dash
            .create_user(UserDraft::new("Ann", "ann@x", "user", UserStatus::Active))
            .unwrap();
        assert_eq!(user.id, UserId(3));
        assert_eq!(user.last_login.to_datetime(), clock.now());
        assert!(user.created_at.is_none());

        let raw = storage.get_item(USERS_KEY).unwrap().unwrap();
        let stored: Vec<User> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[2], user);
    }

    #[test]
    fn update_unknown_id_is_a_no_op() {
        let storage = MemoryStorage::new();
        let (mut dash, _) = dashboard(storage.clone());
        let out = dash
            .update_user(UserId(99), UserDraft::default())
            .unwrap();
        assert!(out.is_none());
        assert!(storage.get_item(USERS_KEY).unwrap().is_none());
    }

    #[test]
    fn view_is_memoized_until_inputs_change() {
        let (mut dash, clock) = dashboard(MemoryStorage::new());
        dash.set_date_range(DateRange::Recent);
        clock.set(Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap());
        assert_eq!(dash.visible_users().len(), 2);

        // Time passing alone does not recompute.
        clock.set(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(dash.visible_users().len(), 2);

        // A query change does.
        dash.set_search("");
        dash.sort_by(SortKey::Email);
        assert!(dash.visible_users().is_empty());
    }

    #[test]
    fn view_recomputes_after_mutation() {
        let (mut dash, _) = dashboard(MemoryStorage::new());
        assert_eq!(dash.visible_users().len(), 2);
        dash.delete_user(UserId(1)).unwrap();
        let names: Vec<_> =
            dash.visible_users().iter().map(|u| u.name.clone()).collect();
        assert_eq!(names, ["Jane Smith"]);
    }

    #[test]
    fn roles_are_not_persisted_by_default() {
        let storage = MemoryStorage::new();
        let (mut dash, _) = dashboard(storage.clone());
        dash.create_role(RoleDraft::new("viewer", [Permission::Read], ""))
            .unwrap();
        assert!(storage.get_item(ROLES_KEY).unwrap().is_none());

        let reloaded = Dashboard::load(storage, DashboardOptions::default());
        assert_eq!(reloaded.roles().len(), 2);
    }

    #[test]
    fn roles_round_trip_when_enabled() {
        let storage = MemoryStorage::new();
        let options = DashboardOptions {
            persist_roles: true,
            ..Default::default()
        };
        let mut dash = Dashboard::load(storage.clone(), options);
        dash.create_role(RoleDraft::new("viewer", [Permission::Read], "ro"))
            .unwrap();

        let reloaded = Dashboard::load(storage, options);
        assert_eq!(reloaded.roles_source(), SnapshotSource::Stored);
        assert_eq!(reloaded.role_names(), ["admin", "user", "viewer"]);
    }

    #[test]
    fn separate_editing_ids_for_users_and_roles() {
        let (mut dash, _) = dashboard(MemoryStorage::new());
        assert!(dash.edit_user(UserId(1)));
        assert!(dash.edit_role(RoleId(2)));
        dash.role_form.draft.description = "Read only".into();
        let role = dash.submit_role_form().unwrap().unwrap();
        assert_eq!(role.id, RoleId(2));
        // The user dialog is still editing user 1.
        assert_eq!(dash.user_form.editing, Some(UserId(1)));
        assert_eq!(dash.find_user(UserId(1)).unwrap().name, "John Doe");
    }

    #[test]
    fn write_failure_is_reported_after_memory_change() {
        let mut storage = MockKeyValueStorage::new();
        storage.expect_get_item().returning(|_| Ok(None));
        storage
            .expect_set_item()
            .times(1)
            .returning(|_, _| Err(StorageError::Backend("disk full".into())));

        let mut dash = Dashboard::load_with_clock(
            storage,
            Arc::new(clock()),
            DashboardOptions::default(),
        );
        let err = dash.delete_user(UserId(2)).unwrap_err();
        assert!(matches!(err, StorageError::Backend(_)));
        assert_eq!(dash.users().len(), 1);
    }

    #[test]
    fn unreadable_storage_falls_back_to_seeds() {
        let mut storage = MockKeyValueStorage::new();
        storage
            .expect_get_item()
            .returning(|_| Err(StorageError::Backend("locked".into())));
        let dash = Dashboard::load(storage, DashboardOptions::default());
        assert_eq!(dash.users_source(), SnapshotSource::Unreadable);
        assert_eq!(dash.users(), seed_users().as_slice());
    }

    #[test]
    fn opening_rewrites_a_malformed_snapshot_with_seeds() {
        let storage = MemoryStorage::with_item(USERS_KEY, "{not json");
        let (mut dash, _) = dashboard(storage.clone());
        assert_eq!(dash.users_source(), SnapshotSource::Malformed);

        assert!(dash.persist_fallbacks().unwrap());
        let raw = storage.get_item(USERS_KEY).unwrap().unwrap();
        let stored: Vec<User> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, seed_users());
        assert_eq!(storage.keys(), ["users"]);
    }

    #[test]
    fn opening_leaves_a_stored_snapshot_untouched() {
        let raw = serde_json::to_string_pretty(&seed_users()[..1]).unwrap();
        let storage = MemoryStorage::with_item(USERS_KEY, raw.clone());
        let (mut dash, _) = dashboard(storage.clone());

        assert!(!dash.persist_fallbacks().unwrap());
        assert_eq!(storage.get_item(USERS_KEY).unwrap(), Some(raw));
    }

    #[test]
    fn opening_never_overwrites_unreadable_storage() {
        let mut storage = MockKeyValueStorage::new();
        storage
            .expect_get_item()
            .returning(|_| Err(StorageError::Backend("locked".into())));
        storage.expect_set_item().never();
        let mut dash = Dashboard::load(storage, DashboardOptions::default());
        assert!(!dash.persist_fallbacks().unwrap());
    }
}
