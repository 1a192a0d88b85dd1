//! End-to-end behaviour of the dashboard over real storage backends.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use roster_core::model::{
    Permission, RoleDraft, RoleFilter, RoleId, SortDirection, SortKey,
    StatusFilter, User, UserDraft, UserId, UserStatus,
};
use roster_core::seed::seed_users;
use roster_core::{
    Dashboard, DashboardOptions, FileStorage, FixedClock, IdStrategy,
    KeyValueStorage, MemoryStorage, SnapshotSource, USERS_KEY,
};

fn fixed_clock() -> FixedClock {
    FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 25, 14, 5, 9).unwrap())
}

fn memory_dashboard() -> (Dashboard, MemoryStorage, FixedClock) {
    let storage = MemoryStorage::new();
    let clock = fixed_clock();
    let dashboard = Dashboard::load_with_clock(
        storage.clone(),
        Arc::new(clock.clone()),
        DashboardOptions::default(),
    );
    (dashboard, storage, clock)
}

fn names(users: &[User]) -> Vec<&str> {
    users.iter().map(|user| user.name.as_str()).collect()
}

#[test]
fn absent_storage_starts_with_the_seed_users() {
    let (dashboard, _, _) = memory_dashboard();
    assert_eq!(dashboard.users_source(), SnapshotSource::Absent);
    assert_eq!(dashboard.users(), seed_users().as_slice());
    assert_eq!(dashboard.role_names(), ["admin", "user"]);
}

#[test]
fn created_user_logs_in_at_creation_time() {
    let (mut dashboard, _, clock) = memory_dashboard();
    clock.advance(Duration::minutes(3));
    let user = dashboard
        .create_user(UserDraft::new(
            "Alice",
            "alice@example.com",
            "user",
            UserStatus::Inactive,
        ))
        .expect("create user");

    assert_eq!(
        user.last_login.to_datetime(),
        Utc.with_ymd_and_hms(2024, 3, 25, 14, 8, 9).unwrap()
    );
    assert_eq!(dashboard.users().last(), Some(&user));
}

#[test]
fn update_keeps_id_and_replaces_fields() {
    let (mut dashboard, _, _) = memory_dashboard();
    let draft = UserDraft::new(
        "Johnny",
        "johnny@example.com",
        "user",
        UserStatus::Inactive,
    );
    let updated = dashboard
        .update_user(UserId(1), draft.clone())
        .expect("update user")
        .expect("user 1 exists");

    assert_eq!(updated.id, UserId(1));
    assert_eq!(updated.to_draft(), draft);
    assert_eq!(dashboard.find_user(UserId(2)).unwrap().name, "Jane Smith");
}

#[test]
fn delete_removes_only_the_given_id() {
    let (mut dashboard, _, _) = memory_dashboard();
    let removed = dashboard
        .delete_user(UserId(1))
        .expect("delete user")
        .expect("user 1 exists");
    assert_eq!(removed.name, "John Doe");
    assert_eq!(names(dashboard.users()), ["Jane Smith"]);

    assert!(dashboard.delete_user(UserId(1)).expect("delete").is_none());
}

#[test]
fn status_filter_and_all() {
    let (mut dashboard, _, _) = memory_dashboard();
    dashboard
        .create_user(UserDraft::new("Idle", "idle@x", "user", UserStatus::Inactive))
        .expect("create user");

    dashboard.set_status_filter(StatusFilter::Only(UserStatus::Active));
    assert!(
        dashboard
            .visible_users()
            .iter()
            .all(|user| user.status == UserStatus::Active)
    );
    assert_eq!(dashboard.visible_users().len(), 2);

    dashboard.set_status_filter(StatusFilter::All);
    assert_eq!(dashboard.visible_users().len(), 3);
}

#[test]
fn role_filter_admin_returns_john() {
    let (mut dashboard, _, _) = memory_dashboard();
    dashboard.set_role_filter(RoleFilter::Named("admin".into()));
    assert_eq!(names(dashboard.visible_users()), ["John Doe"]);
}

#[test]
fn search_matches_name_or_email_case_insensitively() {
    let (mut dashboard, _, _) = memory_dashboard();
    dashboard.set_search("JANE");
    assert_eq!(names(dashboard.visible_users()), ["Jane Smith"]);

    dashboard.set_search("Example.COM");
    assert_eq!(names(dashboard.visible_users()), ["Jane Smith", "John Doe"]);
}

#[test]
fn sort_toggle_reverses_then_resets_on_new_key() {
    let (mut dashboard, _, _) = memory_dashboard();
    assert_eq!(dashboard.query().sort.key, SortKey::Name);

    dashboard.sort_by(SortKey::Name);
    assert_eq!(dashboard.query().sort.direction, SortDirection::Descending);
    assert_eq!(names(dashboard.visible_users()), ["John Doe", "Jane Smith"]);

    dashboard.sort_by(SortKey::Name);
    assert_eq!(dashboard.query().sort.direction, SortDirection::Ascending);

    dashboard.sort_by(SortKey::Name);
    dashboard.sort_by(SortKey::Email);
    assert_eq!(dashboard.query().sort.key, SortKey::Email);
    assert_eq!(dashboard.query().sort.direction, SortDirection::Ascending);
}

#[test]
fn role_form_permission_toggle_round_trips() {
    let (mut dashboard, _, _) = memory_dashboard();
    dashboard.role_form.open_new();
    dashboard.role_form.draft =
        RoleDraft::new("viewer", [Permission::Read], "Read only");
    dashboard.role_form.toggle_permission(Permission::Write);
    dashboard.role_form.toggle_permission(Permission::Write);

    let role = dashboard
        .submit_role_form()
        .expect("submit role")
        .expect("role created");
    assert_eq!(role.id, RoleId(3));
    assert_eq!(role.permissions.as_slice(), &[Permission::Read]);
}

#[test]
fn count_plus_one_can_reuse_an_id_after_delete() {
    let (mut dashboard, _, _) = memory_dashboard();
    dashboard.delete_user(UserId(1)).expect("delete user");
    let user = dashboard
        .create_user(UserDraft::default())
        .expect("create user");
    assert_eq!(user.id, UserId(2));
    assert_eq!(
        dashboard
            .users()
            .iter()
            .filter(|u| u.id == UserId(2))
            .count(),
        2
    );
}

#[test]
fn max_plus_one_stays_unique() {
    let options = DashboardOptions {
        id_strategy: IdStrategy::MaxPlusOne,
        ..Default::default()
    };
    let mut dashboard = Dashboard::load(MemoryStorage::new(), options);
    dashboard.delete_user(UserId(1)).expect("delete user");
    let user = dashboard
        .create_user(UserDraft::default())
        .expect("create user");
    assert_eq!(user.id, UserId(3));
}

#[test]
fn malformed_snapshot_is_replaced_by_seeds() {
    let storage = MemoryStorage::with_item(USERS_KEY, "[{\"id\":\"oops\"}]");
    let dashboard = Dashboard::load(storage, DashboardOptions::default());
    assert_eq!(dashboard.users_source(), SnapshotSource::Malformed);
    assert_eq!(dashboard.users(), seed_users().as_slice());
}

#[test]
fn file_storage_survives_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let clock = fixed_clock();

    let mut first = Dashboard::load_with_clock(
        FileStorage::new(dir.path()),
        Arc::new(clock.clone()),
        DashboardOptions::default(),
    );
    first
        .create_user(UserDraft::new(
            "Carol",
            "carol@example.com",
            "admin",
            UserStatus::Active,
        ))
        .expect("create user");
    first.delete_user(UserId(2)).expect("delete user");
    drop(first);

    let raw = FileStorage::new(dir.path())
        .get_item(USERS_KEY)
        .expect("read snapshot")
        .expect("snapshot written");
    assert!(raw.contains("\"lastLogin\":\"2024-03-25T14:05:09.000Z\""));

    let second = Dashboard::load(
        FileStorage::new(dir.path()),
        DashboardOptions::default(),
    );
    assert_eq!(second.users_source(), SnapshotSource::Stored);
    assert_eq!(names(second.users()), ["John Doe", "Carol"]);
    assert!(second.find_user(UserId(3)).unwrap().created_at.is_none());
}

#[test]
fn role_update_and_delete_leave_user_labels_alone() {
    let (mut dashboard, storage, _) = memory_dashboard();
    let mut draft = dashboard.find_role(RoleId(1)).unwrap().to_draft();
    draft.description = "Everything".into();
    let updated = dashboard
        .update_role(RoleId(1), draft)
        .expect("update role")
        .expect("role exists");
    assert_eq!(updated.name, "admin");
    assert_eq!(updated.description, "Everything");

    let removed = dashboard
        .delete_role(RoleId(1))
        .expect("delete role")
        .expect("role exists");
    assert_eq!(removed.name, "admin");
    assert_eq!(dashboard.role_names(), ["user"]);
    assert_eq!(dashboard.find_user(UserId(1)).unwrap().role, "admin");
    // Role changes are not written unless enabled.
    assert_eq!(storage.keys(), Vec::<String>::new());
}
