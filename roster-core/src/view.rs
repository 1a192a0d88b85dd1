//! The filtered, searched and sorted projection of the user list.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use roster_model::{DateRange, SortDirection, SortKey, User, UserQuery};
use tracing::debug;

/// Width of the "recent" creation-date window unless configured otherwise.
pub const DEFAULT_RECENT_WINDOW_DAYS: u32 = 30;

/// Apply `query` to `users`.
///
/// Filters run in order status, role, date range, search; the survivors are
/// stably sorted by the query's sort key. `now` anchors the recent window, so
/// the same query evaluated later can drop records that aged out.
pub fn derive_users(
    users: &[User],
    query: &UserQuery,
    now: DateTime<Utc>,
    recent_window: Duration,
) -> Vec<User> {
    let filters = &query.filters;
    let threshold = now
        .checked_sub_signed(recent_window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let needle = query.search.to_lowercase();

    let mut result: Vec<User> = users
        .iter()
        .filter(|user| filters.status.matches(user.status))
        .filter(|user| filters.role.matches(&user.role))
        .filter(|user| match filters.date_range {
            DateRange::All => true,
            DateRange::Recent => user
                .created_at
                .is_some_and(|created| *created.as_datetime() >= threshold),
        })
        .filter(|user| {
            needle.is_empty()
                || user.name.to_lowercase().contains(&needle)
                || user.email.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();

    let sort = query.sort;
    result.sort_by(|a, b| {
        let ordering = compare_by(a, b, sort.key);
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });

    debug!(
        total = users.len(),
        visible = result.len(),
        sort = %sort.key,
        "derived user view"
    );
    result
}

/// Three-way comparison of two users on one field. Records without a
/// creation date order before those with one.
pub fn compare_by(a: &User, b: &User, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => a.id.cmp(&b.id),
        SortKey::Name => a.name.cmp(&b.name),
        SortKey::Email => a.email.cmp(&b.email),
        SortKey::Role => a.role.cmp(&b.role),
        SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
        SortKey::LastLogin => a.last_login.cmp(&b.last_login),
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

/// Last derived view and the inputs it was computed from.
#[derive(Debug, Clone)]
pub(crate) struct ViewCache {
    pub(crate) revision: u64,
    pub(crate) query: UserQuery,
    pub(crate) users: Vec<User>,
}

impl ViewCache {
    pub(crate) fn is_fresh(&self, revision: u64, query: &UserQuery) -> bool {
        self.revision == revision && self.query == *query
    }
}
