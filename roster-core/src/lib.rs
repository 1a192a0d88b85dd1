//! Core library for Roster.
//!
//! This crate holds the state of the user and role admin panel: the two
//! collections, their create/update/delete handlers, the draft forms used to
//! edit them, the filtered/searched/sorted user view, and the sync of the user
//! collection into a key-value storage. Front ends (the `rosterctl` CLI and
//! TUI) own a [`Dashboard`] and drive it by reference.

pub mod clock;
pub mod dashboard;
pub mod error;
pub mod forms;
pub mod ids;
pub mod persistence;
pub mod seed;
pub mod storage;
pub mod view;

pub use clock::{Clock, FixedClock, SystemClock};
pub use dashboard::{Dashboard, DashboardOptions};
pub use error::{Result, StorageError};
pub use forms::{RoleForm, UserForm};
pub use ids::IdStrategy;
pub use persistence::{Hydrated, ROLES_KEY, SnapshotSource, USERS_KEY};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use view::{DEFAULT_RECENT_WINDOW_DAYS, derive_users};

pub use roster_model as model;
