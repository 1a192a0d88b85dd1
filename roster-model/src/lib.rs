//! Core data model definitions shared across Roster crates.
#![allow(missing_docs)]

pub mod error;
pub mod filter_types;
pub mod ids;
pub mod role;
pub mod timestamp;
pub mod user;

// Intentionally curated re-exports for downstream consumers.
pub use error::{ModelError, Result as ModelResult};
pub use filter_types::{
    DateRange, RoleFilter, SortConfig, SortDirection, SortKey, StatusFilter,
    UserFilters, UserQuery,
};
pub use ids::{RoleId, UserId};
pub use role::{Permission, PermissionSet, Role, RoleDraft};
pub use timestamp::Timestamp;
pub use user::{User, UserDraft, UserStatus};
