//! Snapshot load/save of whole collections.
//!
//! A collection is written as one JSON array under a single key, overwriting
//! whatever was there. There is no versioning: anything that fails to parse
//! is treated like a missing snapshot and replaced by the fallback records.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::Result;
use crate::storage::KeyValueStorage;

/// Storage key of the user snapshot.
pub const USERS_KEY: &str = "users";
/// Storage key of the role snapshot (only written when role persistence is
/// enabled).
pub const ROLES_KEY: &str = "roles";

/// Where a hydrated collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Parsed from storage.
    Stored,
    /// Nothing (or `null`) stored; fallback used.
    Absent,
    /// Stored value did not parse; fallback used.
    Malformed,
    /// Storage could not be read; fallback used.
    Unreadable,
}

impl SnapshotSource {
    pub fn is_fallback(&self) -> bool {
        !matches!(self, SnapshotSource::Stored)
    }
}

/// A collection read at startup together with its provenance.
#[derive(Debug, Clone)]
pub struct Hydrated<T> {
    pub items: Vec<T>,
    pub source: SnapshotSource,
}

/// Read the collection under `key`, or `fallback()` if nothing usable is
/// stored.
pub fn load_collection<T, F>(
    storage: &dyn KeyValueStorage,
    key: &str,
    fallback: F,
) -> Hydrated<T>
where
    T: DeserializeOwned,
    F: FnOnce() -> Vec<T>,
{
    let raw = match storage.get_item(key) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(key, error = %err, "snapshot unreadable; using defaults");
            return Hydrated {
                items: fallback(),
                source: SnapshotSource::Unreadable,
            };
        }
    };

    let Some(raw) = raw else {
        debug!(key, "no snapshot stored; using defaults");
        return Hydrated {
            items: fallback(),
            source: SnapshotSource::Absent,
        };
    };

    match serde_json::from_str::<Option<Vec<T>>>(&raw) {
        Ok(Some(items)) => {
            debug!(key, count = items.len(), "restored snapshot");
            Hydrated {
                items,
                source: SnapshotSource::Stored,
            }
        }
        Ok(None) => Hydrated {
            items: fallback(),
            source: SnapshotSource::Absent,
        },
        Err(err) => {
            warn!(key, error = %err, "snapshot malformed; using defaults");
            Hydrated {
                items: fallback(),
                source: SnapshotSource::Malformed,
            }
        }
    }
}

/// Serialize `items` and overwrite the value under `key`.
pub fn save_collection<T: Serialize>(
    storage: &dyn KeyValueStorage,
    key: &str,
    items: &[T],
) -> Result<()> {
    let raw = serde_json::to_string(items)?;
    storage.set_item(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_users;
    use crate::storage::MemoryStorage;
    use roster_model::User;

    #[test]
    fn absent_snapshot_falls_back() {
        let storage = MemoryStorage::new();
        let loaded: Hydrated<User> =
            load_collection(&storage, USERS_KEY, seed_users);
        assert_eq!(loaded.source, SnapshotSource::Absent);
        assert_eq!(loaded.items, seed_users());
    }

    #[test]
    fn null_snapshot_counts_as_absent() {
        let storage = MemoryStorage::with_item(USERS_KEY, "null");
        let loaded: Hydrated<User> =
            load_collection(&storage, USERS_KEY, seed_users);
        assert_eq!(loaded.source, SnapshotSource::Absent);
        assert_eq!(loaded.items.len(), 2);
    }

    #[test]
    fn malformed_snapshot_falls_back() {
        let storage = MemoryStorage::with_item(USERS_KEY, "{not json");
        let loaded: Hydrated<User> =
            load_collection(&storage, USERS_KEY, seed_users);
        assert_eq!(loaded.source, SnapshotSource::Malformed);
        assert_eq!(loaded.items, seed_users());
    }

    #[test]
    fn empty_array_is_respected() {
        let storage = MemoryStorage::with_item(USERS_KEY, "[]");
        let loaded: Hydrated<User> =
            load_collection(&storage, USERS_KEY, seed_users);
        assert_eq!(loaded.source, SnapshotSource::Stored);
        assert!(loaded.items.is_empty());
    }

    #[test]
    fn save_then_load_uses_wire_field_names() {
        let storage = MemoryStorage::new();
        save_collection(&storage, USERS_KEY, &seed_users()).unwrap();
        let raw = storage.get_item(USERS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"lastLogin\""));
        assert!(raw.contains("\"createdAt\""));
        let loaded: Hydrated<User> =
            load_collection(&storage, USERS_KEY, Vec::new);
        assert_eq!(loaded.items, seed_users());
    }
}
