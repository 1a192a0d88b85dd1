//! Key-value storage backends for persisted snapshots.
//!
//! The interface mirrors a browser's local storage: string keys mapping to
//! whole serialized values, read and overwritten in full.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::Result;

#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStorage: Send {
    /// Raw value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Forget `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;
}
