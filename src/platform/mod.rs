//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Calendar time
//! - Input events
//! - Storage (LocalStorage on web)

pub mod input;
pub mod storage;
pub mod time;

pub use input::{InputAction, InputState};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use time::DayStamp;
