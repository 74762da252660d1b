//! Client-side session state.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `SessionStore` per client context (the session CLI, or a browser tab).
//! The store is constructed explicitly and owned by whoever drives the UI;
//! nothing here is global.

pub mod reducer;
pub mod storage;
pub mod store;

pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use store::SessionStore;
