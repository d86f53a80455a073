// Client-side session persistence
//
// - storage: KeyValueStorage trait with in-memory and file backends
// - store: SessionStore, the repository the flows depend on

pub mod storage;
pub mod store;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{SessionStore, REMEMBERED_EMAIL_KEY, TOKEN_KEY, USER_KEY};
