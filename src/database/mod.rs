pub mod memory;
pub mod models;
pub mod sqlite;
pub mod store;

pub use memory::MemoryTaskStore;
pub use models::{NewTask, PatchTask, Task};
pub use sqlite::SqliteTaskStore;
pub use store::{StoreError, StoreResult, TaskStore};
