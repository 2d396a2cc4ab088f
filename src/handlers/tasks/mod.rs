pub mod collection;
pub mod record;
pub mod utils;

// Re-export handler functions for use in routing
pub use collection::create as tasks_post;
pub use collection::list as tasks_get;

pub use record::delete as task_delete;
pub use record::get as task_get;
pub use record::patch as task_patch;
