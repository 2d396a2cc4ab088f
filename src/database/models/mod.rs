pub mod task;

pub use task::{NewTask, PatchTask, Task};
