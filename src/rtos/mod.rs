//! Run-to-completion task kernel: tasks, dispatcher and blocking primitives

pub mod mutex;
pub mod queue;
pub mod scheduler;
pub mod task;
pub mod time;

pub use mutex::{Mutex, MutexGuard};
pub use queue::Queue;
pub use scheduler::{Kernel, SpawnError, TaskBuilder};
pub use task::{Context, Interest, Task, TaskId, TaskPriority, TaskState, Wait, Waitable, Wake};
pub use time::{Duration, Instant};
