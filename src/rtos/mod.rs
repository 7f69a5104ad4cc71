pub mod error;
pub mod scheduler;
pub mod status;
pub mod task;

pub use error::SchedulerError;
pub use scheduler::{Scheduler, TaskBuilder, TaskId};
pub use status::{DefaultLatch, Report, SilentLatch, StatusLatch};
pub use task::{Job, Task, WithContext};
