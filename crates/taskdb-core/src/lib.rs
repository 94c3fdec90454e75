//! Task domain types and the task repository.

pub mod clock;
pub mod error;
pub mod filter;
pub mod memory;
pub mod repository;
pub mod store;
pub mod task;

// Re-exports
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use filter::{TaskFilter, TaskMatcher};
pub use memory::InMemoryTaskStore;
pub use repository::{sort_for_listing, TaskRepository};
pub use store::TaskStore;
pub use task::{is_pending_status, Task, TaskFields, TaskId};
