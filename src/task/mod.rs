//! Task module - task records and the ordering/priority rules of the list.
//!
//! - `task`: wire-level records (`Task`, `CompletedTask`) and `TaskError`
//! - `board`: pure list transformations that keep orders contiguous

pub mod board;
pub mod task;

pub use board::Completion;
pub use task::{CompletedTask, Task, TaskError, TaskId};
