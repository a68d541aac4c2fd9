//! Ordering and priority rules for the active task list.
//!
//! Every operation takes the current list and returns the next one. The
//! caller is expected to persist the returned list as a whole.
//!
//! # Invariants (hold for every returned list)
//! - `order` values are exactly `0..len`, matching each task's position
//! - At most one task has `is_top_priority == true`

use chrono::{DateTime, Utc};

use super::task::{CompletedTask, Task, TaskError, TaskId};

/// Result of moving a task from the active list to history.
#[derive(Debug, Clone)]
pub struct Completion {
    pub tasks: Vec<Task>,
    pub history: Vec<CompletedTask>,
    pub completed: CompletedTask,
}

/// Set every task's `order` to its position in the slice.
pub fn renumber(tasks: &mut [Task]) {
    for (index, task) in tasks.iter_mut().enumerate() {
        task.order = index;
    }
}

/// Check the ordering and single-flag invariants.
pub fn is_well_formed(tasks: &[Task]) -> bool {
    let positional = tasks
        .iter()
        .enumerate()
        .all(|(index, task)| task.order == index);
    let flagged = tasks.iter().filter(|t| t.is_top_priority).count();
    positional && flagged <= 1
}

/// Repair a list that came from outside: sort by `order`, renumber, and keep
/// only the first top-priority flag.
pub fn normalize(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by_key(|t| t.order);
    let mut seen_top = false;
    for task in tasks.iter_mut() {
        if task.is_top_priority {
            if seen_top {
                task.is_top_priority = false;
            }
            seen_top = true;
        }
    }
    renumber(&mut tasks);
    tasks
}

/// Create a task and append it at the end of the list.
///
/// # Postcondition
/// The new task's `order` equals the previous list length.
///
/// # Errors
/// Returns `TaskError::EmptyDescription` for a blank description.
pub fn insert(
    mut tasks: Vec<Task>,
    description: &str,
    target_date: Option<DateTime<Utc>>,
) -> Result<(Vec<Task>, Task), TaskError> {
    let task = Task::new(description, target_date, tasks.len())?;
    tasks.push(task.clone());
    Ok((tasks, task))
}

/// Move the task at `from` so that it ends up at index `to`, then renumber.
///
/// Out-of-range indices leave the list untouched.
pub fn move_index(mut tasks: Vec<Task>, from: usize, to: usize) -> Vec<Task> {
    if from >= tasks.len() || to >= tasks.len() {
        return tasks;
    }
    let task = tasks.remove(from);
    tasks.insert(to, task);
    renumber(&mut tasks);
    tasks
}

/// Drag `active` onto the slot currently held by `over`.
///
/// Unknown ids, or dropping a task onto itself, is a no-op.
pub fn reorder(tasks: Vec<Task>, active: &TaskId, over: &TaskId) -> Vec<Task> {
    if active == over {
        return tasks;
    }
    let from = tasks.iter().position(|t| &t.id == active);
    let to = tasks.iter().position(|t| &t.id == over);
    match (from, to) {
        (Some(from), Some(to)) => move_index(tasks, from, to),
        _ => tasks,
    }
}

/// Mark `id` as the single top-priority task and move it to the front.
///
/// When another task held the flag, that task is demoted into the slot the
/// promoted task left. Otherwise the promoted task is moved to the front
/// and everything ahead of it shifts down by one.
///
/// # Errors
/// Returns `TaskError::NotFound` if `id` is not in the list.
pub fn set_top_priority(mut tasks: Vec<Task>, id: &TaskId) -> Result<Vec<Task>, TaskError> {
    let vacated = tasks
        .iter()
        .position(|t| &t.id == id)
        .ok_or_else(|| TaskError::NotFound(id.clone()))?;
    let demoted = tasks
        .iter()
        .find(|t| t.is_top_priority && &t.id != id)
        .map(|t| t.id.clone());

    let promoted = tasks.remove(vacated);
    tasks.insert(0, promoted);

    if let Some(demoted_id) = demoted {
        if let Some(from) = tasks.iter().position(|t| t.id == demoted_id) {
            let task = tasks.remove(from);
            // Slot 0 now belongs to the promoted task.
            let to = vacated.max(1).min(tasks.len());
            tasks.insert(to, task);
        }
    }

    for task in tasks.iter_mut() {
        task.is_top_priority = &task.id == id;
    }
    renumber(&mut tasks);
    Ok(tasks)
}

/// Clear the top-priority flag on `id`, keeping every task where it is.
///
/// # Errors
/// Returns `TaskError::NotFound` if `id` is not in the list.
pub fn unset_top_priority(mut tasks: Vec<Task>, id: &TaskId) -> Result<Vec<Task>, TaskError> {
    let task = tasks
        .iter_mut()
        .find(|t| &t.id == id)
        .ok_or_else(|| TaskError::NotFound(id.clone()))?;
    task.is_top_priority = false;
    renumber(&mut tasks);
    Ok(tasks)
}

/// Remove `id` from the active list and prepend its record to `history`.
///
/// # Errors
/// Returns `TaskError::NotFound` if `id` is not in the list.
pub fn complete(
    tasks: Vec<Task>,
    history: Vec<CompletedTask>,
    id: &TaskId,
) -> Result<Completion, TaskError> {
    complete_at(tasks, history, id, Utc::now())
}

/// Same as [`complete`] with an explicit completion time.
pub fn complete_at(
    mut tasks: Vec<Task>,
    history: Vec<CompletedTask>,
    id: &TaskId,
    now: DateTime<Utc>,
) -> Result<Completion, TaskError> {
    let index = tasks
        .iter()
        .position(|t| &t.id == id)
        .ok_or_else(|| TaskError::NotFound(id.clone()))?;
    let completed = tasks.remove(index).into_completed_at(now);
    renumber(&mut tasks);

    Ok(Completion {
        tasks,
        history: prepend(history, completed.clone()),
        completed,
    })
}

/// Put `entry` at the head of `history`.
pub fn prepend(history: Vec<CompletedTask>, entry: CompletedTask) -> Vec<CompletedTask> {
    let mut updated = Vec::with_capacity(history.len() + 1);
    updated.push(entry);
    updated.extend(history);
    updated
}

/// The task currently being worked on: the flagged one, else the first.
pub fn current_focus(tasks: &[Task]) -> Option<&Task> {
    tasks
        .iter()
        .find(|t| t.is_top_priority)
        .or_else(|| tasks.first())
}

/// History for display, most recently completed first.
pub fn history_by_completion(history: &[CompletedTask]) -> Vec<CompletedTask> {
    let mut sorted = history.to_vec();
    sorted.sort_by(|a, b| b.completed_date.cmp(&a.completed_date));
    sorted
}
