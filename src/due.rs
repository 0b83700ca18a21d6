use chrono::{DateTime, Local};
use std::fmt;
use crate::models::Task;

/// Badge shown next to a task's deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueLabel {
    Overdue,
    DueToday,
    DueTomorrow,
}

impl fmt::Display for DueLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DueLabel::Overdue => "Overdue",
            DueLabel::DueToday => "Due today",
            DueLabel::DueTomorrow => "Due tomorrow",
        })
    }
}

/// Computes the deadline badge for a task.
///
/// Days are counted on the local calendar. Completed tasks and tasks without
/// a due date get no badge.
pub fn due_label(task: &Task, now: DateTime<Local>) -> Option<DueLabel> {
    if task.completed {
        return None;
    }
    let due = task.due_date?.with_timezone(&Local);
    if due < now || task.is_overdue {
        return Some(DueLabel::Overdue);
    }
    match (due.date_naive() - now.date_naive()).num_days() {
        0 => Some(DueLabel::DueToday),
        1 => Some(DueLabel::DueTomorrow),
        _ => None,
    }
}

/// Deadline in local time, e.g. `Mar 01, 09:30`.
pub fn format_due(task: &Task) -> Option<String> {
    task.due_date
        .map(|d| d.with_timezone(&Local).format("%b %d, %H:%M").to_string())
}

/// Compact remaining-time column: `3d`, `Today`, `2d overdue`, or `-`.
pub fn time_left(task: &Task, now: DateTime<Local>) -> String {
    let Some(due) = task.due_date else {
        return "-".to_string();
    };
    let days_left = (due.with_timezone(&Local).date_naive() - now.date_naive()).num_days();
    if days_left < 0 {
        format!("{}d overdue", days_left.abs())
    } else if days_left == 0 {
        "Today".to_string()
    } else {
        format!("{}d", days_left)
    }
}
