//! Priority derivation for newly created tasks.
//!
//! Critical tasks are always `High`. Otherwise the due date is compared against
//! [`PRIORITY_RULES`] top-down and the first rule whose window contains it wins.

use chrono::{Days, NaiveDate};

use super::task::Priority;

/// A due-date window: tasks due strictly before `today + within_days` get `priority`.
#[derive(Debug, Clone, Copy)]
pub struct PriorityRule {
    pub within_days: u64,
    pub priority: Priority,
}

/// Ordered policy table. Dates past every window fall back to [`FALLBACK_PRIORITY`].
pub const PRIORITY_RULES: &[PriorityRule] = &[
    PriorityRule {
        within_days: 7,
        priority: Priority::High,
    },
    PriorityRule {
        within_days: 20,
        priority: Priority::Medium,
    },
];

pub const FALLBACK_PRIORITY: Priority = Priority::Low;

/// Derive the priority of a task due on `due_date`.
pub fn derive_priority(due_date: NaiveDate, is_critical: bool, today: NaiveDate) -> Priority {
    if is_critical {
        return Priority::High;
    }
    PRIORITY_RULES
        .iter()
        .find(|rule| match today.checked_add_days(Days::new(rule.within_days)) {
            Some(limit) => due_date < limit,
            // Window end overflows the calendar, so every representable date is inside it.
            None => true,
        })
        .map(|rule| rule.priority)
        .unwrap_or(FALLBACK_PRIORITY)
}
