//! In-memory task filtering for list views and exports. Pure functions,
//! recomputed per render; never persisted.

use crate::models::{Priority, Task, TaskStatus};

/// Filter criteria. All populated criteria are ANDed; text matching is
/// case-insensitive substring.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub text: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub assignee: Option<String>,
    /// When set, `text` matches only against the task's tags.
    pub tags_only: bool,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(ref text) = self.text {
            let needle = text.to_lowercase();
            let haystack = if self.tags_only {
                task.tags.join(" ").to_lowercase()
            } else {
                format!(
                    "{} {} {} {}",
                    task.title,
                    task.description.as_deref().unwrap_or(""),
                    task.assignee.as_deref().unwrap_or(""),
                    task.tags.join(" ")
                )
                .to_lowercase()
            };
            if !haystack.contains(&needle) {
                return false;
            }
        }

        if let Some(ref status) = self.status {
            if task.status != *status {
                return false;
            }
        }

        if let Some(ref priority) = self.priority {
            if task.priority != *priority {
                return false;
            }
        }

        if let Some(ref assignee) = self.assignee {
            let needle = assignee.to_lowercase();
            match task.assignee {
                Some(ref a) if a.to_lowercase().contains(&needle) => {}
                _ => return false,
            }
        }

        true
    }
}

/// Apply a filter preserving input order.
pub fn apply<'a>(tasks: &'a [Task], filter: &TaskFilter) -> Vec<&'a Task> {
    tasks.iter().filter(|t| filter.matches(t)).collect()
}

/// Sort for the list export: due date ascending, tasks without a due date
/// last. Stable, so ties keep input order.
pub fn sort_by_due_date(tasks: &mut [&Task]) {
    tasks.sort_by(|a, b| match (&a.due_date, &b.due_date) {
        (None, None) => std::cmp::Ordering::Equal,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (Some(_), None) => std::cmp::Ordering::Less,
        (Some(da), Some(db)) => da.cmp(db),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConfirmationStatus;

    fn task(title: &str, tags: &[&str]) -> Task {
        Task {
            id: title.to_lowercase().replace(' ', "-"),
            sequential_id: None,
            title: title.into(),
            description: None,
            assignee: None,
            due_date: None,
            priority: Priority::Media,
            status: TaskStatus::Backlog,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            setor_id: "s1".into(),
            confirmation_status: ConfirmationStatus::None,
            confirmation_requested_at: None,
            confirmation_requested_by: None,
            confirmation_notes: None,
            confirmation_approved_at: None,
            confirmation_approved_by: None,
            admin_notes: None,
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn test_tags_only_matches_tags_not_title() {
        let tasks = vec![
            task("Fix bug", &["infra"]),
            task("Write docs", &["infra", "urgent"]),
        ];

        let infra = TaskFilter {
            text: Some("infra".into()),
            tags_only: true,
            ..Default::default()
        };
        assert_eq!(apply(&tasks, &infra).len(), 2);

        let fix = TaskFilter {
            text: Some("fix".into()),
            tags_only: true,
            ..Default::default()
        };
        assert!(apply(&tasks, &fix).is_empty());
    }

    #[test]
    fn test_free_text_searches_title_description_assignee_tags() {
        let mut t = task("Fix bug", &["infra"]);
        t.description = Some("Corrigir deploy".into());
        t.assignee = Some("Carlos".into());
        let tasks = vec![t];

        for needle in ["fix", "DEPLOY", "carlos", "infra"] {
            let f = TaskFilter {
                text: Some(needle.into()),
                ..Default::default()
            };
            assert_eq!(apply(&tasks, &f).len(), 1, "needle {needle}");
        }
    }

    #[test]
    fn test_filters_are_anded() {
        let mut a = task("Fix bug", &["infra"]);
        a.status = TaskStatus::EmAndamento;
        let b = task("Fix typo", &["docs"]);
        let tasks = vec![a, b];

        let f = TaskFilter {
            text: Some("fix".into()),
            status: Some(TaskStatus::EmAndamento),
            ..Default::default()
        };
        let hits = apply(&tasks, &f);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Fix bug");
    }

    #[test]
    fn test_assignee_substring_case_insensitive() {
        let mut t = task("Fix bug", &[]);
        t.assignee = Some("Maria Clara".into());
        let tasks = vec![t, task("Other", &[])];

        let f = TaskFilter {
            assignee: Some("clara".into()),
            ..Default::default()
        };
        assert_eq!(apply(&tasks, &f).len(), 1);
    }

    #[test]
    fn test_due_date_sort_missing_last() {
        let mut a = task("A", &[]);
        a.due_date = Some("2024-03-01".into());
        let b = task("B", &[]);
        let mut c = task("C", &[]);
        c.due_date = Some("2024-01-15".into());
        let tasks = vec![a, b, c];

        let mut view: Vec<&Task> = tasks.iter().collect();
        sort_by_due_date(&mut view);
        let order: Vec<&str> = view.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(order, ["C", "A", "B"]);
    }
}
