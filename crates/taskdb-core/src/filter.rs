use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, Task};

/// Listing filter. Each present value is a regular expression searched for,
/// case-insensitively, anywhere in the stored field; plain text therefore
/// acts as a substring match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Pattern for the status constraint, if any.
    pub fn status_pattern(&self) -> Option<String> {
        pattern_for(self.status.as_deref())
    }

    /// Pattern for the title constraint, if any.
    pub fn title_pattern(&self) -> Option<String> {
        pattern_for(self.title.as_deref())
    }

    /// Compile into a matcher usable against in-process tasks.
    pub fn matcher(&self) -> Result<TaskMatcher> {
        Ok(TaskMatcher {
            status: compile(self.status_pattern())?,
            title: compile(self.title_pattern())?,
        })
    }
}

fn pattern_for(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn compile(pattern: Option<String>) -> Result<Option<Regex>> {
    pattern
        .map(|p| {
            RegexBuilder::new(&p)
                .case_insensitive(true)
                .build()
                .map_err(|e| Error::InvalidFilter(e.to_string()))
        })
        .transpose()
}

#[derive(Debug, Clone)]
pub struct TaskMatcher {
    status: Option<Regex>,
    title: Option<Regex>,
}

impl TaskMatcher {
    pub fn matches(&self, task: &Task) -> bool {
        let status_ok = self
            .status
            .as_ref()
            .map_or(true, |re| re.is_match(&task.status));
        let title_ok = self
            .title
            .as_ref()
            .map_or(true, |re| re.is_match(&task.title));

        status_ok && title_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TaskFields, TaskId};

    fn task(title: &str, status: &str) -> Task {
        Task::from_fields(
            TaskId::new(),
            TaskFields::new().with_title(title).with_status(status),
        )
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let matcher = TaskFilter::new().matcher().unwrap();
        assert!(matcher.matches(&task("anything", "whatever")));
        assert!(TaskFilter::new().with_status("").status_pattern().is_none());
    }

    #[test]
    fn test_substring_match_ignores_case() {
        let matcher = TaskFilter::new().with_status("PEND").matcher().unwrap();
        assert!(matcher.matches(&task("Buy milk", "Pendiente")));
        assert!(matcher.matches(&task("Buy milk", "pending")));
        assert!(!matcher.matches(&task("Buy milk", "Done")));
    }

    #[test]
    fn test_both_constraints_must_hold() {
        let matcher = TaskFilter::new()
            .with_status("done")
            .with_title("rent")
            .matcher()
            .unwrap();

        assert!(matcher.matches(&task("Pay RENT", "Done")));
        assert!(!matcher.matches(&task("Pay rent", "Pending")));
        assert!(!matcher.matches(&task("Buy milk", "Done")));
    }

    #[test]
    fn test_patterns_support_anchors_and_alternation() {
        let anchored = TaskFilter::new().with_title("^buy").matcher().unwrap();
        assert!(anchored.matches(&task("Buy milk", "x")));
        assert!(!anchored.matches(&task("Go buy milk", "x")));

        let either = TaskFilter::new().with_title("rent|milk").matcher().unwrap();
        assert!(either.matches(&task("Pay RENT", "x")));
        assert!(either.matches(&task("Buy milk", "x")));
        assert!(!either.matches(&task("Walk dog", "x")));
    }

    #[test]
    fn test_invalid_pattern_is_a_typed_error() {
        let result = TaskFilter::new().with_status("(unclosed").matcher();
        assert!(matches!(result, Err(Error::InvalidFilter(_))));
    }
}
