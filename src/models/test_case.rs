use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TestCaseStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Passed,
    Failed,
}

impl TestCaseStatus {
    /// Fixed order used by every report and chart
    pub const ALL: [TestCaseStatus; 4] = [
        TestCaseStatus::Pending,
        TestCaseStatus::InProgress,
        TestCaseStatus::Passed,
        TestCaseStatus::Failed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TestCaseStatus::Pending => "Pending",
            TestCaseStatus::InProgress => "In Progress",
            TestCaseStatus::Passed => "Passed",
            TestCaseStatus::Failed => "Failed",
        }
    }

    /// Position in [`TestCaseStatus::ALL`]
    pub fn index(&self) -> usize {
        match self {
            TestCaseStatus::Pending => 0,
            TestCaseStatus::InProgress => 1,
            TestCaseStatus::Passed => 2,
            TestCaseStatus::Failed => 3,
        }
    }

    /// Passed and Failed both count as resolved
    pub fn is_resolved(&self) -> bool {
        matches!(self, TestCaseStatus::Passed | TestCaseStatus::Failed)
    }
}

impl fmt::Display for TestCaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown test case status '{0}' (expected pending, in-progress, passed or failed)")]
pub struct ParseTestCaseStatusError(pub String);

impl FromStr for TestCaseStatus {
    type Err = ParseTestCaseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();

        match normalized.as_str() {
            "pending" => Ok(TestCaseStatus::Pending),
            "inprogress" => Ok(TestCaseStatus::InProgress),
            "passed" | "pass" => Ok(TestCaseStatus::Passed),
            "failed" | "fail" => Ok(TestCaseStatus::Failed),
            _ => Err(ParseTestCaseStatusError(s.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TestCase {
    #[serde(deserialize_with = "crate::models::id::deserialize")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: TestCaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Name of the tester, not a checked reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tester: Option<String>,
    /// Identifier of the owning project, not a checked reference
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::models::id::deserialize_opt"
    )]
    pub project: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_progress_uses_spaced_wire_name() {
        let json = serde_json::to_string(&TestCaseStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");

        let parsed: TestCaseStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(parsed, TestCaseStatus::InProgress);
    }

    #[test]
    fn test_minimal_test_case_defaults_to_pending() {
        let case: TestCase = serde_json::from_str(r#"{"id": 1, "title": "Login works"}"#).unwrap();
        assert_eq!(case.id, "1");
        assert_eq!(case.status, TestCaseStatus::Pending);
        assert!(case.priority.is_none());
        assert!(case.tester.is_none());
    }

    #[test]
    fn test_status_parsing_is_lenient_about_separators() {
        for input in ["in-progress", "In Progress", "in_progress", "INPROGRESS"] {
            assert_eq!(input.parse::<TestCaseStatus>().unwrap(), TestCaseStatus::InProgress);
        }
        assert_eq!("Passed".parse::<TestCaseStatus>().unwrap(), TestCaseStatus::Passed);
        assert!("blocked".parse::<TestCaseStatus>().is_err());
    }
}
