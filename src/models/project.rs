use std::{fmt, str::FromStr};

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Test leads a project can be assigned to
pub const TEST_LEADS: [&str; 3] = ["Shraddha Chaudhari", "Varsha Patil", "Namrata Shinde"];

/// Testers that can be assigned to a project
pub const TESTERS: [&str; 5] = [
    "Rutik Erole",
    "Shweta Pardeshi",
    "Parth Supekar",
    "Mayur Bidkar",
    "Shruti Sancheti",
];

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Triggered,
    Ongoing,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Triggered => "triggered",
            ProjectStatus::Ongoing => "ongoing",
            ProjectStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown project status '{0}' (expected triggered, ongoing or completed)")]
pub struct ParseProjectStatusError(pub String);

impl FromStr for ProjectStatus {
    type Err = ParseProjectStatusError;

    /// Also accepts the short labels used by the project form ("Trigger", "Complete")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "triggered" | "trigger" => Ok(ProjectStatus::Triggered),
            "ongoing" => Ok(ProjectStatus::Ongoing),
            "completed" | "complete" => Ok(ProjectStatus::Completed),
            _ => Err(ParseProjectStatusError(s.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Assigned by the store, absent on drafts
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::models::id::deserialize_opt"
    )]
    pub id: Option<String>,
    /// Display name of the project
    pub name: String,
    pub status: ProjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// One of [`TEST_LEADS`]
    pub test_lead: String,
    /// Assigned testers, kept free of duplicates by the callers
    #[serde(default)]
    pub testers: Vec<String>,
    #[serde(default)]
    pub total_test_cases: u32,
    #[serde(default)]
    pub completed_test_cases: u32,
    /// Set once on creation
    #[serde(deserialize_with = "crate::models::date::deserialize")]
    pub created_at: Date,
}

impl Project {
    pub fn is_assigned_to(&self, tester: &str) -> bool {
        self.testers.iter().any(|t| t == tester)
    }
}
