//! Reporting values derived from a list of test cases. Everything here is a
//! pure function of its input and is simply recomputed whenever the list
//! changes.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer, ser::SerializeMap};
use thiserror::Error;

use crate::{
    models::{
        project::Project,
        test_case::{Priority, TestCase, TestCaseStatus},
    },
    view::ViewState,
};

/// Bucket for cases without a tester or project
pub const UNASSIGNED: &str = "Unassigned";

/// Bar colours, in [`TestCaseStatus::ALL`] order
pub const STATUS_COLORS: [&str; 4] = ["#facc15", "#60a5fa", "#22c55e", "#ef4444"];

/// One count per status. Every status is always present, zero or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts([usize; 4]);

impl StatusCounts {
    pub fn get(&self, status: TestCaseStatus) -> usize {
        self.0[status.index()]
    }

    fn bump(&mut self, status: TestCaseStatus) {
        self.0[status.index()] += 1;
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Passed plus Failed
    pub fn resolved(&self) -> usize {
        self.iter()
            .filter(|(status, _)| status.is_resolved())
            .map(|(_, count)| count)
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TestCaseStatus, usize)> + '_ {
        TestCaseStatus::ALL.iter().map(|s| (*s, self.get(*s)))
    }
}

impl Serialize for StatusCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(TestCaseStatus::ALL.len()))?;
        for (status, count) in self.iter() {
            map.serialize_entry(status.label(), &count)?;
        }
        map.end()
    }
}

pub fn count_by_status(cases: &[TestCase]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for case in cases {
        counts.bump(case.status);
    }
    counts
}

/// `round(100 * part / total)`, or 0 when `total` is 0.
///
/// Rounds half up, done in integers so 12.5 becomes 13 and 2/3 becomes 67.
pub fn percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let part = part.min(total) as u64;
    let total = total as u64;
    ((200 * part + total) / (2 * total)) as u8
}

/// Share of cases that are resolved. A Failed case counts as progress.
pub fn completion_percent(cases: &[TestCase]) -> u8 {
    let counts = count_by_status(cases);
    percent(counts.resolved(), counts.total())
}

/// Returns `cases` with the status of the case `id` replaced. Order and all
/// other fields are untouched; an unknown id leaves the list as it was.
pub fn status_transition(cases: Vec<TestCase>, id: &str, new_status: TestCaseStatus) -> Vec<TestCase> {
    cases
        .into_iter()
        .map(|case| {
            if case.id == id {
                TestCase {
                    status: new_status,
                    ..case
                }
            } else {
                case
            }
        })
        .collect()
}

/// Cases without a priority are left out
pub fn count_by_priority(cases: &[TestCase]) -> BTreeMap<Priority, usize> {
    let mut counts: BTreeMap<Priority, usize> = Priority::ALL.iter().map(|p| (*p, 0)).collect();
    for priority in cases.iter().filter_map(|c| c.priority) {
        *counts.entry(priority).or_default() += 1;
    }
    counts
}

fn breakdown_by<F>(cases: &[TestCase], key: F) -> BTreeMap<String, StatusCounts>
where
    F: Fn(&TestCase) -> Option<&str>,
{
    let mut breakdown: BTreeMap<String, StatusCounts> = BTreeMap::new();
    for case in cases {
        let name = key(case)
            .filter(|k| !k.trim().is_empty())
            .unwrap_or(UNASSIGNED);
        breakdown.entry(name.to_string()).or_default().bump(case.status);
    }
    breakdown
}

pub fn breakdown_by_tester(cases: &[TestCase]) -> BTreeMap<String, StatusCounts> {
    breakdown_by(cases, |c| c.tester.as_deref())
}

pub fn breakdown_by_project(cases: &[TestCase]) -> BTreeMap<String, StatusCounts> {
    breakdown_by(cases, |c| c.project.as_deref())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub name: &'static str,
    pub count: usize,
    pub color: &'static str,
}

pub fn chart_series(counts: &StatusCounts) -> Vec<ChartPoint> {
    counts
        .iter()
        .map(|(status, count)| ChartPoint {
            name: status.label(),
            count,
            color: STATUS_COLORS[status.index()],
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveSummary {
    pub passed: usize,
    pub failed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub completion_percent: u8,
}

impl ExecutiveSummary {
    pub fn from_counts(counts: &StatusCounts) -> Self {
        Self {
            passed: counts.get(TestCaseStatus::Passed),
            failed: counts.get(TestCaseStatus::Failed),
            in_progress: counts.get(TestCaseStatus::InProgress),
            pending: counts.get(TestCaseStatus::Pending),
            completion_percent: percent(counts.resolved(), counts.total()),
        }
    }

    pub fn achievements(&self) -> Vec<String> {
        vec![format!(
            "{} test cases passed ({}% completion rate)",
            self.passed, self.completion_percent
        )]
    }

    pub fn concerns(&self) -> Vec<String> {
        let mut concerns = vec![];
        if self.failed > 0 {
            concerns.push(format!(
                "{} test cases failed requiring developer attention",
                self.failed
            ));
        }
        if self.in_progress > 0 {
            concerns.push(format!("{} test cases still in progress", self.in_progress));
        }
        if self.pending > 0 {
            concerns.push(format!("{} test cases still pending execution", self.pending));
        }
        concerns
    }
}

#[derive(Debug, Error)]
pub enum ExportReportError {
    #[error("Test cases could not be loaded: {0}")]
    MissingTestCases(String),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything the report view shows for one project
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReport {
    pub project: Project,
    pub total: usize,
    pub status_counts: StatusCounts,
    pub completion_percent: u8,
    pub priority_counts: BTreeMap<Priority, usize>,
    pub by_tester: BTreeMap<String, StatusCounts>,
    pub chart: Vec<ChartPoint>,
    pub summary: ExecutiveSummary,
}

impl ProjectReport {
    pub fn build(project: Project, cases: &[TestCase]) -> Self {
        let status_counts = count_by_status(cases);
        Self {
            project,
            total: cases.len(),
            status_counts,
            completion_percent: completion_percent(cases),
            priority_counts: count_by_priority(cases),
            by_tester: breakdown_by_tester(cases),
            chart: chart_series(&status_counts),
            summary: ExecutiveSummary::from_counts(&status_counts),
        }
    }

    /// Pretty JSON for the report. A failed test case fetch is an error here,
    /// never an empty report.
    pub fn export_json(
        project: Project,
        cases: &ViewState<Vec<TestCase>>,
    ) -> Result<String, ExportReportError> {
        if let Some(message) = cases.error() {
            return Err(ExportReportError::MissingTestCases(message.to_string()));
        }
        let cases = cases.data().map(Vec::as_slice).unwrap_or_default();
        Ok(serde_json::to_string_pretty(&Self::build(project, cases))?)
    }
}
