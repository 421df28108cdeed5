use jiff::{Timestamp, civil::Date, tz::TimeZone};
use slug::slugify;
use thiserror::Error;

use crate::{
    api::{DataAccessError, ResourceStore, authorized::AuthorizedStore},
    models::{
        project::{Project, ProjectStatus, TEST_LEADS, TESTERS},
        session::{Role, SessionContext},
    },
    services::{report::percent, validation::ValidationErrors},
};

#[derive(Debug, Error)]
pub enum CreateProjectError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Access(#[from] DataAccessError),
}

pub struct CreateProjectParameters {
    pub name: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub test_lead: Option<String>,
    /// Tester selections in the order they were made
    pub testers: Vec<String>,
}

/// Checkbox semantics: selecting a tester that is already selected removes it
pub fn toggle_tester(selection: &mut Vec<String>, tester: &str) {
    if let Some(pos) = selection.iter().position(|t| t == tester) {
        selection.remove(pos);
    } else {
        selection.push(tester.to_string());
    }
}

fn validate_draft(
    parameters: CreateProjectParameters,
    today: Date,
) -> Result<Project, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("name", parameters.name.as_deref(), "Project name is required.");
    errors.require("status", parameters.status.as_deref(), "Status is required.");
    errors.require("testLead", parameters.test_lead.as_deref(), "Test lead is required.");

    let status = match parameters.status.as_deref().map(str::parse::<ProjectStatus>) {
        Some(Ok(status)) => Some(status),
        Some(Err(e)) if errors.get("status").is_none() => {
            errors.add("status", e.to_string());
            None
        }
        _ => None,
    };

    let test_lead = parameters.test_lead.unwrap_or_default();
    if !test_lead.trim().is_empty() && !TEST_LEADS.contains(&test_lead.as_str()) {
        errors.add(
            "testLead",
            format!(
                "Unknown test lead '{}'. Choose one of: {}",
                test_lead,
                TEST_LEADS.join(", ")
            ),
        );
    }

    let mut testers = vec![];
    for tester in &parameters.testers {
        if !TESTERS.contains(&tester.as_str()) {
            errors.add(
                "testers",
                format!(
                    "Unknown tester '{}'. Choose from: {}",
                    tester,
                    TESTERS.join(", ")
                ),
            );
            continue;
        }
        toggle_tester(&mut testers, tester);
    }

    errors.into_result()?;

    Ok(Project {
        id: None,
        name: parameters.name.unwrap_or_default().trim().to_string(),
        status: status.unwrap_or_default(),
        description: parameters
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        test_lead,
        testers,
        total_test_cases: 0,
        completed_test_cases: 0,
        created_at: today,
    })
}

/// `createdAt` for a project made at `now`, as the UTC calendar date
pub fn creation_date(now: Timestamp) -> Date {
    now.to_zoned(TimeZone::UTC).date()
}

/// Validates the form, sends the draft and returns the store's record
pub fn create_project(
    store: &AuthorizedStore<'_, impl ResourceStore>,
    parameters: CreateProjectParameters,
    today: Date,
) -> Result<Project, CreateProjectError> {
    let draft = validate_draft(parameters, today).map_err(CreateProjectError::Validation)?;
    let created = store.create_project(&draft)?;
    tracing::info!(id = ?created.id, name = %created.name, "project created");
    Ok(created)
}

pub fn list_projects(
    store: &AuthorizedStore<'_, impl ResourceStore>,
) -> Result<Vec<Project>, DataAccessError> {
    store.list_projects()
}

pub fn delete_project(
    store: &AuthorizedStore<'_, impl ResourceStore>,
    id: &str,
) -> Result<(), DataAccessError> {
    store.delete_project(id)?;
    tracing::info!(id, "project deleted");
    Ok(())
}

/// Project lookup failure for the current viewer. Not being assigned looks
/// the same as the project not existing.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Project '{0}' not found or not assigned to you")]
pub struct NotAssignedError(pub String);

/// Matches by id first, then by the slug of the project name
pub fn resolve_project_ref<'a>(projects: &'a [Project], reference: &str) -> Option<&'a Project> {
    projects
        .iter()
        .find(|p| p.id.as_deref() == Some(reference))
        .or_else(|| {
            let wanted = slugify(reference);
            projects.iter().find(|p| slugify(&p.name) == wanted)
        })
}

/// Admins can open any project; testers only the ones they are assigned to
pub fn can_view(project: &Project, session: &SessionContext) -> bool {
    match session.role() {
        Role::Admin => true,
        Role::Tester => project.is_assigned_to(&session.display_name),
    }
}

pub fn find_project_for<'a>(
    projects: &'a [Project],
    reference: &str,
    session: &SessionContext,
) -> Result<&'a Project, NotAssignedError> {
    resolve_project_ref(projects, reference)
        .filter(|p| can_view(p, session))
        .ok_or_else(|| NotAssignedError(reference.to_string()))
}

pub fn visible_projects<'a>(projects: &'a [Project], session: &SessionContext) -> Vec<&'a Project> {
    projects.iter().filter(|p| can_view(p, session)).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub triggered: usize,
    pub ongoing: usize,
    pub completed: usize,
}

impl DashboardStats {
    pub fn from_projects<'a>(projects: impl IntoIterator<Item = &'a Project>) -> Self {
        let mut stats = Self::default();
        for project in projects {
            stats.total += 1;
            match project.status {
                ProjectStatus::Triggered => stats.triggered += 1,
                ProjectStatus::Ongoing => stats.ongoing += 1,
                ProjectStatus::Completed => stats.completed += 1,
            }
        }
        stats
    }
}

/// Progress from the project's own counters, which are set independently
/// of any test case data
pub fn counter_completion_percent(project: &Project) -> u8 {
    percent(
        project.completed_test_cases as usize,
        project.total_test_cases as usize,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::fake::FakeStore, models::session::SessionRecord};

    fn today() -> Date {
        "2025-05-20".parse().unwrap()
    }

    #[test]
    fn test_creation_date_uses_utc() {
        let late_evening_west: Timestamp = "2025-05-20T23:30:00-07:00".parse().unwrap();
        assert_eq!(creation_date(late_evening_west), jiff::civil::date(2025, 5, 21));

        let early_morning_east: Timestamp = "2025-05-21T01:00:00+09:00".parse().unwrap();
        assert_eq!(creation_date(early_morning_east), jiff::civil::date(2025, 5, 20));
    }

    fn session(role: Role, name: Option<&str>) -> SessionContext {
        SessionContext::new(
            SessionRecord {
                email: format!("{role}@testmagic.com"),
                role,
            },
            name.map(String::from),
        )
    }

    fn params() -> CreateProjectParameters {
        CreateProjectParameters {
            name: Some(String::from("E-commerce Platform")),
            status: Some(String::from("Trigger")),
            description: Some(String::from("  Checkout and payments  ")),
            test_lead: Some(String::from("Varsha Patil")),
            testers: vec![String::from("Rutik Erole"), String::from("Parth Supekar")],
        }
    }

    fn project(id: &str, name: &str, status: ProjectStatus, testers: &[&str]) -> Project {
        Project {
            id: Some(id.to_string()),
            name: name.to_string(),
            status,
            description: None,
            test_lead: String::from("Varsha Patil"),
            testers: testers.iter().map(|t| t.to_string()).collect(),
            total_test_cases: 0,
            completed_test_cases: 0,
            created_at: today(),
        }
    }

    #[test]
    fn test_create_project_returns_store_record() {
        let store = FakeStore::default();
        let admin = session(Role::Admin, None);
        let authorized = AuthorizedStore::new(&store, &admin);

        let created = create_project(&authorized, params(), today()).unwrap();

        assert!(created.id.is_some());
        assert_eq!(created.status, ProjectStatus::Triggered);
        assert_eq!(created.description.as_deref(), Some("Checkout and payments"));
        assert_eq!(created.total_test_cases, 0);
        assert_eq!(created.completed_test_cases, 0);
        assert_eq!(created.created_at, today());
        assert_eq!(store.projects.borrow().len(), 1);
    }

    #[test]
    fn test_missing_mandatory_fields_are_field_scoped() {
        let store = FakeStore::default();
        let admin = session(Role::Admin, None);
        let authorized = AuthorizedStore::new(&store, &admin);

        let result = create_project(
            &authorized,
            CreateProjectParameters {
                name: Some(String::from("  ")),
                status: None,
                description: None,
                test_lead: None,
                testers: vec![],
            },
            today(),
        );

        match result {
            Err(CreateProjectError::Validation(errors)) => {
                assert!(errors.get("name").is_some());
                assert!(errors.get("status").is_some());
                assert!(errors.get("testLead").is_some());
            }
            other => panic!("Expected validation errors, got {:?}", other),
        }
        assert_eq!(store.calls.get(), 0);
    }

    #[test]
    fn test_unknown_lead_status_and_tester_are_rejected() {
        let store = FakeStore::default();
        let admin = session(Role::Admin, None);
        let authorized = AuthorizedStore::new(&store, &admin);

        let result = create_project(
            &authorized,
            CreateProjectParameters {
                status: Some(String::from("paused")),
                test_lead: Some(String::from("Somebody Else")),
                testers: vec![String::from("Ghost")],
                ..params()
            },
            today(),
        );

        match result {
            Err(CreateProjectError::Validation(errors)) => {
                assert!(errors.get("status").unwrap().contains("paused"));
                assert!(errors.get("testLead").unwrap().contains("Somebody Else"));
                assert!(errors.get("testers").unwrap().contains("Ghost"));
            }
            other => panic!("Expected validation errors, got {:?}", other),
        }
    }

    #[test]
    fn test_selecting_a_tester_twice_deselects_it() {
        let store = FakeStore::default();
        let admin = session(Role::Admin, None);
        let authorized = AuthorizedStore::new(&store, &admin);

        let created = create_project(
            &authorized,
            CreateProjectParameters {
                testers: vec![
                    String::from("Rutik Erole"),
                    String::from("Mayur Bidkar"),
                    String::from("Rutik Erole"),
                ],
                ..params()
            },
            today(),
        )
        .unwrap();

        assert_eq!(created.testers, vec![String::from("Mayur Bidkar")]);
    }

    #[test]
    fn test_tester_cannot_create_projects() {
        let store = FakeStore::default();
        let tester = session(Role::Tester, Some("Rutik Erole"));
        let authorized = AuthorizedStore::new(&store, &tester);

        assert!(matches!(
            create_project(&authorized, params(), today()),
            Err(CreateProjectError::Access(DataAccessError::Unauthorized { .. }))
        ));
    }

    #[test]
    fn test_deleting_unknown_id_is_transport_error_and_list_survives() {
        let store = FakeStore::with_data(
            vec![project("1", "Checkout", ProjectStatus::Ongoing, &[])],
            vec![],
        );
        let admin = session(Role::Admin, None);
        let authorized = AuthorizedStore::new(&store, &admin);
        let displayed = list_projects(&authorized).unwrap();

        let result = delete_project(&authorized, "missing");

        assert!(matches!(
            result,
            Err(DataAccessError::Transport(crate::api::TransportError::Status { status: 404, .. }))
        ));
        assert_eq!(displayed.len(), 1);
        assert_eq!(store.projects.borrow().len(), 1);
    }

    #[test]
    fn test_delete_existing_project() {
        let store = FakeStore::with_data(
            vec![project("1", "Checkout", ProjectStatus::Ongoing, &[])],
            vec![],
        );
        let admin = session(Role::Admin, None);
        let authorized = AuthorizedStore::new(&store, &admin);

        delete_project(&authorized, "1").unwrap();
        assert!(store.projects.borrow().is_empty());
    }

    #[test]
    fn test_resolve_by_id_or_name_slug() {
        let projects = vec![
            project("1", "E-commerce Platform", ProjectStatus::Ongoing, &[]),
            project("2", "Mobile App", ProjectStatus::Triggered, &[]),
        ];

        assert_eq!(resolve_project_ref(&projects, "2").unwrap().name, "Mobile App");
        assert_eq!(
            resolve_project_ref(&projects, "e-commerce-platform").unwrap().id.as_deref(),
            Some("1")
        );
        assert_eq!(
            resolve_project_ref(&projects, "Mobile App").unwrap().id.as_deref(),
            Some("2")
        );
        assert!(resolve_project_ref(&projects, "3").is_none());
    }

    #[test]
    fn test_tester_only_sees_assigned_projects() {
        let projects = vec![
            project("1", "Checkout", ProjectStatus::Ongoing, &["Rutik Erole"]),
            project("2", "Search", ProjectStatus::Ongoing, &["Parth Supekar"]),
        ];
        let tester = session(Role::Tester, Some("Rutik Erole"));

        assert!(find_project_for(&projects, "1", &tester).is_ok());
        assert_eq!(
            find_project_for(&projects, "2", &tester),
            Err(NotAssignedError(String::from("2")))
        );
        assert_eq!(visible_projects(&projects, &tester).len(), 1);

        let admin = session(Role::Admin, None);
        assert!(find_project_for(&projects, "2", &admin).is_ok());
        assert_eq!(visible_projects(&projects, &admin).len(), 2);
    }

    #[test]
    fn test_dashboard_stats() {
        let projects = vec![
            project("1", "A", ProjectStatus::Triggered, &[]),
            project("2", "B", ProjectStatus::Ongoing, &[]),
            project("3", "C", ProjectStatus::Ongoing, &[]),
            project("4", "D", ProjectStatus::Completed, &[]),
        ];

        let stats = DashboardStats::from_projects(&projects);
        assert_eq!(
            stats,
            DashboardStats {
                total: 4,
                triggered: 1,
                ongoing: 2,
                completed: 1,
            }
        );
    }

    #[test]
    fn test_counter_completion_percent() {
        let mut p = project("1", "A", ProjectStatus::Ongoing, &[]);
        assert_eq!(counter_completion_percent(&p), 0);

        p.total_test_cases = 3;
        p.completed_test_cases = 2;
        assert_eq!(counter_completion_percent(&p), 67);
    }
}
