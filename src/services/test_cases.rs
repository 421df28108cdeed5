use thiserror::Error;

use crate::{
    api::{DataAccessError, ResourceStore, TestCaseScope, authorized::AuthorizedStore},
    models::test_case::{TestCase, TestCaseStatus},
    services::report::status_transition,
};

/// Test cases belonging to one project
pub fn list_for_project(
    store: &AuthorizedStore<'_, impl ResourceStore>,
    project_id: &str,
) -> Result<Vec<TestCase>, DataAccessError> {
    store.list_test_cases(&TestCaseScope::Project(project_id.to_string()))
}

/// The whole collection, regardless of project
pub fn list_all(
    store: &AuthorizedStore<'_, impl ResourceStore>,
) -> Result<Vec<TestCase>, DataAccessError> {
    store.list_test_cases(&TestCaseScope::Global)
}

#[derive(Debug, Error)]
pub enum SetStatusError {
    #[error("Test case '{0}' is not part of this project")]
    TestCaseNotFound(String),

    #[error(transparent)]
    Access(#[from] DataAccessError),
}

pub struct SetStatusParameters {
    pub test_case_id: String,
    pub status: TestCaseStatus,
}

/// Records a tester's status change in the store and returns the updated
/// list the view should show
pub fn set_status(
    store: &AuthorizedStore<'_, impl ResourceStore>,
    cases: Vec<TestCase>,
    parameters: SetStatusParameters,
) -> Result<Vec<TestCase>, SetStatusError> {
    if !cases.iter().any(|c| c.id == parameters.test_case_id) {
        return Err(SetStatusError::TestCaseNotFound(parameters.test_case_id));
    }

    store.update_test_case_status(&parameters.test_case_id, parameters.status)?;
    tracing::info!(
        id = %parameters.test_case_id,
        status = %parameters.status,
        tester = %store.session().display_name,
        "test case status changed"
    );

    Ok(status_transition(
        cases,
        &parameters.test_case_id,
        parameters.status,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::fake::FakeStore,
        models::session::{Role, SessionContext, SessionRecord},
    };

    fn case(id: &str, project: &str, status: TestCaseStatus) -> TestCase {
        TestCase {
            id: id.to_string(),
            title: format!("Case {id}"),
            status,
            priority: None,
            tester: None,
            project: Some(project.to_string()),
        }
    }

    fn tester() -> SessionContext {
        SessionContext::new(
            SessionRecord {
                email: String::from("tester@testmagic.com"),
                role: Role::Tester,
            },
            Some(String::from("Rutik Erole")),
        )
    }

    fn seeded_store() -> FakeStore {
        FakeStore::with_data(
            vec![],
            vec![
                case("1", "10", TestCaseStatus::Pending),
                case("2", "10", TestCaseStatus::Pending),
                case("3", "20", TestCaseStatus::Passed),
            ],
        )
    }

    #[test]
    fn test_listing_is_scoped_to_project() {
        let store = seeded_store();
        let session = tester();
        let authorized = AuthorizedStore::new(&store, &session);

        let cases = list_for_project(&authorized, "10").unwrap();
        let ids: Vec<_> = cases.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[test]
    fn test_global_listing_returns_everything() {
        let store = seeded_store();
        let session = tester();
        let authorized = AuthorizedStore::new(&store, &session);

        assert_eq!(list_all(&authorized).unwrap().len(), 3);
    }

    #[test]
    fn test_set_status_updates_store_and_view() {
        let store = seeded_store();
        let session = tester();
        let authorized = AuthorizedStore::new(&store, &session);
        let cases = list_for_project(&authorized, "10").unwrap();

        let updated = set_status(
            &authorized,
            cases,
            SetStatusParameters {
                test_case_id: String::from("2"),
                status: TestCaseStatus::Failed,
            },
        )
        .unwrap();

        assert_eq!(updated[0].status, TestCaseStatus::Pending);
        assert_eq!(updated[1].status, TestCaseStatus::Failed);
        assert_eq!(store.test_cases.borrow()[1].status, TestCaseStatus::Failed);
    }

    #[test]
    fn test_set_status_outside_project_is_rejected() {
        let store = seeded_store();
        let session = tester();
        let authorized = AuthorizedStore::new(&store, &session);
        let cases = list_for_project(&authorized, "10").unwrap();
        let calls_before = store.calls.get();

        let result = set_status(
            &authorized,
            cases,
            SetStatusParameters {
                test_case_id: String::from("3"),
                status: TestCaseStatus::Failed,
            },
        );

        assert!(matches!(result, Err(SetStatusError::TestCaseNotFound(id)) if id == "3"));
        assert_eq!(store.calls.get(), calls_before);
    }

    #[test]
    fn test_store_failure_leaves_status_unchanged() {
        let store = seeded_store();
        let session = tester();
        let authorized = AuthorizedStore::new(&store, &session);
        let cases = list_for_project(&authorized, "10").unwrap();
        store.unreachable.set(true);

        let result = set_status(
            &authorized,
            cases,
            SetStatusParameters {
                test_case_id: String::from("1"),
                status: TestCaseStatus::Passed,
            },
        );

        assert!(matches!(
            result,
            Err(SetStatusError::Access(DataAccessError::Transport(_)))
        ));
        assert_eq!(store.test_cases.borrow()[0].status, TestCaseStatus::Pending);
    }
}
