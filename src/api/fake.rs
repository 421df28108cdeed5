use std::cell::{Cell, RefCell};

use crate::{
    api::{ResourceStore, TestCaseScope, TransportError},
    models::{
        project::Project,
        test_case::{TestCase, TestCaseStatus},
    },
};

/// In-memory store for service tests. Mirrors the HTTP store's failure shape:
/// unknown ids surface as 404 status errors.
#[derive(Default)]
pub struct FakeStore {
    pub projects: RefCell<Vec<Project>>,
    pub test_cases: RefCell<Vec<TestCase>>,
    pub unreachable: Cell<bool>,
    pub calls: Cell<usize>,
    next_id: Cell<u64>,
}

impl FakeStore {
    pub fn with_data(projects: Vec<Project>, test_cases: Vec<TestCase>) -> Self {
        Self {
            projects: RefCell::new(projects),
            test_cases: RefCell::new(test_cases),
            next_id: Cell::new(100),
            ..Self::default()
        }
    }

    fn check(&self, method: &'static str, url: &str) -> Result<(), TransportError> {
        self.calls.set(self.calls.get() + 1);
        if self.unreachable.get() {
            return Err(TransportError::Status {
                method,
                url: url.to_string(),
                status: 503,
            });
        }
        Ok(())
    }

    fn not_found(method: &'static str, url: String) -> TransportError {
        TransportError::Status {
            method,
            url,
            status: 404,
        }
    }
}

impl ResourceStore for FakeStore {
    fn list_projects(&self) -> Result<Vec<Project>, TransportError> {
        self.check("GET", "/projects")?;
        Ok(self.projects.borrow().clone())
    }

    fn create_project(&self, draft: &Project) -> Result<Project, TransportError> {
        self.check("POST", "/projects")?;
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let created = Project {
            id: Some(id.to_string()),
            ..draft.clone()
        };
        self.projects.borrow_mut().push(created.clone());
        Ok(created)
    }

    fn delete_project(&self, id: &str) -> Result<(), TransportError> {
        let url = format!("/projects/{id}");
        self.check("DELETE", &url)?;
        let mut projects = self.projects.borrow_mut();
        let before = projects.len();
        projects.retain(|p| p.id.as_deref() != Some(id));
        if projects.len() == before {
            return Err(Self::not_found("DELETE", url));
        }
        Ok(())
    }

    fn list_test_cases(&self, scope: &TestCaseScope) -> Result<Vec<TestCase>, TransportError> {
        self.check("GET", "/testCases")?;
        let cases = self.test_cases.borrow();
        Ok(match scope {
            TestCaseScope::Global => cases.clone(),
            TestCaseScope::Project(project_id) => cases
                .iter()
                .filter(|c| c.project.as_deref() == Some(project_id.as_str()))
                .cloned()
                .collect(),
        })
    }

    fn update_test_case_status(
        &self,
        id: &str,
        status: TestCaseStatus,
    ) -> Result<TestCase, TransportError> {
        let url = format!("/testCases/{id}");
        self.check("PATCH", &url)?;
        let mut cases = self.test_cases.borrow_mut();
        match cases.iter_mut().find(|c| c.id == id) {
            Some(case) => {
                case.status = status;
                Ok(case.clone())
            }
            None => Err(Self::not_found("PATCH", url)),
        }
    }
}
