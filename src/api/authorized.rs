use crate::{
    api::{DataAccessError, ResourceStore, TestCaseScope},
    models::{
        project::Project,
        session::{Role, SessionContext},
        test_case::{TestCase, TestCaseStatus},
    },
};

/// Data access as seen by a signed-in operator. Role checks happen here,
/// before anything reaches the store.
pub struct AuthorizedStore<'a, S: ResourceStore> {
    inner: &'a S,
    session: &'a SessionContext,
}

impl<'a, S: ResourceStore> AuthorizedStore<'a, S> {
    pub fn new(inner: &'a S, session: &'a SessionContext) -> Self {
        Self { inner, session }
    }

    pub fn session(&self) -> &SessionContext {
        self.session
    }

    fn require(&self, required: Role) -> Result<(), DataAccessError> {
        let actual = self.session.role();
        if actual != required {
            tracing::warn!(%required, %actual, email = self.session.email(), "rejected by role check");
            return Err(DataAccessError::Unauthorized { required, actual });
        }
        Ok(())
    }

    pub fn list_projects(&self) -> Result<Vec<Project>, DataAccessError> {
        Ok(self.inner.list_projects()?)
    }

    pub fn create_project(&self, draft: &Project) -> Result<Project, DataAccessError> {
        self.require(Role::Admin)?;
        Ok(self.inner.create_project(draft)?)
    }

    pub fn delete_project(&self, id: &str) -> Result<(), DataAccessError> {
        self.require(Role::Admin)?;
        Ok(self.inner.delete_project(id)?)
    }

    pub fn list_test_cases(&self, scope: &TestCaseScope) -> Result<Vec<TestCase>, DataAccessError> {
        Ok(self.inner.list_test_cases(scope)?)
    }

    pub fn update_test_case_status(
        &self,
        id: &str,
        status: TestCaseStatus,
    ) -> Result<TestCase, DataAccessError> {
        self.require(Role::Tester)?;
        Ok(self.inner.update_test_case_status(id, status)?)
    }
}
