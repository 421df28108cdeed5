use thiserror::Error;

use crate::models::{
    project::Project,
    session::Role,
    test_case::{TestCase, TestCaseStatus},
};

pub mod authorized;
#[cfg(test)]
pub mod fake;
pub mod http;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid store URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} returned status {status}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
    },

    #[error("Could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Which test cases to fetch. The store keeps a single global collection, so
/// narrowing it to one project has to be asked for explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestCaseScope {
    Global,
    Project(String),
}

/// Remote collections backing projects and test cases
pub trait ResourceStore {
    fn list_projects(&self) -> Result<Vec<Project>, TransportError>;
    /// `draft.id` is ignored; the returned record carries the store's id
    fn create_project(&self, draft: &Project) -> Result<Project, TransportError>;
    fn delete_project(&self, id: &str) -> Result<(), TransportError>;
    fn list_test_cases(&self, scope: &TestCaseScope) -> Result<Vec<TestCase>, TransportError>;
    fn update_test_case_status(
        &self,
        id: &str,
        status: TestCaseStatus,
    ) -> Result<TestCase, TransportError>;
}

#[derive(Error, Debug)]
pub enum DataAccessError {
    #[error("This action requires the {required} role (signed in as {actual})")]
    Unauthorized { required: Role, actual: Role },

    #[error(transparent)]
    Transport(#[from] TransportError),
}
