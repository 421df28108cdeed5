use reqwest::{
    Url,
    blocking::{Client, RequestBuilder, Response},
};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::{
    api::{ResourceStore, TestCaseScope, TransportError},
    models::{
        project::Project,
        test_case::{TestCase, TestCaseStatus},
    },
};

/// Generic CRUD store reached over HTTP (json-server style)
pub struct HttpResourceStore {
    base_url: Url,
    client: Client,
}

impl HttpResourceStore {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let parsed = Url::parse(base_url).map_err(|e| TransportError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl {
                url: base_url.to_string(),
                reason: String::from("URL cannot be used as a base"),
            });
        }

        Ok(Self {
            base_url: parsed,
            client: Client::new(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: String::from("URL cannot be used as a base"),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(
        &self,
        method: &'static str,
        url: &Url,
        request: RequestBuilder,
    ) -> Result<Response, TransportError> {
        tracing::debug!(method, %url, "sending request");

        let response = request.send().map_err(|e| {
            tracing::warn!(method, %url, error = %e, "request failed");
            TransportError::Request {
                url: url.to_string(),
                source: e,
            }
        })?;

        let status = response.status();
        tracing::debug!(method, %url, status = status.as_u16(), "received response");

        if !status.is_success() {
            tracing::warn!(method, %url, status = status.as_u16(), "non-success status");
            return Err(TransportError::Status {
                method,
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    fn decode<T: DeserializeOwned>(url: &Url, response: Response) -> Result<T, TransportError> {
        response.json().map_err(|e| {
            tracing::warn!(%url, error = %e, "undecodable response body");
            TransportError::Decode {
                url: url.to_string(),
                source: e,
            }
        })
    }
}

impl ResourceStore for HttpResourceStore {
    fn list_projects(&self) -> Result<Vec<Project>, TransportError> {
        let url = self.endpoint(&["projects"])?;
        let response = self.send("GET", &url, self.client.get(url.clone()))?;
        Self::decode(&url, response)
    }

    fn create_project(&self, draft: &Project) -> Result<Project, TransportError> {
        let url = self.endpoint(&["projects"])?;
        let body = Project {
            id: None,
            ..draft.clone()
        };
        let response = self.send("POST", &url, self.client.post(url.clone()).json(&body))?;
        Self::decode(&url, response)
    }

    fn delete_project(&self, id: &str) -> Result<(), TransportError> {
        let url = self.endpoint(&["projects", id])?;
        self.send("DELETE", &url, self.client.delete(url.clone()))?;
        Ok(())
    }

    fn list_test_cases(&self, scope: &TestCaseScope) -> Result<Vec<TestCase>, TransportError> {
        let mut url = self.endpoint(&["testCases"])?;
        if let TestCaseScope::Project(project_id) = scope {
            url.query_pairs_mut().append_pair("project", project_id);
        }
        let response = self.send("GET", &url, self.client.get(url.clone()))?;
        Self::decode(&url, response)
    }

    fn update_test_case_status(
        &self,
        id: &str,
        status: TestCaseStatus,
    ) -> Result<TestCase, TransportError> {
        let url = self.endpoint(&["testCases", id])?;
        let body = json!({ "status": status });
        let response = self.send("PATCH", &url, self.client.patch(url.clone()).json(&body))?;
        Self::decode(&url, response)
    }
}
