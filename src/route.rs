use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::models::session::Role;

/// Navigable views
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    AdminDashboard,
    TesterDashboard,
    AddProject,
    ProjectDetails { role: Role, id: String },
    ProjectReport { role: Role, id: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("Unknown route '{0}'")]
    Unknown(String),
}

impl Route {
    /// Dashboard a role lands on after signing in
    pub fn landing(role: Role) -> Route {
        match role {
            Role::Admin => Route::AdminDashboard,
            Role::Tester => Route::TesterDashboard,
        }
    }

    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::Home | Route::Login => None,
            Route::AdminDashboard | Route::AddProject => Some(Role::Admin),
            Route::TesterDashboard => Some(Role::Tester),
            Route::ProjectDetails { role, .. } | Route::ProjectReport { role, .. } => Some(*role),
        }
    }

    /// Where the "back" action of a view leads
    pub fn back(&self) -> Option<Route> {
        match self {
            Route::Home => None,
            Route::Login | Route::AdminDashboard | Route::TesterDashboard => Some(Route::Home),
            Route::AddProject => Some(Route::AdminDashboard),
            Route::ProjectDetails { role, .. } => Some(Route::landing(*role)),
            Route::ProjectReport { role, id } => Some(Route::ProjectDetails {
                role: *role,
                id: id.clone(),
            }),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => String::from("/"),
            Route::Login => String::from("/login"),
            Route::AdminDashboard => String::from("/admin"),
            Route::TesterDashboard => String::from("/tester"),
            Route::AddProject => String::from("/add-project"),
            Route::ProjectDetails { role, id } => format!("/{role}/project/{id}"),
            Route::ProjectReport { role, id } => format!("/{role}/project/report/{id}"),
        }
    }

    pub fn parse(path: &str) -> Result<Route, RouteError> {
        let unknown = || RouteError::Unknown(path.to_string());

        let trimmed = path.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Err(unknown());
        };
        let rest = rest.strip_suffix('/').unwrap_or(rest);

        let segments: Vec<&str> = if rest.is_empty() {
            vec![]
        } else {
            rest.split('/').collect()
        };

        if segments.iter().any(|s| s.is_empty()) {
            return Err(unknown());
        }

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["admin"] => Route::AdminDashboard,
            ["tester"] => Route::TesterDashboard,
            ["add-project"] => Route::AddProject,
            ["admin", "project", id] => Route::ProjectDetails {
                role: Role::Admin,
                id: id.to_string(),
            },
            ["tester", "project", id] => Route::ProjectDetails {
                role: Role::Tester,
                id: id.to_string(),
            },
            ["admin", "project", "report", id] => Route::ProjectReport {
                role: Role::Admin,
                id: id.to_string(),
            },
            ["tester", "project", "report", id] => Route::ProjectReport {
                role: Role::Tester,
                id: id.to_string(),
            },
            _ => return Err(unknown()),
        };

        Ok(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s)
    }
}
