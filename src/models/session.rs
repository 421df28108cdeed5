use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Tester,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Tester => "tester",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown role '{0}' (expected admin or tester)")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "tester" => Ok(Role::Tester),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// Who is signed in on this device
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub email: String,
    pub role: Role,
}

/// Session handed to protected views and to the authorization boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub record: SessionRecord,
    /// Name used in project assignments, falls back to the email
    pub display_name: String,
}

impl SessionContext {
    pub fn new(record: SessionRecord, display_name: Option<String>) -> Self {
        let display_name = display_name.unwrap_or_else(|| record.email.clone());
        Self {
            record,
            display_name,
        }
    }

    pub fn role(&self) -> Role {
        self.record.role
    }

    pub fn email(&self) -> &str {
        &self.record.email
    }
}
