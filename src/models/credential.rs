use crate::models::session::Role;

#[derive(Debug, Clone)]
pub struct Credential {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub display_name: String,
}

/// Known operators. Lookups are linear; nothing here is meant to be secure.
#[derive(Debug, Clone)]
pub struct CredentialDirectory {
    credentials: Vec<Credential>,
}

impl CredentialDirectory {
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self { credentials }
    }

    /// The two demo accounts shown on the login screen
    pub fn demo() -> Self {
        Self::new(vec![
            Credential {
                email: String::from("admin@testmagic.com"),
                password: String::from("admin123"),
                role: Role::Admin,
                display_name: String::from("Admin"),
            },
            Credential {
                email: String::from("tester@testmagic.com"),
                password: String::from("tester123"),
                role: Role::Tester,
                display_name: String::from("Rutik Erole"),
            },
        ])
    }

    pub fn find(&self, role: Role, email: &str, password: &str) -> Option<&Credential> {
        self.credentials
            .iter()
            .find(|c| c.role == role && c.email == email && c.password == password)
    }

    pub fn display_name(&self, email: &str) -> Option<&str> {
        self.credentials
            .iter()
            .find(|c| c.email == email)
            .map(|c| c.display_name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Credential> {
        self.credentials.iter()
    }
}

impl Default for CredentialDirectory {
    fn default() -> Self {
        Self::demo()
    }
}
