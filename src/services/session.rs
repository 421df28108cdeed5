use thiserror::Error;

use crate::{
    models::{
        credential::CredentialDirectory,
        session::{Role, SessionContext, SessionRecord},
    },
    route::Route,
    services::validation::ValidationErrors,
    storage::{SessionStorage, StorageError},
};

#[derive(Debug, Error)]
pub enum SignInError {
    #[error("{0}")]
    Validation(ValidationErrors),

    /// Deliberately does not say which field was wrong
    #[error("Invalid email or password.")]
    AuthenticationFailure,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct SignInParameters {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Role,
}

#[derive(Debug)]
pub struct SignInResult {
    pub session: SessionRecord,
    pub landing: Route,
}

pub fn sign_in(
    storage: &impl SessionStorage,
    directory: &CredentialDirectory,
    parameters: SignInParameters,
) -> Result<SignInResult, SignInError> {
    let mut errors = ValidationErrors::new();
    errors.require("email", parameters.email.as_deref(), "Email is required.");
    errors.require(
        "password",
        parameters.password.as_deref(),
        "Password is required.",
    );
    errors.into_result().map_err(SignInError::Validation)?;

    let email = parameters.email.unwrap_or_default();
    let password = parameters.password.unwrap_or_default();

    let Some(credential) = directory.find(parameters.role, &email, &password) else {
        tracing::info!(role = %parameters.role, "sign-in rejected");
        return Err(SignInError::AuthenticationFailure);
    };

    let session = SessionRecord {
        email: credential.email.clone(),
        role: credential.role,
    };

    storage.save(&session)?;
    tracing::info!(email = %session.email, role = %session.role, "signed in");

    Ok(SignInResult {
        landing: Route::landing(session.role),
        session,
    })
}

/// Clears the session record; signing out twice is fine
pub fn sign_out(storage: &impl SessionStorage) -> Result<Route, StorageError> {
    storage.clear()?;
    tracing::info!("signed out");
    Ok(Route::Home)
}

/// Reads the persisted record once and resolves the operator's display name
pub fn current_session(
    storage: &impl SessionStorage,
    directory: &CredentialDirectory,
) -> Result<Option<SessionContext>, StorageError> {
    Ok(storage.load()?.map(|record| {
        let display_name = directory.display_name(&record.email).map(String::from);
        SessionContext::new(record, display_name)
    }))
}

#[derive(Debug, PartialEq, Eq)]
pub enum Access {
    /// `None` only for public routes visited while signed out
    Granted(Option<SessionContext>),
    Redirect(Route),
}

/// Gate for entering `route`: protected routes need a session with the
/// matching role, everything else sends the visitor to the public entry.
pub fn guard(route: &Route, session: Option<SessionContext>) -> Access {
    match route.required_role() {
        None => Access::Granted(session),
        Some(required) => match session {
            Some(ctx) if ctx.role() == required => Access::Granted(Some(ctx)),
            Some(ctx) => {
                tracing::debug!(%route, %required, actual = %ctx.role(), "role mismatch, redirecting");
                Access::Redirect(Route::Home)
            }
            None => {
                tracing::debug!(%route, "no session, redirecting");
                Access::Redirect(Route::Home)
            }
        },
    }
}
