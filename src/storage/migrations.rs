use serde_json::{Value, json};

use crate::{models::session::SessionRecord, storage::StorageError};

type MigrationFn = fn(Value) -> Result<Value, StorageError>;

fn get_migrations() -> Vec<MigrationFn> {
    vec![collapse_legacy_keys]
}

/// Returns 1 if version field is missing (the browser-era key layout)
pub fn detect_version(value: &Value) -> Result<u32, StorageError> {
    match value.get("version") {
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or(StorageError::InvalidVersion),
        None => Ok(1),
    }
}

/// Migrations are applied sequentially: v1→v2→v3→...→target
pub fn apply_migrations(
    mut data: Value,
    from_version: u32,
    to_version: u32,
) -> Result<Value, StorageError> {
    if from_version == to_version {
        return Ok(data);
    }

    if from_version > to_version {
        return Err(StorageError::FutureVersion(from_version));
    }

    let migrations = get_migrations();

    for version in from_version..to_version {
        let migration_idx = (version - 1) as usize; // v1→v2 is at index 0

        if migration_idx >= migrations.len() {
            return Err(StorageError::UnsupportedVersion(version));
        }

        data = migrations[migration_idx](data)?;
    }

    Ok(data)
}

/// v1 → v2: `loggedInUser` (a JSON document stored as a string) plus the
/// duplicate `userRole`/`userEmail` keys become a single `session` record.
/// `loggedInUser` wins; the duplicates are only consulted when it is missing
/// or unreadable. Anything unusable means nobody is signed in.
fn collapse_legacy_keys(data: Value) -> Result<Value, StorageError> {
    let from_logged_in_user = data
        .get("loggedInUser")
        .and_then(Value::as_str)
        .and_then(|raw| serde_json::from_str::<SessionRecord>(raw).ok());

    let from_duplicates = || {
        let email = data.get("userEmail").and_then(Value::as_str)?;
        let role = data.get("userRole").and_then(Value::as_str)?.parse().ok()?;
        Some(SessionRecord {
            email: email.to_string(),
            role,
        })
    };

    let session = from_logged_in_user.or_else(from_duplicates);

    Ok(json!({
        "version": 2,
        "session": session,
    }))
}
