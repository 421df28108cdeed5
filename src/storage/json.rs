use std::{
    fs::{self, File, OpenOptions, rename, write},
    path::PathBuf,
};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use serde_json::to_string_pretty;
use uuid::Uuid;

use crate::{
    models::session::SessionRecord,
    storage::{SessionStorage, StorageError},
};

/// Current schema version
pub const CURRENT_VERSION: u32 = 2;

#[derive(Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    session: Option<SessionRecord>,
}

pub struct JsonFileSessionStorage {
    path: PathBuf,
}

impl JsonFileSessionStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn lock(&self) -> Result<File, StorageError> {
        let lock_file_path = self.path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_file_path)
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path.clone(),
                source: e,
            })?;
        lock_file
            .lock_exclusive()
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path,
                source: e,
            })?;
        Ok(lock_file)
    }

    fn create_parent_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StorageError::SaveFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }
}

impl SessionStorage for JsonFileSessionStorage {
    fn load(&self) -> Result<Option<SessionRecord>, StorageError> {
        use crate::storage::migrations::{apply_migrations, detect_version};

        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let mut data: serde_json::Value =
                    serde_json::from_str(&content).map_err(|e| StorageError::ParseFailed {
                        path: self.path.clone(),
                        source: e,
                    })?;

                let file_version = detect_version(&data)?;

                if file_version > CURRENT_VERSION {
                    return Err(StorageError::FutureVersion(file_version));
                }

                if file_version < CURRENT_VERSION {
                    tracing::debug!(
                        from = file_version,
                        to = CURRENT_VERSION,
                        "migrating session file"
                    );
                    data = apply_migrations(data, file_version, CURRENT_VERSION)?;
                }

                let file: SessionFile =
                    serde_json::from_value(data).map_err(|e| StorageError::ParseFailed {
                        path: self.path.clone(),
                        source: e,
                    })?;
                Ok(file.session)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::LoadFailed {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn save(&self, session: &SessionRecord) -> Result<(), StorageError> {
        let file = SessionFile {
            version: CURRENT_VERSION,
            session: Some(session.clone()),
        };
        let json =
            to_string_pretty(&file).map_err(|e| StorageError::SerializeFailed { source: e })?;

        self.create_parent_dir()?;

        let unique_temp = format!("{}.tmp.{}", self.path.display(), Uuid::new_v4());
        let temp_path = PathBuf::from(&unique_temp);
        write(&temp_path, json).map_err(|e| StorageError::SaveFailed {
            path: temp_path.clone(),
            source: e,
        })?;

        let lock_file = self.lock()?;

        rename(&temp_path, &self.path).map_err(|e| StorageError::SaveFailed {
            path: self.path.clone(),
            source: e,
        })?;

        lock_file.unlock().map_err(|e| StorageError::SaveFailed {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }

        let lock_file = self.lock()?;

        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StorageError::ClearFailed {
                    path: self.path.clone(),
                    source: e,
                });
            }
        }

        lock_file.unlock().map_err(|e| StorageError::ClearFailed {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(())
    }
}
