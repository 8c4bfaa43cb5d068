//! Storage bootstrap and record appending
//!
//! The removable medium is reached through the [`BlockStorage`]
//! collaborator trait; concrete implementations (SD card over
//! `embedded-sdmmc`, `std::fs` in the simulator) open, write, and close on
//! every operation so no handle outlives a single call. SD card access is
//! blocking, as are the implementations behind this trait; only the sensor
//! and clock collaborators are async.
//!
//! [`bootstrap`] creates the log directory and file once per device
//! session; [`append_record`] appends one formatted record line.

use log::{debug, error, info};
use thiserror_no_std::Error;

use crate::path::{self, PathError, PathKind};
use crate::record::SampleRecord;

/// Errors reported by a [`BlockStorage`] implementation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The directory or file already exists. Callers creating the log
    /// layout treat this as success.
    #[error("target already exists")]
    AlreadyExists,
    /// The target could not be opened.
    #[error("open failed")]
    OpenFailed,
    /// Any other medium-level failure.
    #[error("storage I/O failed: {details}")]
    Io { details: &'static str },
}

/// Failures of the logging pipeline itself. None of these are fatal: every
/// variant is contained to the current cycle and surfaced as a log line,
/// and the next attempt is simply the next scheduled cycle.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogError {
    /// The storage path would exceed its fixed capacity.
    #[error("{0}")]
    TooLong(#[from] PathError),
    /// The log directory could not be created at bootstrap.
    #[error("could not create log directory")]
    DirCreateFailed,
    /// The log file could not be created at bootstrap.
    #[error("could not create log file")]
    FileCreateFailed,
    /// The log file could not be opened for append; the record for this
    /// cycle is lost. No retry, no backlog.
    #[error("could not open log file for append")]
    OpenFailed,
}

/// Collaborator interface to the block-storage medium.
///
/// `append` covers the whole open-for-append / write / close sequence of
/// one record; implementations must close the file on every exit path,
/// including failures after a successful open. A write or close failure
/// after open succeeded is indistinguishable from an open failure at this
/// boundary; that silent data-loss window is a known, accepted weakness of
/// the best-effort contract.
pub trait BlockStorage {
    fn mount(&mut self, mount_point: &str) -> Result<(), StorageError>;
    fn unmount(&mut self) -> Result<(), StorageError>;
    fn create_dir(&mut self, dir_path: &str) -> Result<(), StorageError>;
    /// Creates the file if missing; must not truncate an existing one.
    fn create_file(&mut self, file_path: &str) -> Result<(), StorageError>;
    fn append(&mut self, file_path: &str, data: &[u8]) -> Result<(), StorageError>;
}

/// Ensures the log directory and file exist on the mounted medium.
///
/// Idempotent: "already exists" from either creation is success. A
/// directory-creation failure is logged and reported but does not stop the
/// file from being attempted; a storage hiccup at boot should not stop the
/// acquisition loop, only the subsequent write may fail instead. Invoked
/// at most once per process lifetime, guarded by the cycle's session flag;
/// callers must not invoke it twice.
pub fn bootstrap<S: BlockStorage>(storage: &mut S, mount_point: &str) -> Result<(), LogError> {
    let dir_path = path::build_path(mount_point, PathKind::Directory)?;
    let dir_failed = match storage.create_dir(&dir_path) {
        Ok(()) => {
            info!("created log directory {dir_path}");
            false
        }
        Err(StorageError::AlreadyExists) => {
            debug!("log directory {dir_path} already exists");
            false
        }
        Err(e) => {
            error!("failed to create log directory {dir_path}: {e}");
            true
        }
    };

    let file_path = path::build_path(mount_point, PathKind::File)?;
    match storage.create_file(&file_path) {
        Ok(()) => info!("created log file {file_path}"),
        Err(StorageError::AlreadyExists) => debug!("log file {file_path} already exists"),
        Err(e) => {
            error!("failed to create log file {file_path}: {e}");
            return Err(LogError::FileCreateFailed);
        }
    }

    if dir_failed {
        return Err(LogError::DirCreateFailed);
    }
    Ok(())
}

/// Formats one record line and appends it to the log file.
///
/// Opens the file in append mode, writes exactly the formatted byte
/// length, and closes it again (inside the collaborator's `append`). On
/// failure the record is lost; the caller logs and moves on.
pub fn append_record<S: BlockStorage>(
    storage: &mut S,
    mount_point: &str,
    record: &SampleRecord,
) -> Result<(), LogError> {
    let file_path = path::build_path(mount_point, PathKind::File)?;
    let line = record.format_line();
    storage
        .append(&file_path, line.as_bytes())
        .map_err(|e| {
            error!("failed to append record to {file_path}: {e}");
            LogError::OpenFailed
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Timestamp;
    use alloc::string::String;
    use alloc::vec::Vec;

    /// Scripted in-memory storage collaborator with call counting.
    #[derive(Default)]
    struct MockStorage {
        create_dir_calls: usize,
        create_file_calls: usize,
        dir_exists: bool,
        file_exists: bool,
        dir_create_error: Option<StorageError>,
        file_create_error: Option<StorageError>,
        written: Vec<String>,
    }

    impl BlockStorage for MockStorage {
        fn mount(&mut self, _mount_point: &str) -> Result<(), StorageError> {
            Ok(())
        }

        fn unmount(&mut self) -> Result<(), StorageError> {
            Ok(())
        }

        fn create_dir(&mut self, _dir_path: &str) -> Result<(), StorageError> {
            self.create_dir_calls += 1;
            if let Some(e) = self.dir_create_error {
                return Err(e);
            }
            if self.dir_exists {
                return Err(StorageError::AlreadyExists);
            }
            self.dir_exists = true;
            Ok(())
        }

        fn create_file(&mut self, _file_path: &str) -> Result<(), StorageError> {
            self.create_file_calls += 1;
            if let Some(e) = self.file_create_error {
                return Err(e);
            }
            if self.file_exists {
                return Err(StorageError::AlreadyExists);
            }
            self.file_exists = true;
            Ok(())
        }

        fn append(&mut self, _file_path: &str, data: &[u8]) -> Result<(), StorageError> {
            if !self.file_exists {
                return Err(StorageError::OpenFailed);
            }
            self.written
                .push(String::from_utf8(data.to_vec()).unwrap());
            Ok(())
        }
    }

    fn record() -> SampleRecord {
        let mut timestamp = Timestamp::new();
        timestamp.push_str("2024-01-01 12:00:00 Mon").unwrap();
        SampleRecord {
            lux: 123,
            temperature_f: 72.5,
            humidity_pct: 45.25,
            timestamp,
        }
    }

    #[test]
    fn bootstrap_creates_directory_and_file() {
        let mut storage = MockStorage::default();
        bootstrap(&mut storage, "/SD:").unwrap();
        assert!(storage.dir_exists);
        assert!(storage.file_exists);
    }

    #[test]
    fn bootstrap_tolerates_existing_layout() {
        let mut storage = MockStorage {
            dir_exists: true,
            file_exists: true,
            ..MockStorage::default()
        };
        assert_eq!(bootstrap(&mut storage, "/SD:"), Ok(()));
    }

    #[test]
    fn bootstrap_still_creates_file_when_directory_creation_fails() {
        let mut storage = MockStorage {
            dir_create_error: Some(StorageError::Io { details: "medium" }),
            ..MockStorage::default()
        };
        assert_eq!(
            bootstrap(&mut storage, "/SD:"),
            Err(LogError::DirCreateFailed)
        );
        assert_eq!(storage.create_file_calls, 1);
    }

    #[test]
    fn bootstrap_reports_file_creation_failure() {
        let mut storage = MockStorage {
            file_create_error: Some(StorageError::Io { details: "medium" }),
            ..MockStorage::default()
        };
        assert_eq!(
            bootstrap(&mut storage, "/SD:"),
            Err(LogError::FileCreateFailed)
        );
    }

    #[test]
    fn bootstrap_propagates_overlong_mount_point() {
        let mut storage = MockStorage::default();
        let mount = "m".repeat(140);
        assert_eq!(
            bootstrap(&mut storage, &mount),
            Err(LogError::TooLong(PathError::TooLong))
        );
        assert_eq!(storage.create_dir_calls, 0);
    }

    #[test]
    fn append_writes_one_exact_line() {
        let mut storage = MockStorage {
            file_exists: true,
            ..MockStorage::default()
        };
        append_record(&mut storage, "/SD:", &record()).unwrap();
        assert_eq!(
            storage.written,
            ["[2024-01-01 12:00:00 Mon], 123 lux, 72.500000 F, 45.250000%\n"]
        );
    }

    #[test]
    fn append_reports_open_failure() {
        let mut storage = MockStorage::default();
        assert_eq!(
            append_record(&mut storage, "/SD:", &record()),
            Err(LogError::OpenFailed)
        );
    }
}
