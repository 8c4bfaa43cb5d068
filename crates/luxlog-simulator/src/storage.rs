//! Host-filesystem block storage
//!
//! Maps the device mount point onto a directory on the host, with the
//! same open/write/close-per-operation discipline the SD card adapter
//! has. `create_file` and `append` use create-new and append-only open
//! modes so the simulator exercises the same already-exists and
//! open-failure paths as the card.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use luxlog_core::storage::{BlockStorage, StorageError};

pub struct FsStorage {
    root: PathBuf,
    mount_point: String,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>, mount_point: &str) -> Self {
        Self {
            root: root.into(),
            mount_point: mount_point.to_owned(),
        }
    }

    fn host_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let rel = path
            .strip_prefix(self.mount_point.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or(StorageError::Io {
                details: "path is outside the mount point",
            })?;
        Ok(self.root.join(Path::new(rel)))
    }
}

impl BlockStorage for FsStorage {
    /// "Inserting the card": the backing directory is created on first
    /// mount and reused afterwards.
    fn mount(&mut self, mount_point: &str) -> Result<(), StorageError> {
        if mount_point != self.mount_point {
            return Err(StorageError::Io {
                details: "unknown mount point",
            });
        }
        fs::create_dir_all(&self.root).map_err(|_| StorageError::Io {
            details: "could not create backing directory",
        })
    }

    fn unmount(&mut self) -> Result<(), StorageError> {
        Ok(())
    }

    fn create_dir(&mut self, dir_path: &str) -> Result<(), StorageError> {
        let host = self.host_path(dir_path)?;
        match fs::create_dir(&host) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(StorageError::AlreadyExists),
            Err(_) => Err(StorageError::Io {
                details: "directory creation failed",
            }),
        }
    }

    fn create_file(&mut self, file_path: &str) -> Result<(), StorageError> {
        let host = self.host_path(file_path)?;
        match OpenOptions::new().write(true).create_new(true).open(&host) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(StorageError::AlreadyExists),
            Err(_) => Err(StorageError::Io {
                details: "file creation failed",
            }),
        }
    }

    fn append(&mut self, file_path: &str, data: &[u8]) -> Result<(), StorageError> {
        let host = self.host_path(file_path)?;
        // Append-only without create: a missing file fails the open, like
        // the device's open-for-append.
        let mut file = OpenOptions::new()
            .append(true)
            .open(&host)
            .map_err(|_| StorageError::OpenFailed)?;
        file.write_all(data).map_err(|_| StorageError::Io {
            details: "write failed",
        })
    }
}
