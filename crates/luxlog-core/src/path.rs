//! Bounded storage path construction
//!
//! Log records live in one fixed directory and file on the removable
//! medium: `<mount>/data/data.txt`. Paths are assembled into a fixed
//! 128-byte buffer with a compute-then-commit contract: the length check
//! happens before a single byte is written, and a returned path is always
//! complete, never truncated.

use core::fmt::Write;

use thiserror_no_std::Error;

/// Directory holding the log file, directly under the mount point.
pub const DATA_DIR_NAME: &str = "data";

/// Name of the append-only log file inside [`DATA_DIR_NAME`].
pub const DATA_FILE_NAME: &str = "data.txt";

/// Path buffer capacity in bytes, terminator included.
pub const MAX_PATH: usize = 128;

/// Bounded path buffer. Each call to [`build_path`] produces a fresh one,
/// consumed immediately by the caller.
pub type StoragePath = heapless::String<MAX_PATH>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    /// The assembled path would exceed [`MAX_PATH`] bytes. Recoverable:
    /// the caller abandons the operation for this cycle.
    #[error("storage path would exceed {MAX_PATH} bytes")]
    TooLong,
}

/// Which path variant to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// `<mount>/data`
    Directory,
    /// `<mount>/data/data.txt`
    File,
}

/// Assembles `<mount>/data[/data.txt]` or fails with [`PathError::TooLong`].
///
/// The capacity check is always against the worst case, the full file path
/// plus terminator, even when only the shorter directory variant is being
/// built. Directory and file paths therefore share one capacity
/// reservation: a mount point that can hold the directory path but not the
/// file path is rejected up front instead of overflowing later when the
/// file path is built from the same base.
pub fn build_path(mount_point: &str, kind: PathKind) -> Result<StoragePath, PathError> {
    let worst_case =
        mount_point.len() + 1 + DATA_DIR_NAME.len() + 1 + DATA_FILE_NAME.len() + 1;
    if worst_case > MAX_PATH {
        return Err(PathError::TooLong);
    }

    let mut path = StoragePath::new();
    match kind {
        PathKind::Directory => {
            let _ = write!(path, "{mount_point}/{DATA_DIR_NAME}");
        }
        PathKind::File => {
            let _ = write!(path, "{mount_point}/{DATA_DIR_NAME}/{DATA_FILE_NAME}");
        }
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_exact_file_path() {
        let path = build_path("/SD:", PathKind::File).unwrap();
        assert_eq!(path.as_str(), "/SD:/data/data.txt");
    }

    #[test]
    fn builds_exact_directory_path() {
        let path = build_path("/SD:", PathKind::Directory).unwrap();
        assert_eq!(path.as_str(), "/SD:/data");
    }

    #[test]
    fn longest_accepted_mount_point_fills_the_buffer() {
        // mount + "/data/data.txt" + terminator == 128 exactly
        let mount = "m".repeat(MAX_PATH - DATA_DIR_NAME.len() - DATA_FILE_NAME.len() - 3);
        let path = build_path(&mount, PathKind::File).unwrap();
        assert_eq!(path.len(), MAX_PATH - 1);
    }

    #[test]
    fn overlong_mount_point_fails_before_writing() {
        let mount = "m".repeat(MAX_PATH - DATA_DIR_NAME.len() - DATA_FILE_NAME.len() - 2);
        assert_eq!(build_path(&mount, PathKind::File), Err(PathError::TooLong));
    }

    #[test]
    fn directory_variant_shares_the_file_path_reservation() {
        // A mount point that would fit the directory path but not the file
        // path must fail for both variants.
        let mount = "m".repeat(MAX_PATH - DATA_DIR_NAME.len() - 2);
        assert_eq!(
            build_path(&mount, PathKind::Directory),
            Err(PathError::TooLong)
        );
        assert_eq!(build_path(&mount, PathKind::File), Err(PathError::TooLong));
    }
}
