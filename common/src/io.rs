//! File system helpers shared by the export backends.
//!
//! Every export goes through the same three steps: validate the path
//! argument, expand a leading `~`, and make sure the parent directory
//! exists. Writes truncate any existing file.

use std::fs;
use std::path::{Component, Path, PathBuf};

use directories::BaseDirs;
use tracing::debug;

use crate::error::{CommonError, ErrorContext, Result};

/// Reject path arguments that can never name a writable file.
///
/// Performs no I/O. A path must be non-empty, valid UTF-8 and end in a
/// file name: no trailing separator and no final `.` or `..`.
pub fn validate_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(CommonError::invalid_argument("path is empty"));
    }
    let Some(text) = path.to_str() else {
        return Err(CommonError::invalid_argument(format!(
            "path is not a valid UTF-8 string: {}",
            path.display()
        )));
    };
    // `components()` drops a trailing separator and `.` segments.
    let last = text.rsplit(std::path::is_separator).next().unwrap_or(text);
    if last.is_empty() || last == "." {
        return Err(CommonError::invalid_argument(format!(
            "path does not name a file: {text}"
        )));
    }
    match path.components().next_back() {
        Some(Component::Normal(_)) => Ok(()),
        _ => Err(CommonError::invalid_argument(format!(
            "path does not name a file: {}",
            path.display()
        ))),
    }
}

/// Replace a leading `~` with the current user's home directory.
///
/// Paths without a leading `~`, and `~user` forms, are returned unchanged,
/// as is everything when no home directory can be determined.
pub fn expand_home<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match BaseDirs::new() {
            Some(dirs) => dirs.home_dir().join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Validate and expand a path argument in one step.
pub fn resolve_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    validate_path(&path)?;
    Ok(expand_home(path))
}

/// Create the parent directory of `path` (recursively) if it is missing.
///
/// Nothing is created when the parent is empty or `.`.
pub fn ensure_parent_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    let Some(parent) = path.as_ref().parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent == Path::new(".") {
        return Ok(());
    }
    if !parent.exists() {
        debug!(dir = %parent.display(), "creating parent directory");
        fs::create_dir_all(parent)
            .with_io_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Write bytes to a file, creating parent directories first.
pub fn write_bytes_to_file<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    fs::write(path, content).with_io_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

/// Read a whole file into memory.
pub fn read_file_to_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).with_io_context(|| format!("failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("config.json").is_ok());
        assert!(validate_path("a/b/config.json").is_ok());
        assert!(validate_path("~/config.json").is_ok());

        for bad in ["", ".", "..", "a/..", "/", "x/sub/", "x/out.json/.", "x/./"] {
            let err = validate_path(bad).unwrap_err();
            assert!(
                matches!(err, CommonError::InvalidArgument { .. }),
                "{bad:?} should be rejected"
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_path_rejects_non_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"bad\xff.json"));
        assert!(matches!(
            validate_path(path),
            Err(CommonError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("a/b.json"), PathBuf::from("a/b.json"));
        assert_eq!(expand_home("/tmp/x"), PathBuf::from("/tmp/x"));
        assert_eq!(expand_home("~user/x"), PathBuf::from("~user/x"));

        if let Some(dirs) = BaseDirs::new() {
            assert_eq!(expand_home("~/x.json"), dirs.home_dir().join("x.json"));
            assert_eq!(expand_home("~"), dirs.home_dir().to_path_buf());
        }
    }

    #[test]
    fn test_ensure_parent_dir() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("one").join("two").join("out.json");

        ensure_parent_dir(&file).unwrap();
        assert!(dir.path().join("one").join("two").is_dir());
        assert!(!file.exists());

        // Bare file names have nothing to create.
        ensure_parent_dir("out.json").unwrap();
    }

    #[test]
    fn test_write_and_read_bytes() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("nested").join("data.bin");

        write_bytes_to_file(&file, &[1, 2, 3]).unwrap();
        assert_eq!(read_file_to_bytes(&file).unwrap(), vec![1, 2, 3]);

        // Writes truncate.
        write_bytes_to_file(&file, &[9]).unwrap();
        assert_eq!(read_file_to_bytes(&file).unwrap(), vec![9]);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_file_to_bytes(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, CommonError::IoError { .. }));
    }
}
