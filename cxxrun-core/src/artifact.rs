//! Location and cleanup of the temporary compiled program.

use std::io;
use std::path::{Path, PathBuf};

use cxxrun_config::ArtifactNaming;
use tracing::{debug, warn};

#[cfg(windows)]
const ARTIFACT_STEM: &str = ".cpiout";
#[cfg(windows)]
const ARTIFACT_EXT: &str = ".exe";
#[cfg(not(windows))]
const ARTIFACT_STEM: &str = ".cpi";
#[cfg(not(windows))]
const ARTIFACT_EXT: &str = ".out";

/// Path of the compiled program.
///
/// `dir` defaults to the user's home directory (the system temp directory
/// when there is none).
pub fn artifact_path(naming: ArtifactNaming, dir: Option<&Path>) -> PathBuf {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => dirs::home_dir().unwrap_or_else(std::env::temp_dir),
    };
    let name = match naming {
        ArtifactNaming::PerUser => format!("{ARTIFACT_STEM}{ARTIFACT_EXT}"),
        ArtifactNaming::PerProcess => {
            format!("{ARTIFACT_STEM}-{}{ARTIFACT_EXT}", std::process::id())
        }
    };
    dir.join(name)
}

/// Removes the artifact when dropped, whatever happened in between.
#[derive(Debug)]
pub(crate) struct ArtifactGuard {
    path: PathBuf,
}

impl ArtifactGuard {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(target: "cxxrun::compiler", path = %self.path.display(), "artifact removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(target: "cxxrun::compiler", path = %self.path.display(), error = %e, "cannot remove artifact")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_user_name_is_fixed() {
        let dir = Path::new("/home/someone");
        let a = artifact_path(ArtifactNaming::PerUser, Some(dir));
        let b = artifact_path(ArtifactNaming::PerUser, Some(dir));
        assert_eq!(a, b);
        assert_eq!(a.parent(), Some(dir));
    }

    #[test]
    fn test_per_process_name_contains_pid() {
        let path = artifact_path(ArtifactNaming::PerProcess, Some(Path::new("/tmp")));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.contains(&std::process::id().to_string()));
    }

    #[test]
    fn test_guard_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.out");
        std::fs::write(&path, b"binary").unwrap();
        {
            let guard = ArtifactGuard::new(path.clone());
            assert!(guard.path().exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_guard_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        drop(ArtifactGuard::new(dir.path().join("never-built")));
    }
}
