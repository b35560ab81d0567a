//! Unpacking of bundle archives (`.tar.gz`) next to the store.
//!
//! Archives are unpacked into a staging directory created beside the store
//! root, so the final install is a pair of renames on one filesystem. The
//! staging directory is removed when the [`StagedBundle`] is dropped,
//! together with any previous bundle it displaced.

use flate2::read::GzDecoder;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tar::Archive;
use tempfile::TempDir;
use tracing::{debug, error};

use crate::store::{BundleStore, INDEX_FILE};

const UNPACK_DIR: &str = "unpacked";
const PREVIOUS_DIR: &str = "previous";

#[derive(Debug)]
pub struct StagedBundle {
    staging: TempDir,
    root: PathBuf,
}

/// Directory that holds `store_root`. Roots like `.` or `/` name no entry of
/// their own and cannot be swapped by rename.
fn parent_dir(store_root: &Path) -> io::Result<PathBuf> {
    let root = std::path::absolute(store_root)?;
    match (root.file_name(), root.parent()) {
        (Some(_), Some(parent)) => Ok(parent.to_path_buf()),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("store root {} has no parent directory", store_root.display()),
        )),
    }
}

impl StagedBundle {
    /// Unpack a gzip-compressed tarball into a fresh staging directory beside
    /// `store_root`. Nothing under `store_root` is touched.
    pub fn unpack(archive: &[u8], store_root: &Path) -> io::Result<Self> {
        let parent = parent_dir(store_root)?;
        fs::create_dir_all(&parent)?;

        let staging = tempfile::Builder::new()
            .prefix(".jdocs-staging-")
            .tempdir_in(&parent)?;
        let unpack_dir = staging.path().join(UNPACK_DIR);
        fs::create_dir(&unpack_dir)?;

        let mut archive = Archive::new(GzDecoder::new(archive));
        archive.set_preserve_permissions(false);
        archive.unpack(&unpack_dir)?;

        let root = bundle_root(&unpack_dir)?;
        debug!(staging = %root.display(), "archive unpacked");
        Ok(Self { staging, root })
    }

    /// Read-only view of the staged content, laid out like the final store.
    pub fn store(&self) -> BundleStore {
        BundleStore::new(&self.root)
    }

    /// Move the staged bundle to `target`, replacing whatever is there.
    ///
    /// The old content is moved aside first and restored if the second
    /// rename fails, so `target` always holds either the old or the new
    /// bundle in full.
    pub fn install(self, target: &Path) -> io::Result<()> {
        parent_dir(target)?;
        let previous = self.staging.path().join(PREVIOUS_DIR);
        let had_previous = target.exists();

        if had_previous {
            fs::rename(target, &previous)?;
        }

        if let Err(e) = fs::rename(&self.root, target) {
            if had_previous {
                restore_previous(self.staging, &previous, target)?;
            }
            return Err(e);
        }

        debug!(target = %target.display(), "bundle installed");
        Ok(())
    }
}

/// Move the displaced bundle back to `target`. If that fails as well the
/// staging directory is kept, so the old bundle stays on disk.
fn restore_previous(staging: TempDir, previous: &Path, target: &Path) -> io::Result<()> {
    if let Err(e) = fs::rename(previous, target) {
        let kept = staging.keep();
        error!(
            previous = %kept.join(PREVIOUS_DIR).display(),
            target = %target.display(),
            error = %e,
            "failed to restore previous bundle, it was left in the staging directory"
        );
        return Err(e);
    }
    Ok(())
}

/// Archives that wrap everything in a single top-level directory are
/// flattened to that directory.
fn bundle_root(unpack_dir: &Path) -> io::Result<PathBuf> {
    if unpack_dir.join(INDEX_FILE).exists() {
        return Ok(unpack_dir.to_path_buf());
    }

    let entries: Vec<_> = fs::read_dir(unpack_dir)?.collect::<Result<_, _>>()?;
    if let [only] = entries.as_slice() {
        if only.file_type()?.is_dir() {
            return Ok(only.path());
        }
    }
    Ok(unpack_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::build_archive;

    #[test]
    fn test_unpack_flat_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = build_archive(&[
            ("class_lookup.json", b"{}"),
            ("java/lang/String.md", b"# String"),
        ]);

        let staged = StagedBundle::unpack(&archive, &dir.path().join("docs")).unwrap();
        let store = staged.store();
        assert!(store.has_index());
        assert_eq!(
            fs::read_to_string(store.root().join("java/lang/String.md")).unwrap(),
            "# String"
        );
        assert!(!dir.path().join("docs").exists());
    }

    #[test]
    fn test_unpack_flattens_single_top_level_dir() {
        let dir = tempfile::tempdir().unwrap();
        let archive = build_archive(&[
            ("javadoc-21/class_lookup.json", b"{}"),
            ("javadoc-21/java/util/List.md", b"# List"),
        ]);

        let staged = StagedBundle::unpack(&archive, &dir.path().join("docs")).unwrap();
        let store = staged.store();
        assert!(store.has_index());
        assert!(store.root().join("java/util/List.md").is_file());
    }

    #[test]
    fn test_unpack_garbage_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(StagedBundle::unpack(b"definitely not gzip", &dir.path().join("docs")).is_err());
    }

    #[test]
    fn test_install_replaces_previous_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("docs");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("old.md"), "old").unwrap();

        let archive = build_archive(&[("class_lookup.json", b"{}"), ("new.md", b"new")]);
        StagedBundle::unpack(&archive, &target)
            .unwrap()
            .install(&target)
            .unwrap();

        assert!(target.join("new.md").is_file());
        assert!(!target.join("old.md").exists());

        // Staging directories are cleaned up once installed.
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(".jdocs-staging-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_root_without_parent_rejected() {
        let archive = build_archive(&[("class_lookup.json", b"{}")]);
        let err = StagedBundle::unpack(&archive, Path::new("/")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_failed_restore_keeps_previous_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let staging = tempfile::Builder::new()
            .prefix(".jdocs-staging-")
            .tempdir_in(dir.path())
            .unwrap();
        let staging_path = staging.path().to_path_buf();
        let previous = staging_path.join(PREVIOUS_DIR);
        fs::create_dir(&previous).unwrap();
        fs::write(previous.join("old.md"), "old").unwrap();

        // Parent of the target is gone, so the rename back cannot succeed.
        let target = dir.path().join("gone").join("docs");
        assert!(restore_previous(staging, &previous, &target).is_err());

        assert_eq!(
            fs::read_to_string(staging_path.join(PREVIOUS_DIR).join("old.md")).unwrap(),
            "old"
        );
    }
}
