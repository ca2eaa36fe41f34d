//! Artifact discovery under the build output directory.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Deployment descriptor expected at the top of every artifact directory.
pub const DESCRIPTOR_FILE: &str = "riff-raff.yaml";

/// The regular files discovered under an artifact root, by absolute path.
#[derive(Debug, Clone)]
pub struct ArtifactFileSet {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl ArtifactFileSet {
    /// Collect every regular file under `root`.
    ///
    /// Refuses to start when the deployment descriptor is missing at the top
    /// level, so a misconfigured run fails before any network call is made.
    pub fn collect(root: &Path) -> Result<Self> {
        let descriptor = root.join(DESCRIPTOR_FILE);
        if !descriptor.is_file() {
            return Err(Error::MissingManifestDescriptor(
                descriptor.display().to_string(),
            ));
        }

        let root = root
            .canonicalize()
            .map_err(|e| Error::DirectoryReadFailed(format!("{}: {e}", root.display())))?;
        let files = walk(&root)?;
        log::debug!(
            "found {} artifact files under {}",
            files.len(),
            root.display()
        );

        Ok(Self { root, files })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Storage key for one of the collected files.
    pub fn upload_key(&self, prefix: &str, file: &Path) -> Result<String> {
        upload_key(prefix, &self.root, file)
    }
}

/// Depth-first listing of every regular file under `root`.
///
/// Directories are expanded from an explicit work list, not by call
/// recursion, so traversal depth is bounded by memory rather than the stack.
/// Any unreadable directory aborts the whole enumeration.
pub fn walk(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| Error::DirectoryReadFailed(e.to_string()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Derive the object key `{prefix}/{relative path}` for `file` under `root`.
///
/// # Examples
///
/// ```
/// use riffraff_publisher::artifacts::upload_key;
/// use std::path::Path;
///
/// let key = upload_key("p/7", Path::new("root"), Path::new("root/sub/file.txt")).unwrap();
/// assert_eq!(key, "p/7/sub/file.txt");
/// ```
pub fn upload_key(prefix: &str, root: &Path, file: &Path) -> Result<String> {
    let relative = file.strip_prefix(root).map_err(|_| Error::PublishFailed {
        key: file.display().to_string(),
        message: format!("not under the artifact directory {}", root.display()),
    })?;

    let mut key = String::from(prefix);
    for component in relative.components() {
        key.push('/');
        key.push_str(&component.as_os_str().to_string_lossy());
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    // root/{a.txt, sub/b.txt, sub/sub2/c.txt}
    fn file_tree() -> Result<tempfile::TempDir> {
        let dir = tempdir()?;
        fs::write(dir.path().join("a.txt"), "a")?;
        fs::create_dir_all(dir.path().join("sub/sub2"))?;
        fs::write(dir.path().join("sub/b.txt"), "b")?;
        fs::write(dir.path().join("sub/sub2/c.txt"), "c")?;
        Ok(dir)
    }

    #[test]
    fn walk_finds_every_regular_file() -> Result<()> {
        let dir = file_tree()?;
        let files = walk(dir.path())?;

        assert_eq!(files.len(), 3);
        for relative in ["a.txt", "sub/b.txt", "sub/sub2/c.txt"] {
            assert!(
                files.iter().any(|f| f.ends_with(relative)),
                "missing {relative}"
            );
        }

        Ok(())
    }

    #[test]
    fn collect_requires_the_descriptor_file() -> Result<()> {
        let dir = file_tree()?;

        let error = ArtifactFileSet::collect(dir.path()).unwrap_err();
        match error {
            Error::MissingManifestDescriptor(path) => {
                assert!(path.ends_with(DESCRIPTOR_FILE));
            }
            other => panic!("unexpected error: {other}"),
        }

        // With the descriptor present the same tree collects fine, and the
        // descriptor itself is part of the file set.
        fs::write(dir.path().join(DESCRIPTOR_FILE), "stacks: []")?;
        let artifacts = ArtifactFileSet::collect(dir.path())?;
        assert_eq!(artifacts.len(), 4);
        assert!(artifacts.files().iter().all(|f| f.is_absolute()));

        Ok(())
    }

    #[test]
    fn upload_key_strips_the_artifact_root() -> Result<()> {
        let dir = file_tree()?;
        fs::write(dir.path().join(DESCRIPTOR_FILE), "stacks: []")?;
        let artifacts = ArtifactFileSet::collect(dir.path())?;

        let file = artifacts
            .files()
            .iter()
            .find(|f| f.ends_with("sub/b.txt"))
            .expect("sub/b.txt was collected");
        let key = artifacts.upload_key("my-app/42", file)?;
        assert_eq!(key, "my-app/42/sub/b.txt");

        Ok(())
    }

    #[test]
    fn upload_key_rejects_files_outside_the_root() {
        let error = upload_key("p/7", Path::new("/artifacts"), Path::new("/elsewhere/f.txt"))
            .unwrap_err();
        assert!(matches!(error, Error::PublishFailed { .. }));
    }
}
