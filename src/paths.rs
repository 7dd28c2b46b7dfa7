//! Target-directory resolution and validation.

use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// Expands a relative path to an absolute one, resolving symlinks when the
/// path already exists. A path that does not exist yet is returned
/// absolute but unresolved, so a fresh download directory can still be
/// created from it.
pub fn full_path<R: Runtime>(runtime: &R, path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        runtime
            .current_dir()
            .context("cannot determine current working directory")?
            .join(path)
    };

    if runtime.exists(&absolute) {
        runtime
            .canonicalize(&absolute)
            .with_context(|| format!("cannot resolve {}", absolute.display()))
    } else {
        Ok(absolute)
    }
}

/// Checks whether a path is usable. With `strict` the path must not exist
/// yet; otherwise it must exist.
pub fn is_valid_path<R: Runtime>(runtime: &R, path: &Path, strict: bool) -> bool {
    if strict {
        !runtime.exists(path)
    } else {
        runtime.exists(path)
    }
}

/// Resolves the download directory: an explicit one is absolutized, an
/// omitted one falls back to the current working directory, and a missing
/// one is created with all parents.
pub fn resolve_target_dir<R: Runtime>(runtime: &R, directory: Option<PathBuf>) -> Result<PathBuf> {
    let target = match directory {
        Some(dir) => full_path(runtime, &dir)?,
        None => {
            info!("download directory not specified, using current working directory");
            runtime
                .current_dir()
                .context("cannot determine current working directory")?
        }
    };

    if !is_valid_path(runtime, &target, false) {
        info!("download directory does not exist, creating");
        runtime
            .create_dir_all(&target)
            .with_context(|| format!("failed to create download directory {}", target.display()))?;
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    fn cwd() -> PathBuf {
        PathBuf::from("/home/user")
    }

    #[test]
    fn relative_paths_are_joined_to_the_current_dir() {
        let mut runtime = MockRuntime::new();
        runtime.expect_current_dir().returning(|| Ok(cwd()));
        runtime.expect_exists().return_const(false);

        let path = full_path(&runtime, Path::new("packs")).unwrap();
        assert_eq!(path, PathBuf::from("/home/user/packs"));
    }

    #[test]
    fn existing_paths_are_canonicalized() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().return_const(true);
        runtime
            .expect_canonicalize()
            .with(eq(PathBuf::from("/data/link")))
            .returning(|_| Ok(PathBuf::from("/data/real")));

        let path = full_path(&runtime, Path::new("/data/link")).unwrap();
        assert_eq!(path, PathBuf::from("/data/real"));
    }

    #[test]
    fn strict_validation_rejects_existing_paths() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().return_const(true);

        assert!(!is_valid_path(&runtime, Path::new("/data"), true));
        assert!(is_valid_path(&runtime, Path::new("/data"), false));
    }

    #[test]
    fn missing_target_dir_is_created() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().return_const(false);
        runtime
            .expect_create_dir_all()
            .with(eq(PathBuf::from("/downloads/pack")))
            .times(1)
            .returning(|_| Ok(()));

        let target =
            resolve_target_dir(&runtime, Some(PathBuf::from("/downloads/pack"))).unwrap();
        assert_eq!(target, PathBuf::from("/downloads/pack"));
    }

    #[test]
    fn omitted_target_dir_falls_back_to_cwd() {
        let mut runtime = MockRuntime::new();
        runtime.expect_current_dir().returning(|| Ok(cwd()));
        runtime.expect_exists().return_const(true);

        let target = resolve_target_dir(&runtime, None).unwrap();
        assert_eq!(target, cwd());
    }
}
