use std::{cmp::Ordering, path::PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::storage::Layout;

/// Collects every model file under the models tree.
///
/// The walk is top-down: a directory's files are listed (sorted by name)
/// before any of its subdirectories are descended into (also sorted by
/// name), so the order is stable across runs and platforms. If the overrides
/// tree is nested inside the models tree it is not descended into.
///
/// # Errors
///
/// Any error reading the tree is returned; entries are never silently
/// skipped.
pub fn collect_model_paths(layout: &Layout) -> Result<Vec<PathBuf>, walkdir::Error> {
    let overrides_dir = layout.overrides_dir();
    let mut paths = Vec::new();

    for entry in WalkDir::new(layout.models_dir())
        .sort_by(files_first)
        .into_iter()
        .filter_entry(|entry| entry.path() != overrides_dir)
    {
        let entry = entry?;
        if !entry.path().is_file() || !layout.is_model(entry.path()) {
            tracing::trace!("Skipping {}", entry.path().display());
            continue;
        }

        tracing::debug!("Found model {}", entry.path().display());
        paths.push(entry.into_path());
    }

    Ok(paths)
}

/// Collects every model file under the overrides tree.
///
/// Returns an empty list if the overrides tree does not exist.
///
/// # Errors
///
/// Any error reading an existing tree is returned.
pub fn collect_override_paths(layout: &Layout) -> Result<Vec<PathBuf>, walkdir::Error> {
    if !layout.overrides_dir().is_dir() {
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(layout.overrides_dir()).sort_by(files_first) {
        let entry = entry?;
        if entry.path().is_file() && layout.is_model(entry.path()) {
            paths.push(entry.into_path());
        }
    }

    Ok(paths)
}

/// Orders files before directories, then by name.
fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    (a.file_type().is_dir(), a.file_name()).cmp(&(b.file_type().is_dir(), b.file_name()))
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use tempfile::TempDir;

    use super::*;
    use crate::Config;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}").unwrap();
    }

    fn relative(root: &Path, paths: Vec<PathBuf>) -> Vec<String> {
        paths
            .into_iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn files_are_listed_before_subdirectories() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root, "models/b/y.mimodel");
        touch(root, "models/a/x.mimodel");
        touch(root, "models/a/sub/z.mimodel");
        touch(root, "models/top.mimodel");
        let layout = Layout::new(root.to_path_buf(), &Config::default());

        let paths = collect_model_paths(&layout).unwrap();

        assert_eq!(
            relative(root, paths),
            [
                "models/top.mimodel",
                "models/a/x.mimodel",
                "models/a/sub/z.mimodel",
                "models/b/y.mimodel",
            ]
        );
    }

    #[test]
    fn nested_files_never_precede_parent_files() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root, "models/a/sub/z.mimodel");
        touch(root, "models/a/x.mimodel");
        touch(root, "models/top.mimodel");
        let layout = Layout::new(root.to_path_buf(), &Config::default());

        let paths = collect_model_paths(&layout).unwrap();

        assert_eq!(
            relative(root, paths),
            [
                "models/top.mimodel",
                "models/a/x.mimodel",
                "models/a/sub/z.mimodel",
            ]
        );
    }

    #[test]
    fn ignores_other_extensions_and_directories() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root, "models/a/x.mimodel");
        touch(root, "models/a/texture.png");
        touch(root, "models/model_list.json");
        fs::create_dir_all(root.join("models/dir.mimodel")).unwrap();
        let layout = Layout::new(root.to_path_buf(), &Config::default());

        let paths = collect_model_paths(&layout).unwrap();

        assert_eq!(relative(root, paths), ["models/a/x.mimodel"]);
    }

    #[test]
    fn nested_overrides_tree_is_pruned() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::write(
            root.join("model_list.toml"),
            "_version = \"1\"\noverrides_dir = \"models/overrides\"\n",
        )
        .unwrap();
        touch(root, "models/a/x.mimodel");
        touch(root, "models/overrides/a/x.mimodel");
        let config = Config::load(&root.join("model_list.toml")).unwrap();
        let layout = Layout::new(root.to_path_buf(), &config);

        let paths = collect_model_paths(&layout).unwrap();

        assert_eq!(relative(root, paths), ["models/a/x.mimodel"]);
    }

    #[test]
    fn missing_models_tree_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let layout = Layout::new(tmp.path().to_path_buf(), &Config::default());

        assert!(collect_model_paths(&layout).is_err());
    }

    #[test]
    fn missing_overrides_tree_is_empty() {
        let tmp = TempDir::new().unwrap();
        let layout = Layout::new(tmp.path().to_path_buf(), &Config::default());

        assert!(collect_override_paths(&layout).unwrap().is_empty());
    }
}
