use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Returns true if a script or stylesheet reference points off-site and
/// must never be read from the build directory.
///
/// # Example
///
/// ```rust
/// use sri_inventory::path_utils::is_external_reference;
///
/// assert!(is_external_reference("https://cdn.example.com/a.js"));
/// assert!(is_external_reference("//cdn.example.com/lib.css"));
/// assert!(!is_external_reference("/assets/main.js"));
/// ```
pub fn is_external_reference(reference: &str) -> bool {
    let lowered = reference.trim().to_ascii_lowercase();
    lowered.starts_with("http") || lowered.starts_with("//")
}

/// Drops the query string and fragment of a reference.
pub fn strip_query(reference: &str) -> &str {
    reference
        .split(['?', '#'])
        .next()
        .unwrap_or(reference)
}

/// Resolves a local reference found in HTML to the file it names inside the
/// build directory. A leading `/` is relative to `target`, not the file
/// system root.
///
/// ### Example
/// ```
/// use std::path::Path;
/// use sri_inventory::path_utils::local_asset_path;
///
/// let path = local_asset_path("dist", "/js/../app.js?v=3");
/// assert_eq!(path, Path::new("dist/app.js"));
/// ```
pub fn local_asset_path(target: impl AsRef<Path>, reference: &str) -> PathBuf {
    let relative = strip_query(reference.trim());
    let relative = relative.strip_prefix('/').unwrap_or(relative);
    path_clean::clean(target.as_ref().join(relative))
}

/// Base file name of a reference, query string removed.
pub fn file_name_of(reference: &str) -> String {
    let path = strip_query(reference);
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Recursively lists every regular file under `root` whose name ends with
/// `extension` (e.g. `".js"`). Results are sorted.
pub fn find_files_by_extension(root: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    // glob silently yields nothing for a missing root.
    std::fs::read_dir(root).map_err(|source| Error::io(root, source))?;
    let pattern = format!(
        "{}/**/*{}",
        glob::Pattern::escape(&root.to_string_lossy()),
        glob::Pattern::escape(extension),
    );
    let entries = glob::glob(&pattern).map_err(|error| {
        Error::io(root, std::io::Error::new(std::io::ErrorKind::InvalidInput, error))
    })?;
    let mut results = Vec::<PathBuf>::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => results.push(path_clean::clean(path)),
            Ok(_) => continue,
            Err(error) => {
                let path = error.path().to_path_buf();
                return Err(Error::io(path, error.into_error()))
            }
        }
    }
    results.sort();
    Ok(results)
}

/// Path of `path` relative to `base` for log output, falling back to the
/// full path.
pub fn display_relative(path: &Path, base: &Path) -> String {
    pathdiff::diff_paths(path, base)
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn classifies_external_references() {
        assert!(is_external_reference("http://a.com/x.js"));
        assert!(is_external_reference("HTTPS://A.COM/X.JS"));
        assert!(is_external_reference("//cdn.example.com/x.js"));
        assert!(!is_external_reference("x.js"));
        assert!(!is_external_reference("/static/x.js"));
        assert!(!is_external_reference("./x.js"));
    }

    #[test]
    fn strips_query_and_fragment() {
        assert_eq!(strip_query("main.js?v=1"), "main.js");
        assert_eq!(strip_query("style.css#x"), "style.css");
        assert_eq!(strip_query("plain.js"), "plain.js");
    }

    #[test]
    fn resolves_local_assets_under_target() {
        assert_eq!(local_asset_path("dist", "/app.js"), Path::new("dist/app.js"));
        assert_eq!(local_asset_path("dist", "js/app.js?x=1"), Path::new("dist/js/app.js"));
        assert_eq!(local_asset_path("dist", "./a/../b.js"), Path::new("dist/b.js"));
    }

    #[test]
    fn file_name_drops_directories_and_query() {
        assert_eq!(file_name_of("/assets/main.abc123.js?v=2"), "main.abc123.js");
        assert_eq!(file_name_of("runtime.js"), "runtime.js");
    }

    #[test]
    fn finds_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("nested/deeper")).unwrap();
        fs::create_dir_all(root.join("folder.js")).unwrap();
        fs::write(root.join("a.js"), "a").unwrap();
        fs::write(root.join("nested/b.js"), "b").unwrap();
        fs::write(root.join("nested/deeper/c.js"), "c").unwrap();
        fs::write(root.join("nested/style.css"), "body{}").unwrap();
        fs::write(root.join("a.js.map"), "{}").unwrap();

        let found = find_files_by_extension(root, ".js").unwrap();
        let relative: Vec<String> = found.iter().map(|p| display_relative(p, root)).collect();
        assert_eq!(relative, vec!["a.js", "nested/b.js", "nested/deeper/c.js"]);

        let css = find_files_by_extension(root, ".css").unwrap();
        assert_eq!(css.len(), 1);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_files_by_extension(dir.path().join("missing"), ".js").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
