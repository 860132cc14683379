use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::{BatchError, Result};

/// Creates `output_dir` and any missing parents. Succeeds if it already exists.
pub fn ensure_output_ready(output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .map_err(|e| BatchError::file_system(output_dir, "directory creation", e))
}

/// Whether the extension is png, jpg or jpeg, ignoring case.
pub fn is_eligible_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_lowercase().as_str(), "png" | "jpg" | "jpeg"))
}

/// File name without its extension; the dedup key shared by inputs and outputs.
pub fn base_name(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

/// Eligible image files directly inside `input_dir`, sorted by file name.
///
/// Subdirectories are not descended into; symlinks to files are listed. A missing or
/// unreadable directory is an error.
pub fn list_eligible_inputs(input_dir: &Path) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(BatchError::file_system(
            input_dir,
            "directory listing",
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "input directory does not exist",
            ),
        ));
    }

    let mut inputs = Vec::new();
    for entry in WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        // path().is_file() follows links, file_type() does not
        if entry.path().is_file() && is_eligible_image(entry.path()) {
            inputs.push(entry.into_path());
        }
    }

    Ok(inputs)
}

/// Base names of every entry directly inside `output_dir`, regardless of extension.
///
/// Returns the empty set when the directory does not exist.
pub fn compute_processed_set(output_dir: &Path) -> Result<BTreeSet<String>> {
    if !output_dir.exists() {
        return Ok(BTreeSet::new());
    }

    let mut processed = BTreeSet::new();
    for entry in WalkDir::new(output_dir).min_depth(1).max_depth(1) {
        if let Some(name) = base_name(entry?.path()) {
            processed.insert(name);
        }
    }

    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> std::io::Result<()> {
        fs::write(dir.join(name), b"")
    }

    #[test]
    fn test_eligible_extensions() {
        let test_cases = vec![
            ("a.png", true),
            ("a.jpg", true),
            ("a.jpeg", true),
            ("a.PNG", true),
            ("a.JpEg", true),
            ("a.webp", false),
            ("a.gif", false),
            ("a.jfif", false),
            ("a.JFIF", false),
            ("a.apng", false),
            ("a.jpe", false),
            ("notes.txt", false),
            ("png", false),
            (".png", false),
        ];

        for (filename, expected) in test_cases {
            assert_eq!(
                is_eligible_image(Path::new(filename)),
                expected,
                "{}",
                filename
            );
        }
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name(Path::new("dir/foo.jpg")).as_deref(), Some("foo"));
        assert_eq!(base_name(Path::new("foo.tar.gz")).as_deref(), Some("foo.tar"));
        assert_eq!(base_name(Path::new("README")).as_deref(), Some("README"));
        assert_eq!(base_name(Path::new(".hidden")).as_deref(), Some(".hidden"));
    }

    #[test]
    fn test_list_eligible_inputs_filters_and_sorts() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let input = temp_dir.path();
        touch(input, "c.jpeg")?;
        touch(input, "a.jpg")?;
        touch(input, "b.PNG")?;
        touch(input, "notes.txt")?;
        fs::create_dir(input.join("nested.png"))?;
        fs::create_dir(input.join("sub"))?;
        touch(&input.join("sub"), "deep.png")?;

        let names: Vec<_> = list_eligible_inputs(input)?
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.jpg", "b.PNG", "c.jpeg"]);
        Ok(())
    }

    #[test]
    fn test_list_eligible_inputs_excludes_image_aliases() -> Result<()> {
        let temp_dir = TempDir::new()?;
        touch(temp_dir.path(), "x.jfif")?;
        touch(temp_dir.path(), "y.apng")?;
        touch(temp_dir.path(), "z.jpg")?;

        let inputs = list_eligible_inputs(temp_dir.path())?;
        assert_eq!(inputs, vec![temp_dir.path().join("z.jpg")]);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_list_eligible_inputs_follows_file_symlinks() -> Result<()> {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new()?;
        let input = temp_dir.path().join("in");
        let store = temp_dir.path().join("store");
        fs::create_dir_all(&input)?;
        fs::create_dir_all(store.join("album.png"))?;
        touch(&store, "real.jpg")?;
        symlink(store.join("real.jpg"), input.join("link.jpg"))?;
        symlink(store.join("album.png"), input.join("dir-link.png"))?;

        let inputs = list_eligible_inputs(&input)?;
        assert_eq!(inputs, vec![input.join("link.jpg")]);
        Ok(())
    }

    #[test]
    fn test_list_eligible_inputs_missing_dir() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let err = list_eligible_inputs(&temp_dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, BatchError::FileSystem { .. }));
        Ok(())
    }

    #[test]
    fn test_processed_set_missing_and_empty() -> Result<()> {
        let temp_dir = TempDir::new()?;
        assert!(compute_processed_set(&temp_dir.path().join("missing"))?.is_empty());
        assert!(compute_processed_set(temp_dir.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_processed_set_strips_extensions() -> Result<()> {
        let temp_dir = TempDir::new()?;
        touch(temp_dir.path(), "foo.png")?;
        touch(temp_dir.path(), "bar.jpg")?;
        touch(temp_dir.path(), "log")?;

        let processed = compute_processed_set(temp_dir.path())?;
        let expected: BTreeSet<String> = ["bar", "foo", "log"].iter().map(|s| s.to_string()).collect();
        assert_eq!(processed, expected);
        Ok(())
    }

    #[test]
    fn test_ensure_output_ready_is_idempotent() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let output = temp_dir.path().join("outputs").join("hk");

        ensure_output_ready(&output)?;
        ensure_output_ready(&output)?;
        assert!(output.is_dir());
        Ok(())
    }

    #[test]
    fn test_ensure_output_ready_blocked_by_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let blocker = temp_dir.path().join("outputs");
        fs::write(&blocker, b"not a directory")?;

        let err = ensure_output_ready(&blocker.join("hk")).unwrap_err();
        assert!(matches!(err, BatchError::FileSystem { .. }));
        Ok(())
    }
}
