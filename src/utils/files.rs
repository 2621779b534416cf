use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Ensure the thumbnail output directory exists
pub fn ensure_output_dir(output_dir: &Path) -> io::Result<()> {
    if !output_dir.exists() {
        fs::create_dir_all(output_dir)?;
        log::info!("Created directory: {}", output_dir.display());
    }
    Ok(())
}

/// Write `bytes` to `output_dir/file_name` so the final name only ever holds a complete file.
///
/// Data lands in a `.part` sibling first and is renamed into place.
pub fn write_atomic(output_dir: &Path, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    let final_path = output_dir.join(file_name);
    let temp_path = output_dir.join(format!("{}.part", file_name));

    if let Err(e) = fs::write(&temp_path, bytes) {
        // Only try to cleanup temp file if it was created
        if temp_path.exists() {
            if let Err(cleanup_err) = fs::remove_file(&temp_path) {
                log::warn!("Failed to cleanup temp file: {}", cleanup_err);
            }
        }
        return Err(e);
    }

    if let Err(e) = fs::rename(&temp_path, &final_path) {
        if let Err(cleanup_err) = fs::remove_file(&temp_path) {
            log::warn!("Failed to cleanup temp file: {}", cleanup_err);
        }
        return Err(e);
    }
    Ok(final_path)
}

/// Count the PNG thumbnails present in the output directory
pub fn count_thumbnails(output_dir: &Path) -> io::Result<usize> {
    if !output_dir.exists() {
        return Ok(0);
    }

    let count = fs::read_dir(output_dir)?
        .filter_map(|entry| {
            entry.ok().and_then(|e| {
                let path = e.path();
                if path.extension()? == "png" && e.file_type().ok()?.is_file() {
                    Some(())
                } else {
                    None
                }
            })
        })
        .count();

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_leaves_only_final_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_atomic(dir.path(), "01001.png", b"png").unwrap();

        assert_eq!(path, dir.path().join("01001.png"));
        assert_eq!(fs::read(&path).unwrap(), b"png");
        assert!(!dir.path().join("01001.png.part").exists());
        assert_eq!(count_thumbnails(dir.path()).unwrap(), 1);
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("01001.png");
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), b"x").unwrap();

        assert!(write_atomic(dir.path(), "01001.png", b"png").is_err());
        assert!(!dir.path().join("01001.png.part").exists());
        assert!(blocker.is_dir());
    }

    #[test]
    fn output_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        ensure_output_dir(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(count_thumbnails(&nested).unwrap(), 0);
    }
}
