//! Whole-file rewrites that keep permissions and never leave a half-written note.

use log::warn;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use vaultscan_core::RenameChange;

/// Hidden sibling used as the write target before the final rename
fn temp_sibling(path: &Path) -> io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")
    })?;
    Ok(path.with_file_name(format!(".{}.tmp", name.to_string_lossy())))
}

/// Replace the contents of `path`, restoring its permission bits.
///
/// Symlinks are followed so the link itself survives.
pub async fn write_preserving(path: &Path, content: &[u8]) -> io::Result<()> {
    let target = fs::canonicalize(path).await?;
    let permissions = fs::metadata(&target).await?.permissions();
    let temp = temp_sibling(&target)?;

    fs::write(&temp, content).await?;
    let finish = async {
        fs::set_permissions(&temp, permissions).await?;
        fs::rename(&temp, &target).await
    };
    if let Err(e) = finish.await {
        let _ = fs::remove_file(&temp).await;
        return Err(e);
    }
    Ok(())
}

/// Split a line chunk into body and its `\n` / `\r\n` terminator
fn split_terminator(chunk: &[u8]) -> (&[u8], &[u8]) {
    if let Some(body) = chunk.strip_suffix(b"\r\n") {
        (body, &b"\r\n"[..])
    } else if let Some(body) = chunk.strip_suffix(b"\n") {
        (body, &b"\n"[..])
    } else {
        (chunk, &[][..])
    }
}

/// Apply line changes to raw file bytes. Line endings and untouched bytes are kept.
///
/// A change whose recorded old content no longer matches the line is skipped.
pub fn apply_line_changes(original: &[u8], changes: &[&RenameChange]) -> (Vec<u8>, usize) {
    let by_line: HashMap<usize, &RenameChange> =
        changes.iter().map(|change| (change.line, *change)).collect();

    let mut out = Vec::with_capacity(original.len() + 64);
    let mut applied = 0;
    for (idx, chunk) in original.split_inclusive(|b| *b == b'\n').enumerate() {
        let line_number = idx + 1;
        let Some(change) = by_line.get(&line_number) else {
            out.extend_from_slice(chunk);
            continue;
        };

        let (body, terminator) = split_terminator(chunk);
        if String::from_utf8_lossy(body) == change.old_content {
            out.extend_from_slice(change.new_content.as_bytes());
            out.extend_from_slice(terminator);
            applied += 1;
        } else {
            warn!(
                "{}:{} changed since analysis, leaving it untouched",
                change.file, line_number
            );
            out.extend_from_slice(chunk);
        }
    }
    (out, applied)
}

/// Read `path` once, apply `changes`, write it back safely
pub async fn rewrite_file(path: &Path, changes: &[&RenameChange]) -> io::Result<usize> {
    let original = fs::read(path).await?;
    let (updated, applied) = apply_line_changes(&original, changes);
    if applied > 0 {
        write_preserving(path, &updated).await?;
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn change(line: usize, old: &str, new: &str) -> RenameChange {
        RenameChange {
            file: "x.md".into(),
            line,
            old_content: old.into(),
            new_content: new.into(),
        }
    }

    #[test]
    fn test_apply_preserves_line_endings() {
        let original = b"one\r\n[[a]]\r\nthree\n[[a]]";
        let c1 = change(2, "[[a]]", "[[b]]");
        let c2 = change(4, "[[a]]", "[[b]]");
        let (out, applied) = apply_line_changes(original, &[&c1, &c2]);
        assert_eq!(out, b"one\r\n[[b]]\r\nthree\n[[b]]");
        assert_eq!(applied, 2);
    }

    #[test]
    fn test_stale_change_skipped() {
        let original = b"[[a]] edited\n";
        let c = change(1, "[[a]]", "[[b]]");
        let (out, applied) = apply_line_changes(original, &[&c]);
        assert_eq!(out, original);
        assert_eq!(applied, 0);
    }

    #[tokio::test]
    async fn test_write_preserving_keeps_permissions() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("note.md");
        std::fs::write(&path, "old").unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();
        }

        write_preserving(&path, b"new").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert!(!temp.path().join(".note.md.tmp").exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o640);
        }
    }

    #[tokio::test]
    async fn test_rewrite_missing_file_errors() {
        let temp = TempDir::new().unwrap();
        let c = change(1, "a", "b");
        assert!(rewrite_file(&temp.path().join("gone.md"), &[&c]).await.is_err());
    }
}
