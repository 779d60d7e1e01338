//! NUL-separated file concatenation.
//!
//! The canonical way to prepare document-mode input: each file becomes one
//! document, joined by single NUL bytes with no trailing separator.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

/// Write the contents of `paths` to `out`, separated by single NUL bytes.
pub fn concat_files<W: Write>(paths: &[PathBuf], out: &mut W) -> Result<()> {
    for (i, path) in paths.iter().enumerate() {
        if i > 0 {
            out.write_all(&[0])?;
        }

        let mut file = File::open(path)
            .with_context(|| format!("could not open '{}' for reading", path.display()))?;
        io::copy(&mut file, out)
            .with_context(|| format!("could not copy '{}'", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn separates_files_with_single_nul_and_no_trailer() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let c = dir.path().join("c");
        fs::write(&a, "first").unwrap();
        fs::write(&b, "").unwrap();
        fs::write(&c, "third").unwrap();

        let mut out = Vec::new();
        concat_files(&[a, b, c], &mut out).unwrap();

        assert_eq!(out, b"first\0\0third");
    }

    #[test]
    fn single_file_gets_no_separator() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a");
        fs::write(&a, "only").unwrap();

        let mut out = Vec::new();
        concat_files(&[a], &mut out).unwrap();

        assert_eq!(out, b"only");
    }

    #[test]
    fn missing_file_reports_its_path() {
        let mut out = Vec::new();
        let err = concat_files(&[PathBuf::from("/no/such/file")], &mut out).unwrap_err();

        assert!(err.to_string().contains("/no/such/file"));
    }
}
