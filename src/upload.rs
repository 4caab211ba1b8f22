//! Upload folder management.
//!
//! Uploaded files are copied into a single flat folder before ingestion, so
//! the collection's `source` metadata always names a file that exists there.
//! Directories given on the command line are expanded to the supported files
//! they contain.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::warn;
use walkdir::WalkDir;

use crate::extract::base_name;
use crate::models::FileType;

/// Create the upload folder if it does not exist.
pub fn ensure_upload_folder(folder: &Path) -> Result<()> {
    std::fs::create_dir_all(folder)
        .with_context(|| format!("Failed to create upload folder: {}", folder.display()))
}

/// Copy `file` into `folder` under its base name, replacing any previous
/// upload with the same name. Returns the destination path.
pub fn copy_into_uploads(folder: &Path, file: &Path) -> Result<PathBuf> {
    ensure_upload_folder(folder)?;
    let dest = folder.join(base_name(file));

    let same_file = match (file.canonicalize(), dest.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };
    if !same_file {
        std::fs::copy(file, &dest).with_context(|| {
            format!("Failed to copy {} to {}", file.display(), dest.display())
        })?;
    }
    Ok(dest)
}

/// Expand `inputs` into a list of files.
///
/// Files are kept as given (unsupported ones too, so the reader can report
/// them). Directories are walked recursively and contribute only files with
/// a supported extension, sorted by path.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!(error = %e, "skipping unreadable entry");
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| FileType::from_path(path).is_supported())
                .collect();
            found.sort();
            if found.is_empty() {
                warn!(dir = %input.display(), "no supported documents found");
            }
            files.extend(found);
        } else if input.exists() {
            files.push(input.clone());
        } else {
            bail!("Input not found: {}", input.display());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_under_base_name() {
        let src_dir = tempfile::tempdir().unwrap();
        let uploads = tempfile::tempdir().unwrap();
        let file = src_dir.path().join("policy.txt");
        std::fs::write(&file, "Vacation is 20 days.").unwrap();

        let dest = copy_into_uploads(&uploads.path().join("up"), &file).unwrap();
        assert_eq!(dest, uploads.path().join("up").join("policy.txt"));
        assert_eq!(std::fs::read_to_string(dest).unwrap(), "Vacation is 20 days.");
    }

    #[test]
    fn copying_a_file_onto_itself_is_a_no_op() {
        let uploads = tempfile::tempdir().unwrap();
        let file = uploads.path().join("policy.txt");
        std::fs::write(&file, "same").unwrap();

        let dest = copy_into_uploads(uploads.path(), &file).unwrap();
        assert_eq!(std::fs::read_to_string(dest).unwrap(), "same");
    }

    #[test]
    fn directories_expand_to_supported_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();
        std::fs::write(dir.path().join("a.PDF"), "a").unwrap();
        std::fs::write(dir.path().join("notes.md"), "md").unwrap();
        std::fs::write(dir.path().join("sub").join("c.docx"), "c").unwrap();

        let files = expand_inputs(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<String> = files.iter().map(|p| base_name(p)).collect();
        assert_eq!(names, vec!["a.PDF", "b.txt", "c.docx"]);
    }

    #[test]
    fn missing_inputs_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(expand_inputs(&[dir.path().join("nope.txt")]).is_err());
    }
}
