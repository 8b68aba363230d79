use super::Workflow;
use crate::codec::{self, ExportOptions};
use crate::error::{ExportError, ImportError, ValidationError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

impl Workflow {
    /// Validates the workflow and writes it as a pretty-printed document to `path`.
    ///
    /// Nothing is written when validation reports a problem. The workflow itself is
    /// never changed by exporting.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        self.export_with(path, &ExportOptions::default())
    }

    pub fn export_with(
        &self,
        path: impl AsRef<Path>,
        options: &ExportOptions,
    ) -> Result<(), ExportError> {
        let path = path.as_ref();

        if options.validate {
            let errors = self.validate();
            if !errors.is_empty() {
                tracing::error!(
                    workflow = %self.name,
                    path = %path.display(),
                    "refusing to export invalid workflow"
                );
                return Err(ValidationError::new(errors).into());
            }
        }
        for warning in self.warnings() {
            tracing::warn!(workflow = %self.name, "{}", warning);
        }

        let json = codec::encode(self, options.pretty)?;

        if options.create_parent_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        fs::write(path, json).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(
            workflow = %self.name,
            nodes = self.nodes.len(),
            "exported workflow to {}",
            path.display()
        );
        Ok(())
    }

    /// The exported document as a string, without validating or touching the filesystem.
    pub fn to_json_string(&self, pretty: bool) -> Result<String, ExportError> {
        codec::encode(self, pretty)
    }

    /// Reads a workflow document from disk.
    ///
    /// The path must name an existing regular file with a `.json` extension.
    pub fn import(path: impl AsRef<Path>) -> Result<Self, ImportError> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|source| read_error(path, source))?;
        if !metadata.is_file() {
            return Err(ImportError::InvalidPath {
                path: path.to_path_buf(),
                reason: "not a regular file",
            });
        }
        if !has_json_extension(path) {
            return Err(ImportError::InvalidPath {
                path: path.to_path_buf(),
                reason: "expected a .json file",
            });
        }

        let json = fs::read_to_string(path).map_err(|source| read_error(path, source))?;
        tracing::debug!(path = %path.display(), bytes = json.len(), "read workflow document");
        Self::from_json_str(&json)
    }

    /// Imports every `.json` file in `dir`, descending into subdirectories when
    /// `recursive` is set.
    ///
    /// Fails only when `dir` is missing or not a directory. A file that cannot be imported
    /// is logged and reported with its error; the rest are still read. Results are sorted
    /// by path.
    pub fn import_dir(
        dir: impl AsRef<Path>,
        recursive: bool,
    ) -> Result<Vec<(PathBuf, Result<Self, ImportError>)>, ImportError> {
        let dir = dir.as_ref();
        let metadata = fs::metadata(dir).map_err(|source| read_error(dir, source))?;
        if !metadata.is_dir() {
            return Err(ImportError::InvalidPath {
                path: dir.to_path_buf(),
                reason: "not a directory",
            });
        }

        let files = json_files(dir, recursive)?;
        let mut results = Vec::with_capacity(files.len());
        for file in files {
            let result = Self::import(&file);
            if let Err(e) = &result {
                tracing::warn!(path = %file.display(), "skipping workflow file: {}", e);
            }
            results.push((file, result));
        }

        tracing::info!(
            dir = %dir.display(),
            files = results.len(),
            imported = results.iter().filter(|(_, r)| r.is_ok()).count(),
            "imported workflow directory"
        );
        Ok(results)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ImportError> {
        codec::decode_str(json)
    }
}

fn read_error(path: &Path, source: std::io::Error) -> ImportError {
    match source.kind() {
        ErrorKind::NotFound => ImportError::FileNotFound(path.to_path_buf()),
        _ => ImportError::Io {
            path: path.to_path_buf(),
            source,
        },
    }
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Regular `.json` files under `dir`, sorted. Directories are walked with an explicit
/// stack; symlinked directories are not followed.
fn json_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, ImportError> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current).map_err(|source| read_error(&current, source))?;
        for entry in entries {
            let entry = entry.map_err(|source| read_error(&current, source))?;
            let file_type = entry
                .file_type()
                .map_err(|source| read_error(&entry.path(), source))?;
            let path = entry.path();
            if file_type.is_dir() {
                if recursive {
                    pending.push(path);
                }
            } else if file_type.is_file() && has_json_extension(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
