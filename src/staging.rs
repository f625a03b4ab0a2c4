//! All-or-nothing writes of generated files.
//!
//! Every file of one `generate` run is first written to a hidden temporary file next to its destination. Only when all
//! of them were written are they renamed into place, so a failing output (an unwritable directory, a path below a
//! regular file) leaves none of the other outputs behind.
//!
//! Files whose destination already holds identical content are skipped and keep their timestamps.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::GenerateError;

/// A file waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl StagedFile {
    fn is_unchanged(&self) -> bool {
        fs::read_to_string(&self.path).is_ok_and(|existing| existing == self.contents)
    }

    fn temp_path(&self) -> Result<PathBuf, GenerateError> {
        let file_name = self.path.file_name().ok_or_else(|| GenerateError::Io {
            path: self.path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "output path does not name a file"),
        })?;
        let mut temp_name = OsString::from(".");
        temp_name.push(file_name);
        temp_name.push(format!(".symtest-tmp.{}", std::process::id()));
        Ok(self.path.with_file_name(temp_name))
    }

    fn write_temp(&self) -> Result<PathBuf, GenerateError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| GenerateError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let temp = self.temp_path()?;
        fs::write(&temp, &self.contents).map_err(|source| GenerateError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(temp)
    }
}

/// Files collected for one commit.
#[derive(Debug, Default)]
pub struct Staging {
    files: Vec<StagedFile>,
}

impl Staging {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.push(StagedFile {
            path: path.into(),
            contents: contents.into(),
        });
    }

    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    /// Write every staged file, or none of them.
    ///
    /// ## Returns
    /// - The paths that were (re)written, in staging order. Unchanged files are not listed.
    ///
    /// ## Notes
    /// - Parent directories created while staging are left in place on failure.
    pub fn commit(self) -> Result<Vec<PathBuf>, GenerateError> {
        let pending: Vec<&StagedFile> = self.files.iter().filter(|file| !file.is_unchanged()).collect();

        let mut temps: Vec<(PathBuf, &Path)> = Vec::with_capacity(pending.len());
        for file in pending {
            match file.write_temp() {
                Ok(temp) => temps.push((temp, &file.path)),
                Err(e) => {
                    discard(&temps);
                    return Err(e);
                }
            }
        }

        let mut written = Vec::with_capacity(temps.len());
        for (index, (temp, path)) in temps.iter().enumerate() {
            if let Err(source) = fs::rename(temp, path) {
                discard(&temps[index..]);
                return Err(GenerateError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
            written.push(path.to_path_buf());
        }
        Ok(written)
    }
}

fn discard(temps: &[(PathBuf, &Path)]) {
    for (temp, _) in temps {
        if let Err(e) = fs::remove_file(temp) {
            tracing::debug!(path = %temp.display(), error = %e, "could not remove temporary file");
        }
    }
}
