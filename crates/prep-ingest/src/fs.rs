//! Atomic file writes.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use prep_model::{PrepError, Result};

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write the temp sibling of `path`, creating the parent directory.
///
/// The temp file is removed again when `write` fails.
fn write_temp<F>(path: &Path, write: F) -> Result<PathBuf>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| PrepError::io("create directory", parent, e))?;
    }

    let temp = temp_path(path);
    let file = File::create(&temp).map_err(|e| PrepError::io("create", &temp, e))?;
    let mut writer = BufWriter::new(file);

    let written = write(&mut writer).and_then(|()| {
        writer
            .flush()
            .map_err(|e| PrepError::io("write", &temp, e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| PrepError::io("sync", &temp, e))
    });
    drop(writer);
    if let Err(error) = written {
        let _ = fs::remove_file(&temp);
        return Err(error);
    }
    Ok(temp)
}

/// Write `path` through a temp file + rename, creating the parent directory.
///
/// The temp file is removed again when writing or renaming fails.
pub(crate) fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let temp = write_temp(path, write)?;
    fs::rename(&temp, path).map_err(|e| {
        let _ = fs::remove_file(&temp);
        PrepError::io("rename into", path, e)
    })
}

/// A set of outputs that become visible together or not at all.
///
/// Each output is first written to its temp sibling. [`StagedOutputs::commit`]
/// renames them into place in staging order; if a rename fails, outputs
/// already renamed are removed along with the remaining temp files.
/// Dropping an uncommitted set removes its temp files.
#[derive(Debug, Default)]
pub struct StagedOutputs {
    staged: Vec<(PathBuf, PathBuf)>,
}

impl StagedOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    pub(crate) fn stage<F>(&mut self, path: &Path, write: F) -> Result<()>
    where
        F: FnOnce(&mut BufWriter<File>) -> Result<()>,
    {
        let temp = write_temp(path, write)?;
        self.staged.push((temp, path.to_path_buf()));
        Ok(())
    }

    /// Rename every staged output into place and return the final paths.
    pub fn commit(mut self) -> Result<Vec<PathBuf>> {
        let staged = std::mem::take(&mut self.staged);
        let mut committed = Vec::with_capacity(staged.len());
        for (index, (temp, path)) in staged.iter().enumerate() {
            if let Err(error) = fs::rename(temp, path) {
                for done in &committed {
                    let _ = fs::remove_file(done);
                }
                for (pending, _) in &staged[index..] {
                    let _ = fs::remove_file(pending);
                }
                return Err(PrepError::io("rename into", path, error));
            }
            committed.push(path.clone());
        }
        Ok(committed)
    }
}

impl Drop for StagedOutputs {
    fn drop(&mut self) {
        for (temp, _) in &self.staged {
            let _ = fs::remove_file(temp);
        }
    }
}
