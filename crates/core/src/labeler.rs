//! Moves an image into the labeled folder and writes its point labels.

use crate::error::{Result, StoreError};
use crate::labels::{LabelRecord, Tag};
use crate::store::ImageStore;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LabelOutcome {
    pub image_path: PathBuf,
    pub label_path: PathBuf,
    pub records: usize,
}

#[derive(Debug, Clone)]
pub struct Labeler {
    store: ImageStore,
    labeled_dir: PathBuf,
    validate_before_move: bool,
}

impl Labeler {
    pub fn new(store: ImageStore, labeled_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            labeled_dir: labeled_dir.into(),
            validate_before_move: false,
        }
    }

    /// Reject unknown tag names before the image leaves the source folder.
    pub fn validate_before_move(mut self, enabled: bool) -> Self {
        self.validate_before_move = enabled;
        self
    }

    pub fn labeled_dir(&self) -> &Path {
        &self.labeled_dir
    }

    /// Moves `image_name` into the labeled folder and writes one record per
    /// tag, in order, to the sibling `.txt` file.
    ///
    /// Unless `validate_before_move` is set, tags are checked while the label
    /// file is written. An unknown name then aborts with the image already
    /// moved and the label file holding only the records before it.
    pub fn label_image(&self, image_name: &str, tags: &[Tag]) -> Result<LabelOutcome> {
        let from = self.store.resolve(image_name)?;

        if self.validate_before_move {
            if let Some(bad) = tags.iter().find(|t| LabelRecord::from_tag(t).is_none()) {
                return Err(StoreError::UnknownLabel {
                    name: bad.name.clone(),
                });
            }
        }

        let to = self.labeled_dir.join(image_name);
        let label_path = to.with_extension("txt");
        check_label_slot(&from, &to, &label_path)?;
        move_file(&from, &to)?;
        tracing::info!(image = %image_name, to = ?to, "image moved to labeled folder");

        let records = write_records(&label_path, tags)?;
        tracing::info!(image = %image_name, records, label = ?label_path, "labels written");

        Ok(LabelOutcome {
            image_path: to,
            label_path,
            records,
        })
    }
}

/// The label file must not be the image itself, nor replace another image's
/// labels (`frame.jpg` after `frame.png`).
fn check_label_slot(from: &Path, to: &Path, label_path: &Path) -> Result<()> {
    let reason = if label_path == to {
        format!("{} would be overwritten by its own label file", to.display())
    } else if label_path.exists() {
        format!("label file {} already exists", label_path.display())
    } else {
        return Ok(());
    };
    Err(StoreError::MoveFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source: io::Error::new(io::ErrorKind::AlreadyExists, reason),
    })
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
    let fail = |source: io::Error| StoreError::MoveFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    if to.exists() {
        return Err(fail(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("destination {} already exists", to.display()),
        )));
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(fail)?;
    }
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if is_cross_device(&err) => {
            tracing::debug!(error = %err, "rename crosses filesystems, copying instead");
            copy_then_remove(from, to).map_err(fail)
        }
        Err(err) => Err(fail(err)),
    }
}

#[cfg(unix)]
const EXDEV: i32 = 18;
#[cfg(windows)]
const EXDEV: i32 = 17; // ERROR_NOT_SAME_DEVICE

fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(EXDEV)
}

/// Copies `from` to `to`, then removes `from`. On any failure the copy is
/// deleted again so the image is never left in both folders.
fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    let result = fs::copy(from, to).and_then(|_| fs::remove_file(from));
    if result.is_err() {
        if let Err(cleanup) = fs::remove_file(to) {
            if cleanup.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = ?to, error = %cleanup, "could not remove partial copy");
            }
        }
    }
    result
}

fn write_records(path: &Path, tags: &[Tag]) -> Result<usize> {
    let write_err = |source: io::Error| StoreError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(write_err)?;
    let mut out = BufWriter::new(file);
    let mut written = 0;
    for tag in tags {
        let Some(record) = LabelRecord::from_tag(tag) else {
            out.flush().map_err(write_err)?;
            return Err(StoreError::UnknownLabel {
                name: tag.name.clone(),
            });
        };
        writeln!(out, "{record}").map_err(write_err)?;
        written += 1;
    }
    out.flush().map_err(write_err)?;
    Ok(written)
}
