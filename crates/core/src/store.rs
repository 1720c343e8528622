//! Read access to the folder of unlabeled images.

use crate::error::{Result, StoreError};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    excludes: GlobSet,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, excludes: &[String]) -> anyhow::Result<Self> {
        Ok(Self {
            root: root.into(),
            excludes: build_globset(excludes)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Regular files directly inside the root, sorted by name.
    ///
    /// Subdirectories (including the labeled folder when it is nested in the
    /// root) are never descended into.
    pub fn list_images(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(e) => e,
                Err(err) if err.depth() == 0 => {
                    return Err(StoreError::EnumerationFailed {
                        path: self.root.clone(),
                        source: err.into(),
                    });
                }
                Err(err) => {
                    tracing::debug!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                tracing::debug!(path = ?entry.path(), "skipping non UTF-8 file name");
                continue;
            };
            if self.excludes.is_match(name) {
                continue;
            }
            names.push(name.to_string());
        }
        Ok(names)
    }

    /// Path of `name` if it is currently listed.
    ///
    /// Only literal basenames from a fresh listing are accepted, so strings
    /// like `../secret` can never resolve.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let listed = self.list_images().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "image listing failed, treating as empty");
            Vec::new()
        });
        if listed.iter().any(|n| n == name) {
            Ok(self.root.join(name))
        } else {
            Err(StoreError::NotFound {
                name: name.to_string(),
            })
        }
    }
}

/// Creates `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
