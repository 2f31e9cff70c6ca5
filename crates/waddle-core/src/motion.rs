//! Reference-motion file set resolution.
//!
//! The discriminator's training data ordering follows the order of this set,
//! so resolution must be reproducible across machines: directory iteration
//! order is not guaranteed stable, so results are always sorted
//! lexicographically and de-duplicated. An empty result set is fatal —
//! imitation cannot proceed with no reference data.
//!
//! Resolution is a pure, synchronous filesystem read performed once at
//! construction time, before any simulation worker starts.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, FatalConfigError, MissingMotionFileError, SchemaError};

/// Where the reference motions come from: a literal file list or a directory
/// glob pattern. Relative entries are resolved against the dataset root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionSource {
    Files(Vec<PathBuf>),
    Glob(String),
}

impl Default for MotionSource {
    fn default() -> Self {
        Self::Files(Vec::new())
    }
}

impl MotionSource {
    /// Whether the source declares nothing at all (empty file list).
    ///
    /// A glob source is never structurally empty; its emptiness is only known
    /// after [`MotionFileSet::resolve`].
    #[must_use]
    pub fn is_declared_empty(&self) -> bool {
        matches!(self, Self::Files(files) if files.is_empty())
    }
}

/// An ordered, resolved, de-duplicated set of reference-motion files.
///
/// All paths are absolute and verified to exist at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionFileSet {
    files: Vec<PathBuf>,
}

impl MotionFileSet {
    /// Resolve a motion source against a dataset root.
    ///
    /// Listed files that do not exist raise [`MissingMotionFileError`]; an
    /// empty result raises [`FatalConfigError::EmptyMotionSet`]. The returned
    /// set is sorted lexicographically regardless of declaration or
    /// filesystem order.
    pub fn resolve(source: &MotionSource, root: &Path) -> Result<Self, ConfigError> {
        let mut resolved = BTreeSet::new();

        match source {
            MotionSource::Files(files) => {
                for file in files {
                    let path = if file.is_absolute() {
                        file.clone()
                    } else {
                        root.join(file)
                    };
                    if !path.is_file() {
                        return Err(MissingMotionFileError { path }.into());
                    }
                    resolved.insert(canonical(&path)?);
                }
            }
            MotionSource::Glob(pattern) => {
                let full = if Path::new(pattern).is_absolute() {
                    pattern.clone()
                } else {
                    root.join(pattern).to_string_lossy().into_owned()
                };
                let entries = glob::glob(&full).map_err(|e| FatalConfigError::InvalidValue {
                    field: "amp_motion_files",
                    message: format!("bad glob pattern `{pattern}`: {e}"),
                })?;
                for entry in entries {
                    let path = entry.map_err(|e| SchemaError::Io(e.into_error()))?;
                    if path.is_file() {
                        resolved.insert(canonical(&path)?);
                    }
                }
            }
        }

        if resolved.is_empty() {
            return Err(FatalConfigError::EmptyMotionSet.into());
        }

        Ok(Self {
            files: resolved.into_iter().collect(),
        })
    }

    /// The resolved files, sorted lexicographically.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.files.iter()
    }
}

impl<'a> IntoIterator for &'a MotionFileSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

fn canonical(path: &Path) -> Result<PathBuf, SchemaError> {
    Ok(std::fs::canonicalize(path)?)
}
