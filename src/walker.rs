//! Directory walker producing the input units of a harvest.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Predicate selecting which files the walker yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryFilter {
    /// File name ends with the given suffix (e.g. `".py"`).
    Suffix(String),
    /// File name equals the given name exactly.
    Exact(String),
}

impl EntryFilter {
    pub fn suffix(suffix: &str) -> Self {
        EntryFilter::Suffix(suffix.to_string())
    }

    pub fn exact(name: &str) -> Self {
        EntryFilter::Exact(name.to_string())
    }

    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        match self {
            EntryFilter::Suffix(suffix) => name.ends_with(suffix.as_str()),
            EntryFilter::Exact(exact) => name == exact,
        }
    }
}

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Input root does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("Input root is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Recursive walker over a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryWalker {
    root: PathBuf,
    filter: EntryFilter,
    max_depth: Option<usize>,
}

impl DirectoryWalker {
    pub fn new(root: impl Into<PathBuf>, filter: EntryFilter) -> Self {
        Self {
            root: root.into(),
            filter,
            max_depth: None,
        }
    }

    /// Limits recursion; `1` lists only the root's own files.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Starts the walk.
    ///
    /// # Errors
    ///
    /// Fails only when the root itself is missing or not a directory.
    /// Unreadable entries below the root are skipped.
    pub fn walk(&self) -> Result<Walk, WalkError> {
        if !self.root.exists() {
            return Err(WalkError::RootNotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(WalkError::NotADirectory(self.root.clone()));
        }

        let mut walkdir = WalkDir::new(&self.root).sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walkdir = walkdir.max_depth(depth);
        }

        Ok(Walk {
            inner: walkdir.into_iter(),
            filter: self.filter.clone(),
        })
    }
}

/// Lazy, single-pass sequence of matching file paths.
pub struct Walk {
    inner: walkdir::IntoIter,
    filter: EntryFilter,
}

impl Iterator for Walk {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if entry.file_type().is_file() && self.filter.matches(entry.path()) {
                return Some(entry.into_path());
            }
        }
    }
}
