//! Repository file discovery.
//!
//! Walks a repository root, applies glob include/exclude patterns
//! and a size limit, and reports files relative to the root. Hidden
//! directories are skipped. Walk errors (permission denied, broken
//! links) are logged and do not stop the walk.

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::core::error::{Result, TesseraError};

/// A file found under a repository root
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiscoveredFile {
    /// Path relative to the root, `/`-separated
    pub relative: String,

    /// Absolute (or root-joined) path for reading
    pub absolute: PathBuf,
}

/// File system walker with pattern-based filtering
#[derive(Debug, Clone)]
pub struct FileWalker {
    include_patterns: Vec<Pattern>,
    exclude_patterns: Vec<Pattern>,
    max_file_size_bytes: u64,
}

fn compile(patterns: Vec<String>, kind: &str) -> Result<Vec<Pattern>> {
    patterns
        .into_iter()
        .map(|p| {
            Pattern::new(&p).map_err(|e| {
                TesseraError::ConfigError(format!("Invalid {kind} pattern '{p}': {e}"))
            })
        })
        .collect()
}

/// `/`-separated form of `path` relative to `root`
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

impl FileWalker {
    /// Create a new file walker.
    ///
    /// Returns a configuration error if any pattern fails to parse.
    pub fn new(
        include_patterns: Vec<String>,
        exclude_patterns: Vec<String>,
        max_file_size_mb: usize,
    ) -> Result<Self> {
        Ok(Self {
            include_patterns: compile(include_patterns, "include")?,
            exclude_patterns: compile(exclude_patterns, "exclude")?,
            max_file_size_bytes: (max_file_size_mb as u64) * 1024 * 1024,
        })
    }

    /// Collect matching files under `root`, sorted by relative path
    pub fn collect_files(&self, root: &Path) -> Result<Vec<DiscoveredFile>> {
        if !root.is_dir() {
            return Err(TesseraError::InvalidPath(format!(
                "Repository root is not a directory: {root:?}"
            )));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.should_descend(e, root))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Walk error: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if let Ok(metadata) = entry.metadata() {
                if metadata.len() > self.max_file_size_bytes {
                    tracing::debug!(
                        "Skipping large file: {:?} ({} bytes)",
                        entry.path(),
                        metadata.len()
                    );
                    continue;
                }
            }

            let Some(relative) = relative_path(root, entry.path()) else {
                tracing::debug!("Skipping non-UTF-8 path: {:?}", entry.path());
                continue;
            };

            if self.matches(&relative) {
                files.push(DiscoveredFile {
                    relative,
                    absolute: entry.path().to_path_buf(),
                });
            }
        }

        files.sort();
        Ok(files)
    }

    /// Skip hidden and excluded directories without descending
    fn should_descend(&self, entry: &DirEntry, root: &Path) -> bool {
        let path = entry.path();
        if path == root || !entry.file_type().is_dir() {
            return true;
        }

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                return false;
            }
        }

        match relative_path(root, path) {
            Some(rel) => {
                let probe = format!("/{rel}/");
                !self
                    .exclude_patterns
                    .iter()
                    .any(|p| p.matches(&rel) || p.matches(&probe))
            }
            None => true,
        }
    }

    /// Check a relative path against include/exclude patterns.
    ///
    /// Include patterns match either the full relative path or the
    /// file name, so `*.rs` works at any depth.
    pub fn matches(&self, relative: &str) -> bool {
        let file_name = relative.rsplit('/').next().unwrap_or(relative);
        // Leading "/" lets "**/target/**" match a top-level "target/"
        let rooted = format!("/{relative}");

        let included = self.include_patterns.is_empty()
            || self
                .include_patterns
                .iter()
                .any(|p| p.matches(relative) || p.matches(file_name));

        included
            && !self
                .exclude_patterns
                .iter()
                .any(|p| p.matches(relative) || p.matches(&rooted))
    }
}
