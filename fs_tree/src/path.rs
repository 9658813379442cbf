//! Absolute path parsing and validation
//!
//! Paths are `/`-delimited and always absolute. There are no special
//! segments in this model: literal `.` and `..` are ordinary names.
//! Parsing never consults the tree and never checks permissions.

use thiserror::Error;

/// Errors from path parsing and traversal
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// Path is malformed
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A traversal segment named no existing subdirectory
    #[error("Directory not found: {0}")]
    NotFound(String),
}

/// Absolute-path parsing helpers
pub struct PathResolver;

impl PathResolver {
    /// Splits an absolute path into its segments
    ///
    /// `/` yields no segments. Trailing slashes are tolerated; interior
    /// empty segments (`/a//b`) and relative paths are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use fs_tree::PathResolver;
    ///
    /// let segments = PathResolver::split_absolute("/docs/notes/todo.txt").unwrap();
    /// assert_eq!(segments, vec!["docs", "notes", "todo.txt"]);
    ///
    /// assert!(PathResolver::split_absolute("/").unwrap().is_empty());
    /// assert!(PathResolver::split_absolute("docs").is_err());
    /// ```
    pub fn split_absolute(path: &str) -> Result<Vec<&str>, PathError> {
        let Some(rest) = path.strip_prefix('/') else {
            return Err(PathError::InvalidPath(format!(
                "must start with '/': {path}"
            )));
        };

        let rest = rest.trim_end_matches('/');
        if rest.is_empty() {
            return Ok(Vec::new());
        }

        let segments: Vec<&str> = rest.split('/').collect();
        for segment in &segments {
            if segment.is_empty() {
                return Err(PathError::InvalidPath(format!(
                    "empty segment in: {path}"
                )));
            }
        }
        Ok(segments)
    }

    /// Splits an absolute path into parent segments and leaf name
    ///
    /// An empty parent means the leaf lives directly under the root. The
    /// root itself has no leaf, so `/` is rejected.
    pub fn split_parent(path: &str) -> Result<(Vec<&str>, &str), PathError> {
        let mut segments = Self::split_absolute(path)?;
        match segments.pop() {
            Some(leaf) => Ok((segments, leaf)),
            None => Err(PathError::InvalidPath(
                "path names no entry: /".to_string(),
            )),
        }
    }

    /// Validates a single entry name
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty() && !name.contains('/')
    }
}
