//! Filesystem operations
//!
//! This module defines the engine's operation surface: the error kinds,
//! the listing/stat result types and the operations trait.

use fs_tree::{NodeId, NodeKind, PathError, Rights};
use identity::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors reported by filesystem operations
///
/// Every failure is an ordinary outcome of invalid input or insufficient
/// privilege. The tree is left unmodified on all failure paths.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FsError {
    /// Creation target already present
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Path segment or leaf cannot be located
    #[error("Not found: {0}")]
    NotFound(String),

    /// Ownership or grant check failed
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Malformed path, or a structurally unsafe move
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl From<PathError> for FsError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::InvalidPath(message) => FsError::InvalidPath(message),
            PathError::NotFound(segment) => FsError::NotFound(segment),
        }
    }
}

/// A single `ls` result entry
///
/// `path` is relative to the listed directory, with enough structure to
/// reconstruct the hierarchy from a recursive listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    /// Path relative to the listed directory
    pub path: String,
    /// Entry name (final segment of `path`)
    pub name: String,
    /// File or directory
    pub kind: NodeKind,
    /// Node id
    pub id: NodeId,
    /// Owning user
    pub owner: UserId,
    /// Content bytes for files; 0 for directories
    pub size: u64,
}

/// Result of a `stat` query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatEntry {
    /// Node id
    pub id: NodeId,
    /// Entry name; `/` for the root
    pub name: String,
    /// File or directory
    pub kind: NodeKind,
    /// Owning user
    pub owner: UserId,
    /// Content bytes for files; 0 for directories
    pub size: u64,
    /// Creation stamp
    pub created_at: u64,
    /// Last modification stamp
    pub modified_at: u64,
    /// Explicit per-user grants
    pub permissions: BTreeMap<UserId, Rights>,
    /// Direct child count for directories
    pub entry_count: Option<usize>,
}

/// Filesystem operations trait
///
/// This trait defines the complete path-based operation surface. Paths are
/// always absolute; user ids are opaque and `root` bypasses every
/// permission check.
pub trait FileSystemOperations {
    /// Create a directory named `name` under the directory at `path`
    ///
    /// The new directory is owned by the PARENT's owner, not by any acting
    /// user — mkdir takes none. A missing parent is reported as
    /// `PermissionDenied`, not `NotFound`.
    fn mkdir(&mut self, path: &str, name: &str) -> Result<NodeId, FsError>;

    /// Create an empty file at `path`, owned by `user`
    ///
    /// Requires a write grant on the parent directory unless `user` is
    /// `root`. A missing parent is reported as `PermissionDenied`.
    fn touch(&mut self, path: &str, user: &UserId) -> Result<NodeId, FsError>;

    /// Write `data` to the file at `path`
    ///
    /// Truncates first unless `append` is set, then appends the bytes as
    /// fresh blocks. Requires a write grant on the FILE unless `user` is
    /// `root`.
    fn write(&mut self, path: &str, user: &UserId, append: bool, data: &[u8])
        -> Result<(), FsError>;

    /// Copy the file's content into `buf`, returning the bytes copied
    ///
    /// Stops at the end of the buffer or the content, whichever comes
    /// first; a short buffer is silent truncation, never an error.
    /// Requires a read grant on the file unless `user` is `root`.
    fn read(&self, path: &str, user: &UserId, buf: &mut [u8]) -> Result<usize, FsError>;

    /// Remove the file or directory at `path`
    ///
    /// Ownership-gated: `user` must own the node or be `root`. A non-empty
    /// directory without `recursive` is `PermissionDenied`.
    fn rm(&mut self, path: &str, user: &UserId, recursive: bool) -> Result<(), FsError>;

    /// Set `target`'s rights entry on the directory at `path`
    ///
    /// Only the directory's owner or `root` may change grants.
    fn chmod(
        &mut self,
        path: &str,
        acting: &UserId,
        target: &UserId,
        rights: Rights,
    ) -> Result<(), FsError>;

    /// Move the node at `old_path` to `new_path`
    ///
    /// Pure re-parenting: the node is detached, renamed to the destination
    /// leaf and attached — no content copy. Moving a directory into its own
    /// subtree is `InvalidPath`.
    fn mv(&mut self, old_path: &str, new_path: &str, user: &UserId) -> Result<(), FsError>;

    /// List the directory at `path`
    ///
    /// Files come before subdirectories, each in insertion order;
    /// `recursive` descends depth-first with relative paths.
    fn ls(&self, path: &str, user: &UserId, recursive: bool) -> Result<Vec<ListEntry>, FsError>;

    /// Copy the node at `src_path` to `dst_path`
    ///
    /// Deep copy: blocks are duplicated and every new node is owned by
    /// `user` with a fresh id and an empty rights map. Requires read grants
    /// on the source file, or on every file of the source subtree, unless
    /// `user` is `root`.
    fn cp(
        &mut self,
        src_path: &str,
        dst_path: &str,
        user: &UserId,
        recursive: bool,
    ) -> Result<(), FsError>;

    /// Metadata for the node at `path`
    fn stat(&self, path: &str, user: &UserId) -> Result<StatEntry, FsError>;
}
