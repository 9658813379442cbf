//! # Filesystem Engine Service
//!
//! This service implements the path-based operation surface over the
//! in-memory tree.
//!
//! ## Philosophy
//!
//! - **Validate, then mutate**: every operation checks all inputs before
//!   touching the tree; failures leave it unmodified
//! - **Permissions are explicit grants**: only `root` bypasses them
//! - **The engine owns the tree**: callers hold paths and user ids, never
//!   node references
//! - **Every mutation is logged**: structured entries, no global logger
//!
//! ## Operations
//!
//! - `mkdir(path, name)`: Create a directory under a resolved parent
//! - `touch(path, user)`: Create an empty file
//! - `write(path, user, append, data)`: Replace or append block content
//! - `read(path, user, buf)`: Copy content out, never overflowing `buf`
//! - `rm(path, user, recursive)`: Remove a file or directory subtree
//! - `chmod(path, acting, target, rights)`: Set a user's rights entry
//! - `mv(old, new, user)`: Re-parent a node, no content copy
//! - `ls(path, user, recursive)`: List children, optionally depth-first
//! - `cp(src, dst, user, recursive)`: Deep-copy a file or subtree
//! - `stat(path, user)`: Metadata for a single node

pub mod audit;
pub mod engine;
pub mod operations;

pub use audit::{LogEntry, LogLevel, OperationLog};
pub use engine::FileSystemEngine;
pub use operations::{FileSystemOperations, FsError, ListEntry, StatEntry};
