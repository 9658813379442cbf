//! # Filesystem Tree
//!
//! This crate provides the passive data model of the in-memory filesystem:
//! blocks, metadata, file and directory nodes, and path algorithms.
//!
//! ## Philosophy
//!
//! - **Ownership is exclusive**: every node is owned by exactly one parent;
//!   the tree is acyclic by construction, not by runtime check
//! - **Data and algorithms are passive**: nothing here checks permissions or
//!   calls back into the engine
//! - **Paths are views, not authority**: resolution locates nodes and never
//!   grants access
//! - **Content is block-segmented**: file bytes live in fixed-capacity blocks,
//!   the unit of storage of this model
//!
//! ## Design
//!
//! - A `Directory` owns its child `FileNode`s and `Directory`s directly
//!   (insertion-ordered, unique names per collection, linear name scans)
//! - `Metadata` carries name, owner, per-user rights, size and stamps
//! - `PathResolver` splits and validates absolute paths; traversal lives on
//!   `Directory::descend`/`descend_mut`

pub mod block;
pub mod metadata;
pub mod node;
pub mod path;

pub use block::{Block, BLOCK_CAPACITY};
pub use metadata::{Metadata, NodeId, Rights};
pub use node::{Directory, FileNode, NodeKind};
pub use path::{PathError, PathResolver};
