//! File and directory nodes
//!
//! Nodes own their data exclusively: a file owns its blocks, a directory
//! owns its children. There are no parent back-links; re-parenting detaches
//! a whole node and attaches it elsewhere. Child collections are
//! insertion-ordered with unique names per collection and are searched by
//! linear scan.

use crate::block::Block;
use crate::metadata::Metadata;
use identity::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A file: metadata plus content blocks
    File,
    /// A directory: metadata plus children
    Directory,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::File => write!(f, "File"),
            NodeKind::Directory => write!(f, "Directory"),
        }
    }
}

/// A file: metadata plus an ordered run of content blocks
///
/// `metadata.size` always equals the total block bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// Node metadata
    pub metadata: Metadata,
    blocks: Vec<Block>,
}

impl FileNode {
    /// Creates an empty file
    pub fn new(name: impl Into<String>, owner: UserId, now: u64) -> Self {
        Self {
            metadata: Metadata::new(name, owner, now),
            blocks: Vec::new(),
        }
    }

    /// The file's blocks, in content order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Discards all content and resets size to zero
    pub fn truncate(&mut self, now: u64) {
        self.blocks.clear();
        self.metadata.size = 0;
        self.metadata.touch_modified(now);
    }

    /// Appends bytes as freshly chunked blocks
    ///
    /// Appending nothing is a no-op; the stamp is untouched.
    pub fn append(&mut self, data: &[u8], now: u64) {
        if data.is_empty() {
            return;
        }
        self.blocks.extend(Block::chunk(data));
        self.metadata.size += data.len() as u64;
        self.metadata.touch_modified(now);
    }

    /// The full content, blocks concatenated in order
    pub fn content(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.metadata.size as usize);
        for block in &self.blocks {
            bytes.extend_from_slice(block.data());
        }
        bytes
    }

    /// Copies content into `buf` from offset 0
    ///
    /// Stops at the end of the buffer or of the content, whichever comes
    /// first, and returns the number of bytes copied. Never overflows the
    /// buffer; a short buffer is silent truncation, not an error.
    pub fn read_into(&self, buf: &mut [u8]) -> usize {
        let mut copied = 0;
        for block in &self.blocks {
            if copied == buf.len() {
                break;
            }
            let take = block.len().min(buf.len() - copied);
            buf[copied..copied + take].copy_from_slice(&block.data()[..take]);
            copied += take;
        }
        copied
    }

    /// Deep-copies the content into a new file with fresh identity
    ///
    /// The copy keeps the block layout but gets a new id, the given name
    /// and owner, fresh stamps and an empty rights map.
    pub fn duplicate_as(&self, name: impl Into<String>, owner: UserId, now: u64) -> FileNode {
        let mut metadata = Metadata::new(name, owner, now);
        metadata.size = self.metadata.size;
        FileNode {
            metadata,
            blocks: self.blocks.clone(),
        }
    }
}

/// A directory: metadata plus exclusively-owned children
///
/// Files and subdirectories live in separate collections; names are
/// unique within each collection, so a file and a subdirectory may
/// share a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    /// Node metadata
    pub metadata: Metadata,
    files: Vec<FileNode>,
    subdirectories: Vec<Directory>,
}

impl Directory {
    /// Creates an empty directory
    pub fn new(name: impl Into<String>, owner: UserId, now: u64) -> Self {
        Self {
            metadata: Metadata::new(name, owner, now),
            files: Vec::new(),
            subdirectories: Vec::new(),
        }
    }

    /// Creates the tree root: named `/`, owned by `root`
    pub fn root(now: u64) -> Self {
        Self::new("/", UserId::root(), now)
    }

    /// Child files in insertion order
    pub fn files(&self) -> &[FileNode] {
        &self.files
    }

    /// Child subdirectories in insertion order
    pub fn subdirectories(&self) -> &[Directory] {
        &self.subdirectories
    }

    /// Finds a child file by name
    pub fn file(&self, name: &str) -> Option<&FileNode> {
        self.files.iter().find(|f| f.metadata.name == name)
    }

    /// Finds a child file by name, mutably
    pub fn file_mut(&mut self, name: &str) -> Option<&mut FileNode> {
        self.files.iter_mut().find(|f| f.metadata.name == name)
    }

    /// Finds a child subdirectory by name
    pub fn subdirectory(&self, name: &str) -> Option<&Directory> {
        self.subdirectories.iter().find(|d| d.metadata.name == name)
    }

    /// Finds a child subdirectory by name, mutably
    pub fn subdirectory_mut(&mut self, name: &str) -> Option<&mut Directory> {
        self.subdirectories
            .iter_mut()
            .find(|d| d.metadata.name == name)
    }

    /// Whether any child, file or subdirectory, has this name
    pub fn contains_entry(&self, name: &str) -> bool {
        self.file(name).is_some() || self.subdirectory(name).is_some()
    }

    /// Appends a child file
    ///
    /// Returns true if the file was added, false if a file of that name
    /// already exists.
    pub fn add_file(&mut self, file: FileNode) -> bool {
        if self.file(&file.metadata.name).is_some() {
            return false;
        }
        self.files.push(file);
        true
    }

    /// Appends a child subdirectory
    ///
    /// Returns false if a subdirectory of that name already exists.
    pub fn add_subdirectory(&mut self, dir: Directory) -> bool {
        if self.subdirectory(&dir.metadata.name).is_some() {
            return false;
        }
        self.subdirectories.push(dir);
        true
    }

    /// Detaches a child file by name
    pub fn remove_file(&mut self, name: &str) -> Option<FileNode> {
        let idx = self.files.iter().position(|f| f.metadata.name == name)?;
        Some(self.files.remove(idx))
    }

    /// Detaches a child subdirectory by name, subtree and all
    pub fn remove_subdirectory(&mut self, name: &str) -> Option<Directory> {
        let idx = self
            .subdirectories
            .iter()
            .position(|d| d.metadata.name == name)?;
        Some(self.subdirectories.remove(idx))
    }

    /// Whether the directory has no children at all
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.subdirectories.is_empty()
    }

    /// Number of direct children, files and subdirectories
    pub fn entry_count(&self) -> usize {
        self.files.len() + self.subdirectories.len()
    }

    /// Walks down through named subdirectories
    ///
    /// Each segment must name an existing subdirectory; the first miss
    /// reports the missing segment's name. An empty segment list locates
    /// this directory itself.
    pub fn descend(&self, segments: &[&str]) -> Result<&Directory, crate::path::PathError> {
        let mut current = self;
        for segment in segments {
            current = current
                .subdirectory(segment)
                .ok_or_else(|| crate::path::PathError::NotFound((*segment).to_string()))?;
        }
        Ok(current)
    }

    /// Walks down through named subdirectories, mutably
    pub fn descend_mut(
        &mut self,
        segments: &[&str],
    ) -> Result<&mut Directory, crate::path::PathError> {
        let mut current = self;
        for segment in segments {
            current = current
                .subdirectory_mut(segment)
                .ok_or_else(|| crate::path::PathError::NotFound((*segment).to_string()))?;
        }
        Ok(current)
    }

    /// Deep-copies the whole subtree under a new identity
    ///
    /// Every node in the copy — this directory and all descendants — gets a
    /// fresh id, the given owner, fresh stamps and an empty rights map.
    /// Block content is duplicated byte for byte.
    pub fn duplicate_as(&self, name: impl Into<String>, owner: UserId, now: u64) -> Directory {
        let mut copy = Directory::new(name, owner.clone(), now);
        for file in &self.files {
            copy.files
                .push(file.duplicate_as(file.metadata.name.clone(), owner.clone(), now));
        }
        for dir in &self.subdirectories {
            copy.subdirectories
                .push(dir.duplicate_as(dir.metadata.name.clone(), owner.clone(), now));
        }
        copy
    }
}
