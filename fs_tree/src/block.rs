//! Fixed-capacity content blocks
//!
//! File content is stored as an ordered run of blocks. Each block holds at
//! most [`BLOCK_CAPACITY`] bytes; only the last block of a run may be
//! shorter. Blocks are immutable once placed — rewriting a file replaces
//! its blocks wholesale.

use serde::{Deserialize, Serialize};

/// Number of content bytes a single block can hold.
pub const BLOCK_CAPACITY: usize = 1024;

/// A fixed-capacity chunk of file content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    data: Vec<u8>,
}

impl Block {
    /// Chunks a byte slice into blocks
    ///
    /// Every block is filled to capacity except the last, which holds the
    /// remainder. Empty input yields no blocks.
    pub fn chunk(data: &[u8]) -> Vec<Block> {
        data.chunks(BLOCK_CAPACITY)
            .map(|chunk| Block {
                data: chunk.to_vec(),
            })
            .collect()
    }

    /// Returns the block's content bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of content bytes in this block
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the block holds no bytes
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
