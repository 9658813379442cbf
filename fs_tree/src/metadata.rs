//! Node metadata, identifiers and rights
//!
//! Every node carries a `Metadata` record: its name within the parent, its
//! owning user, the explicit per-user rights map, its size and its stamps.
//! Rights come only from the explicit map; no user except `root` holds
//! implicit rights, owners included.

use identity::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a node
///
/// Ids exist for diagnostics and listings; they carry no authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Creates a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a node ID from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Per-user grant of read/write rights on a node
///
/// Parsed from the permission-string form: a string drawn from `{r, w}`.
/// Absence of a letter denies that right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rights {
    /// May read content / listings
    pub read: bool,
    /// May create, modify or append
    pub write: bool,
}

impl Rights {
    /// No rights at all; the value a missing map entry denotes
    pub const NONE: Rights = Rights {
        read: false,
        write: false,
    };

    /// Both rights
    pub const READ_WRITE: Rights = Rights {
        read: true,
        write: true,
    };

    /// Parses the permission-string form
    ///
    /// Only `r` and `w` are recognized; other characters are ignored.
    pub fn parse(permission: &str) -> Self {
        Self {
            read: permission.contains('r'),
            write: permission.contains('w'),
        }
    }
}

impl fmt::Display for Rights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.read {
            write!(f, "r")?;
        }
        if self.write {
            write!(f, "w")?;
        }
        Ok(())
    }
}

/// Metadata attached to every node
///
/// `size` is redundant with the node's block total and is kept consistent
/// on every content mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Node identifier
    pub id: NodeId,
    /// Entry name within the parent; `/` for the root only
    pub name: String,
    /// Owning user
    pub owner: UserId,
    /// Content bytes for files; 0 for directories
    pub size: u64,
    /// Creation stamp (engine logical clock)
    pub created_at: u64,
    /// Last modification stamp
    pub modified_at: u64,
    /// Explicit per-user grants
    permissions: BTreeMap<UserId, Rights>,
}

impl Metadata {
    /// Creates metadata for a new node
    pub fn new(name: impl Into<String>, owner: UserId, now: u64) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            owner,
            size: 0,
            created_at: now,
            modified_at: now,
            permissions: BTreeMap::new(),
        }
    }

    /// Rights of a user on this node
    ///
    /// A missing entry denies everything; ownership grants nothing by
    /// itself. The `root` bypass is the engine's concern, not metadata's.
    pub fn rights_for(&self, user: &UserId) -> Rights {
        self.permissions.get(user).copied().unwrap_or(Rights::NONE)
    }

    /// Sets or overwrites a user's rights entry
    pub fn grant(&mut self, user: UserId, rights: Rights) {
        self.permissions.insert(user, rights);
    }

    /// The explicit rights map
    pub fn permissions(&self) -> &BTreeMap<UserId, Rights> {
        &self.permissions
    }

    /// Updates the modification stamp
    pub fn touch_modified(&mut self, now: u64) {
        self.modified_at = now;
    }
}
