//! # Identity
//!
//! This crate provides user identity primitives for the filesystem engine.
//!
//! ## Philosophy
//!
//! - **Identity is explicit, not ambient**: every operation names its acting user
//! - **Identity does NOT grant authority by itself**: rights come from explicit
//!   grants on nodes
//! - **`root` is the single super-user**: the only identity with implicit rights
//! - **Testability first; no hidden global state**
//!
//! ## Core Concepts
//!
//! - `UserId`: opaque, case-sensitive identifier for a user
//! - `UserRegistry`: advisory set of known users; `root` is always present

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Name of the universal super-user.
pub const ROOT_USER: &str = "root";

/// Opaque identifier for a user
///
/// User ids are case-sensitive strings with no further structure. The
/// well-known `root` id bypasses every permission check in the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Creates a user id from a name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The well-known super-user
    pub fn root() -> Self {
        Self(ROOT_USER.to_string())
    }

    /// Returns the user name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks whether this id names the super-user
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_USER
    }
}

impl From<&str> for UserId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity-related errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    #[error("The root user is permanent and cannot be removed")]
    RootIsPermanent,
}

/// Advisory set of known users
///
/// The registry records which identities the system knows about. Membership
/// is NOT enforced on filesystem operations; front ends that want to validate
/// identities up front can query it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistry {
    users: BTreeSet<UserId>,
}

impl UserRegistry {
    /// Creates a registry containing only `root`
    pub fn new() -> Self {
        let mut users = BTreeSet::new();
        users.insert(UserId::root());
        Self { users }
    }

    /// Registers a user
    ///
    /// Returns true if the user was added, false if it was already known.
    pub fn add(&mut self, user: UserId) -> bool {
        self.users.insert(user)
    }

    /// Removes a user from the registry
    ///
    /// `root` can never be removed.
    pub fn remove(&mut self, user: &UserId) -> Result<(), IdentityError> {
        if user.is_root() {
            return Err(IdentityError::RootIsPermanent);
        }
        if !self.users.remove(user) {
            return Err(IdentityError::UnknownUser(user.clone()));
        }
        Ok(())
    }

    /// Checks whether a user is known
    pub fn contains(&self, user: &UserId) -> bool {
        self.users.contains(user)
    }

    /// Iterates over the known users in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &UserId> {
        self.users.iter()
    }

    /// Counts the known users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// A freshly created registry already contains `root`
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for UserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
