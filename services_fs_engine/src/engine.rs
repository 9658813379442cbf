//! Filesystem engine
//!
//! The engine owns the tree root, the advisory user registry, the logical
//! clock and the operation log. Every operation resolves its path(s),
//! checks permissions against node metadata, then mutates or reads the
//! tree; all checks complete before the first mutation.

use crate::audit::{LogEntry, LogLevel, OperationLog};
use crate::operations::{FileSystemOperations, FsError, ListEntry, StatEntry};
use fs_tree::{Directory, FileNode, NodeId, NodeKind, PathResolver, Rights};
use identity::{UserId, UserRegistry};

/// The filesystem engine
///
/// Single-owner, synchronous: operations run to completion one at a time.
/// Embedding in a threaded host requires one exclusive lock around the
/// whole engine.
#[derive(Debug, Clone)]
pub struct FileSystemEngine {
    root: Directory,
    users: UserRegistry,
    clock: u64,
    log: OperationLog,
}

impl FileSystemEngine {
    /// Creates an engine with an empty root directory owned by `root`
    pub fn new() -> Self {
        Self {
            root: Directory::root(0),
            users: UserRegistry::new(),
            clock: 0,
            log: OperationLog::new(),
        }
    }

    /// Registers a user in the advisory registry
    ///
    /// Membership is not enforced on operations; the registry exists for
    /// front ends that validate identities up front.
    pub fn add_user(&mut self, user: UserId) -> bool {
        let added = self.users.add(user.clone());
        self.log.push(
            LogEntry::new(LogLevel::Info, "fs.add_user").with_field("user", user.as_str()),
        );
        added
    }

    /// The advisory user registry
    pub fn users(&self) -> &UserRegistry {
        &self.users
    }

    /// The operation log, oldest entry first
    pub fn audit(&self) -> &OperationLog {
        &self.log
    }

    /// Read-only view of the tree root
    pub fn root(&self) -> &Directory {
        &self.root
    }

    /// Reads the whole content of the file at `path`
    ///
    /// Convenience over [`FileSystemOperations::read`] for callers that
    /// want the full bytes rather than filling their own buffer.
    pub fn read_to_vec(&self, path: &str, user: &UserId) -> Result<Vec<u8>, FsError> {
        let file = self.resolve_file(path)?;
        require_read(file, user)?;
        Ok(file.content())
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn record(&mut self, action: &str, fields: &[(&str, &str)], error: Option<&FsError>) {
        let level = if error.is_some() {
            LogLevel::Warn
        } else {
            LogLevel::Info
        };
        let mut entry = LogEntry::new(level, action);
        for (key, value) in fields {
            entry = entry.with_field(*key, *value);
        }
        if let Some(err) = error {
            entry = entry.with_field("error", err.to_string());
        }
        self.log.push(entry);
    }

    fn resolve_dir(&self, path: &str) -> Result<&Directory, FsError> {
        let segments = PathResolver::split_absolute(path)?;
        Ok(self.root.descend(&segments)?)
    }

    fn resolve_dir_mut(&mut self, path: &str) -> Result<&mut Directory, FsError> {
        let segments = PathResolver::split_absolute(path)?;
        Ok(self.root.descend_mut(&segments)?)
    }

    /// Locates the parent directory of `path` and the leaf name
    fn resolve_parent_mut<'e, 'p>(
        &'e mut self,
        path: &'p str,
    ) -> Result<(&'e mut Directory, &'p str), FsError> {
        let (parent_segments, leaf) = PathResolver::split_parent(path)?;
        let parent = self.root.descend_mut(&parent_segments)?;
        Ok((parent, leaf))
    }

    fn resolve_file(&self, path: &str) -> Result<&FileNode, FsError> {
        let (parent_segments, name) = PathResolver::split_parent(path)?;
        let parent = self.root.descend(&parent_segments)?;
        parent
            .file(name)
            .ok_or_else(|| FsError::NotFound(format!("file not found: {name}")))
    }

    fn mkdir_inner(&mut self, path: &str, name: &str) -> Result<NodeId, FsError> {
        if !PathResolver::is_valid_name(name) {
            return Err(FsError::InvalidPath(format!("invalid entry name: {name}")));
        }
        let now = self.tick();
        // compatibility: a missing parent is a permission failure here
        let parent = match self.resolve_dir_mut(path) {
            Ok(parent) => parent,
            Err(FsError::NotFound(_)) => {
                return Err(FsError::PermissionDenied(
                    "parent directory not found".to_string(),
                ))
            }
            Err(err) => return Err(err),
        };

        if parent.subdirectory(name).is_some() {
            return Err(FsError::AlreadyExists(format!(
                "directory already exists: {name}"
            )));
        }

        // The new directory inherits the PARENT's owner, and the write
        // check is against that owner's own rights entry.
        let owner = parent.metadata.owner.clone();
        if !owner.is_root() && !parent.metadata.rights_for(&owner).write {
            return Err(FsError::PermissionDenied(format!(
                "cannot create directory under {}",
                parent.metadata.name
            )));
        }

        let dir = Directory::new(name, owner, now);
        let id = dir.metadata.id;
        parent.add_subdirectory(dir);
        Ok(id)
    }

    fn touch_inner(&mut self, path: &str, user: &UserId) -> Result<NodeId, FsError> {
        let now = self.tick();
        // same missing-parent translation as mkdir
        let (parent, name) = match self.resolve_parent_mut(path) {
            Ok(located) => located,
            Err(FsError::NotFound(_)) => {
                return Err(FsError::PermissionDenied(
                    "parent directory not found".to_string(),
                ))
            }
            Err(err) => return Err(err),
        };

        if parent.file(name).is_some() {
            return Err(FsError::AlreadyExists(format!(
                "file already exists: {name}"
            )));
        }

        if !user.is_root() && !parent.metadata.rights_for(user).write {
            return Err(FsError::PermissionDenied(format!(
                "cannot create file under {}",
                parent.metadata.name
            )));
        }

        let file = FileNode::new(name, user.clone(), now);
        let id = file.metadata.id;
        parent.add_file(file);
        Ok(id)
    }

    fn write_inner(
        &mut self,
        path: &str,
        user: &UserId,
        append: bool,
        data: &[u8],
    ) -> Result<(), FsError> {
        let now = self.tick();
        let (parent, name) = self.resolve_parent_mut(path)?;
        let file = parent
            .file_mut(name)
            .ok_or_else(|| FsError::NotFound(format!("file not found: {name}")))?;

        if !user.is_root() && !file.metadata.rights_for(user).write {
            return Err(FsError::PermissionDenied(format!("cannot write to {name}")));
        }

        if !append {
            file.truncate(now);
        }
        file.append(data, now);
        Ok(())
    }

    fn rm_inner(&mut self, path: &str, user: &UserId, recursive: bool) -> Result<(), FsError> {
        let (parent, name) = self.resolve_parent_mut(path)?;

        // files are searched before subdirectories
        if let Some(file) = parent.file(name) {
            if !user.is_root() && file.metadata.owner != *user {
                return Err(FsError::PermissionDenied(format!(
                    "cannot remove file {name}"
                )));
            }
            parent.remove_file(name);
            return Ok(());
        }

        if let Some(dir) = parent.subdirectory(name) {
            if !user.is_root() && dir.metadata.owner != *user {
                return Err(FsError::PermissionDenied(format!(
                    "cannot remove directory {name}"
                )));
            }
            if !recursive && !dir.is_empty() {
                return Err(FsError::PermissionDenied(format!(
                    "directory {name} is not empty and recursive removal was not authorized"
                )));
            }
            parent.remove_subdirectory(name);
            return Ok(());
        }

        Err(FsError::NotFound(format!(
            "no file or directory named {name}"
        )))
    }

    fn chmod_inner(
        &mut self,
        path: &str,
        acting: &UserId,
        target: &UserId,
        rights: Rights,
    ) -> Result<(), FsError> {
        let now = self.tick();
        let dir = self.resolve_dir_mut(path)?;

        if !acting.is_root() && dir.metadata.owner != *acting {
            return Err(FsError::PermissionDenied(format!(
                "cannot change permissions on {}",
                dir.metadata.name
            )));
        }

        dir.metadata.grant(target.clone(), rights);
        dir.metadata.touch_modified(now);
        Ok(())
    }

    fn mv_inner(&mut self, old_path: &str, new_path: &str, user: &UserId) -> Result<(), FsError> {
        let now = self.tick();
        let (src_parent_segments, src_name) = PathResolver::split_parent(old_path)?;
        let (dst_parent_segments, dst_name) = PathResolver::split_parent(new_path)?;

        // validate everything before the first mutation
        let src_parent = self.root.descend(&src_parent_segments)?;
        let (src_kind, src_owner) = if let Some(file) = src_parent.file(src_name) {
            (NodeKind::File, file.metadata.owner.clone())
        } else if let Some(dir) = src_parent.subdirectory(src_name) {
            (NodeKind::Directory, dir.metadata.owner.clone())
        } else {
            return Err(FsError::NotFound(format!(
                "no file or directory named {src_name}"
            )));
        };
        if !user.is_root() && src_owner != *user {
            return Err(FsError::PermissionDenied(format!("cannot move {src_name}")));
        }

        let dst_parent = self.root.descend(&dst_parent_segments)?;
        if dst_parent.contains_entry(dst_name) {
            return Err(FsError::AlreadyExists(format!(
                "destination already exists: {dst_name}"
            )));
        }

        if src_kind == NodeKind::Directory {
            let mut src_segments = src_parent_segments.clone();
            src_segments.push(src_name);
            if dst_parent_segments.len() >= src_segments.len()
                && dst_parent_segments[..src_segments.len()] == src_segments[..]
            {
                return Err(FsError::InvalidPath(
                    "cannot move a directory into its own subtree".to_string(),
                ));
            }
        }

        // detach, rename, attach
        let src_parent = self.root.descend_mut(&src_parent_segments)?;
        match src_kind {
            NodeKind::File => {
                let mut file = src_parent
                    .remove_file(src_name)
                    .ok_or_else(|| FsError::NotFound(src_name.to_string()))?;
                file.metadata.name = dst_name.to_string();
                file.metadata.touch_modified(now);
                let dst_parent = self.root.descend_mut(&dst_parent_segments)?;
                dst_parent.add_file(file);
            }
            NodeKind::Directory => {
                let mut dir = src_parent
                    .remove_subdirectory(src_name)
                    .ok_or_else(|| FsError::NotFound(src_name.to_string()))?;
                dir.metadata.name = dst_name.to_string();
                dir.metadata.touch_modified(now);
                let dst_parent = self.root.descend_mut(&dst_parent_segments)?;
                dst_parent.add_subdirectory(dir);
            }
        }
        Ok(())
    }

    fn cp_inner(
        &mut self,
        src_path: &str,
        dst_path: &str,
        user: &UserId,
        recursive: bool,
    ) -> Result<(), FsError> {
        let now = self.tick();
        let (src_parent_segments, src_name) = PathResolver::split_parent(src_path)?;
        let (dst_parent_segments, dst_name) = PathResolver::split_parent(dst_path)?;

        let src_parent = self.root.descend(&src_parent_segments)?;
        let copy = if let Some(file) = src_parent.file(src_name) {
            require_read(file, user)?;
            CopiedNode::File(file.duplicate_as(dst_name, user.clone(), now))
        } else if let Some(dir) = src_parent.subdirectory(src_name) {
            require_subtree_readable(dir, user)?;
            if !recursive && !dir.is_empty() {
                return Err(FsError::PermissionDenied(format!(
                    "directory {src_name} is not empty and recursive copy was not authorized"
                )));
            }
            CopiedNode::Directory(dir.duplicate_as(dst_name, user.clone(), now))
        } else {
            return Err(FsError::NotFound(format!(
                "no file or directory named {src_name}"
            )));
        };

        let dst_parent = self.root.descend_mut(&dst_parent_segments)?;
        if dst_parent.contains_entry(dst_name) {
            return Err(FsError::AlreadyExists(format!(
                "destination already exists: {dst_name}"
            )));
        }
        match copy {
            CopiedNode::File(file) => dst_parent.add_file(file),
            CopiedNode::Directory(dir) => dst_parent.add_subdirectory(dir),
        };
        Ok(())
    }
}

impl Default for FileSystemEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystemOperations for FileSystemEngine {
    fn mkdir(&mut self, path: &str, name: &str) -> Result<NodeId, FsError> {
        let result = self.mkdir_inner(path, name);
        self.record(
            "fs.mkdir",
            &[("path", path), ("name", name)],
            result.as_ref().err(),
        );
        result
    }

    fn touch(&mut self, path: &str, user: &UserId) -> Result<NodeId, FsError> {
        let result = self.touch_inner(path, user);
        self.record(
            "fs.touch",
            &[("path", path), ("user", user.as_str())],
            result.as_ref().err(),
        );
        result
    }

    fn write(
        &mut self,
        path: &str,
        user: &UserId,
        append: bool,
        data: &[u8],
    ) -> Result<(), FsError> {
        let result = self.write_inner(path, user, append, data);
        let bytes = data.len().to_string();
        self.record(
            "fs.write",
            &[
                ("path", path),
                ("user", user.as_str()),
                ("append", if append { "true" } else { "false" }),
                ("bytes", bytes.as_str()),
            ],
            result.as_ref().err(),
        );
        result
    }

    fn read(&self, path: &str, user: &UserId, buf: &mut [u8]) -> Result<usize, FsError> {
        let file = self.resolve_file(path)?;
        require_read(file, user)?;
        Ok(file.read_into(buf))
    }

    fn rm(&mut self, path: &str, user: &UserId, recursive: bool) -> Result<(), FsError> {
        let result = self.rm_inner(path, user, recursive);
        self.record(
            "fs.rm",
            &[
                ("path", path),
                ("user", user.as_str()),
                ("recursive", if recursive { "true" } else { "false" }),
            ],
            result.as_ref().err(),
        );
        result
    }

    fn chmod(
        &mut self,
        path: &str,
        acting: &UserId,
        target: &UserId,
        rights: Rights,
    ) -> Result<(), FsError> {
        let result = self.chmod_inner(path, acting, target, rights);
        let rights_str = rights.to_string();
        self.record(
            "fs.chmod",
            &[
                ("path", path),
                ("acting", acting.as_str()),
                ("target", target.as_str()),
                ("rights", rights_str.as_str()),
            ],
            result.as_ref().err(),
        );
        result
    }

    fn mv(&mut self, old_path: &str, new_path: &str, user: &UserId) -> Result<(), FsError> {
        let result = self.mv_inner(old_path, new_path, user);
        self.record(
            "fs.mv",
            &[("from", old_path), ("to", new_path), ("user", user.as_str())],
            result.as_ref().err(),
        );
        result
    }

    fn ls(&self, path: &str, _user: &UserId, recursive: bool) -> Result<Vec<ListEntry>, FsError> {
        let dir = self.resolve_dir(path)?;
        let mut entries = Vec::new();
        collect_entries(dir, "", recursive, &mut entries);
        Ok(entries)
    }

    fn cp(
        &mut self,
        src_path: &str,
        dst_path: &str,
        user: &UserId,
        recursive: bool,
    ) -> Result<(), FsError> {
        let result = self.cp_inner(src_path, dst_path, user, recursive);
        self.record(
            "fs.cp",
            &[
                ("from", src_path),
                ("to", dst_path),
                ("user", user.as_str()),
                ("recursive", if recursive { "true" } else { "false" }),
            ],
            result.as_ref().err(),
        );
        result
    }

    fn stat(&self, path: &str, _user: &UserId) -> Result<StatEntry, FsError> {
        let segments = PathResolver::split_absolute(path)?;
        match segments.split_last() {
            None => Ok(stat_directory(&self.root)),
            Some((name, parent_segments)) => {
                let parent = self.root.descend(parent_segments)?;
                if let Some(file) = parent.file(name) {
                    Ok(stat_file(file))
                } else if let Some(dir) = parent.subdirectory(name) {
                    Ok(stat_directory(dir))
                } else {
                    Err(FsError::NotFound(format!(
                        "no file or directory named {name}"
                    )))
                }
            }
        }
    }
}

enum CopiedNode {
    File(FileNode),
    Directory(Directory),
}

fn require_read(file: &FileNode, user: &UserId) -> Result<(), FsError> {
    if !user.is_root() && !file.metadata.rights_for(user).read {
        return Err(FsError::PermissionDenied(format!(
            "cannot read {}",
            file.metadata.name
        )));
    }
    Ok(())
}

fn require_subtree_readable(dir: &Directory, user: &UserId) -> Result<(), FsError> {
    if user.is_root() {
        return Ok(());
    }
    for file in dir.files() {
        require_read(file, user)?;
    }
    for sub in dir.subdirectories() {
        require_subtree_readable(sub, user)?;
    }
    Ok(())
}

fn collect_entries(dir: &Directory, prefix: &str, recursive: bool, out: &mut Vec<ListEntry>) {
    for file in dir.files() {
        out.push(ListEntry {
            path: join_relative(prefix, &file.metadata.name),
            name: file.metadata.name.clone(),
            kind: NodeKind::File,
            id: file.metadata.id,
            owner: file.metadata.owner.clone(),
            size: file.metadata.size,
        });
    }
    for sub in dir.subdirectories() {
        let relative = join_relative(prefix, &sub.metadata.name);
        out.push(ListEntry {
            path: relative.clone(),
            name: sub.metadata.name.clone(),
            kind: NodeKind::Directory,
            id: sub.metadata.id,
            owner: sub.metadata.owner.clone(),
            size: sub.metadata.size,
        });
        if recursive {
            collect_entries(sub, &relative, recursive, out);
        }
    }
}

fn join_relative(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

fn stat_file(file: &FileNode) -> StatEntry {
    StatEntry {
        id: file.metadata.id,
        name: file.metadata.name.clone(),
        kind: NodeKind::File,
        owner: file.metadata.owner.clone(),
        size: file.metadata.size,
        created_at: file.metadata.created_at,
        modified_at: file.metadata.modified_at,
        permissions: file.metadata.permissions().clone(),
        entry_count: None,
    }
}

fn stat_directory(dir: &Directory) -> StatEntry {
    StatEntry {
        id: dir.metadata.id,
        name: dir.metadata.name.clone(),
        kind: NodeKind::Directory,
        owner: dir.metadata.owner.clone(),
        size: dir.metadata.size,
        created_at: dir.metadata.created_at,
        modified_at: dir.metadata.modified_at,
        permissions: dir.metadata.permissions().clone(),
        entry_count: Some(dir.entry_count()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_user() -> UserId {
        UserId::root()
    }

    fn alice() -> UserId {
        UserId::new("alice")
    }

    fn bob() -> UserId {
        UserId::new("bob")
    }

    #[test]
    fn test_mkdir_assigns_parent_owner() {
        let mut engine = FileSystemEngine::new();
        engine.mkdir("/", "docs").unwrap();

        let stat = engine.stat("/docs", &root_user()).unwrap();
        assert_eq!(stat.kind, NodeKind::Directory);
        assert_eq!(stat.owner, root_user());
    }

    #[test]
    fn test_mkdir_duplicate_fails() {
        let mut engine = FileSystemEngine::new();
        engine.mkdir("/", "docs").unwrap();

        let result = engine.mkdir("/", "docs");
        assert!(matches!(result, Err(FsError::AlreadyExists(_))));
    }

    #[test]
    fn test_mkdir_missing_parent_is_permission_denied() {
        let mut engine = FileSystemEngine::new();
        let result = engine.mkdir("/nowhere", "docs");
        assert_eq!(
            result,
            Err(FsError::PermissionDenied(
                "parent directory not found".to_string()
            ))
        );
    }

    #[test]
    fn test_mkdir_rejects_invalid_name() {
        let mut engine = FileSystemEngine::new();
        assert!(matches!(
            engine.mkdir("/", "bad/name"),
            Err(FsError::InvalidPath(_))
        ));
        assert!(matches!(engine.mkdir("/", ""), Err(FsError::InvalidPath(_))));
    }

    #[test]
    fn test_mkdir_checks_owner_rights_on_user_owned_parent() {
        let mut engine = FileSystemEngine::new();
        engine.mkdir("/", "a").unwrap();
        // an empty directory may be copied without `recursive`; the copy
        // belongs to the copying user
        engine.cp("/a", "/b", &alice(), false).unwrap();
        assert_eq!(engine.stat("/b", &alice()).unwrap().owner, alice());

        // alice owns /b but holds no write grant on it
        let result = engine.mkdir("/b", "sub");
        assert!(matches!(result, Err(FsError::PermissionDenied(_))));

        engine
            .chmod("/b", &root_user(), &alice(), Rights::parse("w"))
            .unwrap();
        engine.mkdir("/b", "sub").unwrap();
        assert_eq!(engine.stat("/b/sub", &alice()).unwrap().owner, alice());
    }

    #[test]
    fn test_touch_assigns_acting_user() {
        let mut engine = FileSystemEngine::new();
        engine
            .chmod("/", &root_user(), &alice(), Rights::parse("w"))
            .unwrap();

        engine.touch("/notes.txt", &alice()).unwrap();
        let stat = engine.stat("/notes.txt", &alice()).unwrap();
        assert_eq!(stat.kind, NodeKind::File);
        assert_eq!(stat.owner, alice());
        assert_eq!(stat.size, 0);
    }

    #[test]
    fn test_touch_requires_parent_write_grant() {
        let mut engine = FileSystemEngine::new();
        let result = engine.touch("/notes.txt", &alice());
        assert!(matches!(result, Err(FsError::PermissionDenied(_))));

        // root needs no grant
        engine.touch("/notes.txt", &root_user()).unwrap();
    }

    #[test]
    fn test_touch_duplicate_fails() {
        let mut engine = FileSystemEngine::new();
        engine.touch("/notes.txt", &root_user()).unwrap();
        assert!(matches!(
            engine.touch("/notes.txt", &root_user()),
            Err(FsError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_touch_missing_parent_is_permission_denied() {
        let mut engine = FileSystemEngine::new();
        let result = engine.touch("/nowhere/notes.txt", &root_user());
        assert_eq!(
            result,
            Err(FsError::PermissionDenied(
                "parent directory not found".to_string()
            ))
        );
    }

    #[test]
    fn test_file_and_directory_may_share_a_name() {
        let mut engine = FileSystemEngine::new();
        engine.mkdir("/", "x").unwrap();
        engine.touch("/x", &root_user()).unwrap();

        let entries = engine.ls("/", &root_user(), false).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_write_missing_parent_stays_not_found() {
        let mut engine = FileSystemEngine::new();
        let result = engine.write("/nowhere/f", &root_user(), false, b"data");
        assert!(matches!(result, Err(FsError::NotFound(_))));
    }

    #[test]
    fn test_write_missing_file_not_found() {
        let mut engine = FileSystemEngine::new();
        let result = engine.write("/f", &root_user(), false, b"data");
        assert!(matches!(result, Err(FsError::NotFound(_))));
    }

    #[test]
    fn test_write_checks_file_rights_not_parent() {
        let mut engine = FileSystemEngine::new();
        engine
            .chmod("/", &root_user(), &alice(), Rights::parse("rw"))
            .unwrap();
        engine.touch("/f", &alice()).unwrap();

        // alice owns /f but has no grant on the file itself
        let result = engine.write("/f", &alice(), false, b"data");
        assert!(matches!(result, Err(FsError::PermissionDenied(_))));

        // root bypasses
        engine.write("/f", &root_user(), false, b"data").unwrap();
    }

    #[test]
    fn test_write_truncates_unless_append() {
        let mut engine = FileSystemEngine::new();
        engine.touch("/f", &root_user()).unwrap();

        engine.write("/f", &root_user(), false, b"first").unwrap();
        engine.write("/f", &root_user(), true, b" second").unwrap();
        assert_eq!(
            engine.read_to_vec("/f", &root_user()).unwrap(),
            b"first second"
        );

        engine.write("/f", &root_user(), false, b"reset").unwrap();
        assert_eq!(engine.read_to_vec("/f", &root_user()).unwrap(), b"reset");
        assert_eq!(engine.stat("/f", &root_user()).unwrap().size, 5);
    }

    #[test]
    fn test_read_into_short_buffer_truncates() {
        let mut engine = FileSystemEngine::new();
        engine.touch("/f", &root_user()).unwrap();
        engine
            .write("/f", &root_user(), false, b"hello world")
            .unwrap();

        let mut buf = [0u8; 5];
        let copied = engine.read("/f", &root_user(), &mut buf).unwrap();
        assert_eq!(copied, 5);
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn test_read_requires_grant() {
        let mut engine = FileSystemEngine::new();
        engine.touch("/f", &root_user()).unwrap();

        let mut buf = [0u8; 8];
        let result = engine.read("/f", &alice(), &mut buf);
        assert!(matches!(result, Err(FsError::PermissionDenied(_))));
    }

    #[test]
    fn test_rm_is_ownership_gated() {
        let mut engine = FileSystemEngine::new();
        engine
            .chmod("/", &root_user(), &alice(), Rights::parse("w"))
            .unwrap();
        engine.touch("/f", &alice()).unwrap();

        // bob holds every grant you like; he still does not own /f
        let result = engine.rm("/f", &bob(), false);
        assert!(matches!(result, Err(FsError::PermissionDenied(_))));

        engine.rm("/f", &alice(), false).unwrap();
        assert!(matches!(
            engine.stat("/f", &alice()),
            Err(FsError::NotFound(_))
        ));
    }

    #[test]
    fn test_rm_non_empty_directory_needs_recursive() {
        let mut engine = FileSystemEngine::new();
        engine.mkdir("/", "docs").unwrap();
        engine.touch("/docs/f", &root_user()).unwrap();

        let result = engine.rm("/docs", &root_user(), false);
        assert!(matches!(result, Err(FsError::PermissionDenied(_))));

        engine.rm("/docs", &root_user(), true).unwrap();
        assert!(matches!(
            engine.ls("/docs", &root_user(), false),
            Err(FsError::NotFound(_))
        ));
    }

    #[test]
    fn test_rm_prefers_file_over_directory_on_name_collision() {
        let mut engine = FileSystemEngine::new();
        engine.mkdir("/", "x").unwrap();
        engine.touch("/x", &root_user()).unwrap();

        engine.rm("/x", &root_user(), false).unwrap();

        let entries = engine.ls("/", &root_user(), false).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, NodeKind::Directory);
    }

    #[test]
    fn test_rm_missing_not_found() {
        let mut engine = FileSystemEngine::new();
        assert!(matches!(
            engine.rm("/ghost", &root_user(), false),
            Err(FsError::NotFound(_))
        ));
    }

    #[test]
    fn test_rm_root_is_invalid_path() {
        let mut engine = FileSystemEngine::new();
        assert!(matches!(
            engine.rm("/", &root_user(), true),
            Err(FsError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_chmod_owner_or_root_only() {
        let mut engine = FileSystemEngine::new();
        engine.mkdir("/", "docs").unwrap();

        let result = engine.chmod("/docs", &alice(), &alice(), Rights::parse("rw"));
        assert!(matches!(result, Err(FsError::PermissionDenied(_))));

        engine
            .chmod("/docs", &root_user(), &alice(), Rights::parse("rw"))
            .unwrap();
        let stat = engine.stat("/docs", &root_user()).unwrap();
        assert_eq!(stat.permissions.get(&alice()), Some(&Rights::READ_WRITE));
    }

    #[test]
    fn test_chmod_on_file_path_is_not_found() {
        let mut engine = FileSystemEngine::new();
        engine.touch("/f", &root_user()).unwrap();

        // chmod resolves directories only; a file leaf never matches
        let result = engine.chmod("/f", &root_user(), &alice(), Rights::parse("r"));
        assert!(matches!(result, Err(FsError::NotFound(_))));
    }

    #[test]
    fn test_mv_renames_and_reparents_file() {
        let mut engine = FileSystemEngine::new();
        engine.mkdir("/", "a").unwrap();
        engine.mkdir("/", "b").unwrap();
        engine.touch("/a/f", &root_user()).unwrap();
        engine.write("/a/f", &root_user(), false, b"payload").unwrap();
        let id = engine.stat("/a/f", &root_user()).unwrap().id;

        engine.mv("/a/f", "/b/g", &root_user()).unwrap();

        assert!(matches!(
            engine.stat("/a/f", &root_user()),
            Err(FsError::NotFound(_))
        ));
        let stat = engine.stat("/b/g", &root_user()).unwrap();
        assert_eq!(stat.id, id); // same node, no copy
        assert_eq!(
            engine.read_to_vec("/b/g", &root_user()).unwrap(),
            b"payload"
        );
    }

    #[test]
    fn test_mv_into_own_subtree_is_invalid_path() {
        let mut engine = FileSystemEngine::new();
        engine.mkdir("/", "a").unwrap();
        engine.mkdir("/a", "b").unwrap();

        let result = engine.mv("/a", "/a/b/a", &root_user());
        assert!(matches!(result, Err(FsError::InvalidPath(_))));

        // and onto itself
        let result = engine.mv("/a", "/a/a", &root_user());
        assert!(matches!(result, Err(FsError::InvalidPath(_))));

        // tree unchanged
        assert!(engine.stat("/a/b", &root_user()).is_ok());
        assert_eq!(engine.ls("/", &root_user(), false).unwrap().len(), 1);
    }

    #[test]
    fn test_mv_occupied_destination_fails() {
        let mut engine = FileSystemEngine::new();
        engine.touch("/f", &root_user()).unwrap();
        engine.mkdir("/", "g").unwrap();

        // destination taken by a directory counts too
        let result = engine.mv("/f", "/g", &root_user());
        assert!(matches!(result, Err(FsError::AlreadyExists(_))));
    }

    #[test]
    fn test_mv_requires_ownership() {
        let mut engine = FileSystemEngine::new();
        engine.touch("/f", &root_user()).unwrap();
        engine.mkdir("/", "dst").unwrap();

        let result = engine.mv("/f", "/dst/f", &alice());
        assert!(matches!(result, Err(FsError::PermissionDenied(_))));
    }

    #[test]
    fn test_mv_missing_source_or_destination_parent() {
        let mut engine = FileSystemEngine::new();
        engine.touch("/f", &root_user()).unwrap();

        assert!(matches!(
            engine.mv("/ghost", "/f2", &root_user()),
            Err(FsError::NotFound(_))
        ));
        assert!(matches!(
            engine.mv("/f", "/nowhere/f", &root_user()),
            Err(FsError::NotFound(_))
        ));
    }

    #[test]
    fn test_ls_lists_files_then_directories_in_insertion_order() {
        let mut engine = FileSystemEngine::new();
        engine.mkdir("/", "zdir").unwrap();
        engine.touch("/bfile", &root_user()).unwrap();
        engine.touch("/afile", &root_user()).unwrap();

        let names: Vec<String> = engine
            .ls("/", &root_user(), false)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["bfile", "afile", "zdir"]);
    }

    #[test]
    fn test_ls_recursive_relative_paths() {
        let mut engine = FileSystemEngine::new();
        engine.mkdir("/", "a").unwrap();
        engine.mkdir("/a", "b").unwrap();
        engine.touch("/a/b/f", &root_user()).unwrap();

        let paths: Vec<String> = engine
            .ls("/a", &root_user(), true)
            .unwrap()
            .into_iter()
            .map(|e| e.path)
            .collect();
        assert_eq!(paths, vec!["b", "b/f"]);
    }

    #[test]
    fn test_ls_relative_path_is_invalid() {
        let engine = FileSystemEngine::new();
        assert!(matches!(
            engine.ls("docs", &root_user(), false),
            Err(FsError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_cp_file_copies_are_independent() {
        let mut engine = FileSystemEngine::new();
        engine.touch("/f", &root_user()).unwrap();
        engine.write("/f", &root_user(), false, b"original").unwrap();

        engine.cp("/f", "/g", &root_user(), false).unwrap();
        engine.write("/g", &root_user(), false, b"changed").unwrap();

        assert_eq!(engine.read_to_vec("/f", &root_user()).unwrap(), b"original");
        assert_eq!(engine.read_to_vec("/g", &root_user()).unwrap(), b"changed");
        assert_ne!(
            engine.stat("/f", &root_user()).unwrap().id,
            engine.stat("/g", &root_user()).unwrap().id
        );
    }

    #[test]
    fn test_cp_requires_read_grant_on_source() {
        let mut engine = FileSystemEngine::new();
        engine.touch("/f", &root_user()).unwrap();
        engine
            .chmod("/", &root_user(), &alice(), Rights::parse("w"))
            .unwrap();

        let result = engine.cp("/f", "/g", &alice(), false);
        assert!(matches!(result, Err(FsError::PermissionDenied(_))));
    }

    #[test]
    fn test_cp_directory_needs_recursive_when_non_empty() {
        let mut engine = FileSystemEngine::new();
        engine.mkdir("/", "src").unwrap();
        engine.touch("/src/f", &root_user()).unwrap();

        let result = engine.cp("/src", "/dst", &root_user(), false);
        assert!(matches!(result, Err(FsError::PermissionDenied(_))));

        engine.cp("/src", "/dst", &root_user(), true).unwrap();
        assert!(engine.stat("/dst/f", &root_user()).is_ok());
    }

    #[test]
    fn test_cp_read_gate_covers_whole_subtree() {
        let mut engine = FileSystemEngine::new();
        engine.mkdir("/", "src").unwrap();
        engine.touch("/src/f", &root_user()).unwrap();
        engine
            .write("/src/f", &root_user(), false, b"data")
            .unwrap();
        engine
            .chmod("/", &root_user(), &alice(), Rights::parse("w"))
            .unwrap();

        // alice holds no read grant on /src/f
        let result = engine.cp("/src", "/mine", &alice(), true);
        assert!(matches!(result, Err(FsError::PermissionDenied(_))));

        // root bypasses the gate; every copied node belongs to the caller
        engine.cp("/src", "/mine", &root_user(), true).unwrap();
        assert_eq!(
            engine.stat("/mine", &root_user()).unwrap().owner,
            root_user()
        );
        assert_eq!(
            engine.stat("/mine/f", &root_user()).unwrap().owner,
            root_user()
        );
        assert_eq!(
            engine.read_to_vec("/mine/f", &root_user()).unwrap(),
            b"data"
        );
    }

    #[test]
    fn test_cp_occupied_destination_fails() {
        let mut engine = FileSystemEngine::new();
        engine.touch("/f", &root_user()).unwrap();
        engine.touch("/g", &root_user()).unwrap();

        let result = engine.cp("/f", "/g", &root_user(), false);
        assert!(matches!(result, Err(FsError::AlreadyExists(_))));
    }

    #[test]
    fn test_stat_root() {
        let engine = FileSystemEngine::new();
        let stat = engine.stat("/", &root_user()).unwrap();
        assert_eq!(stat.name, "/");
        assert_eq!(stat.kind, NodeKind::Directory);
        assert_eq!(stat.owner, root_user());
        assert_eq!(stat.entry_count, Some(0));
    }

    #[test]
    fn test_add_user_is_advisory() {
        let mut engine = FileSystemEngine::new();
        assert!(engine.add_user(alice()));
        assert!(!engine.add_user(alice()));
        assert!(engine.users().contains(&alice()));

        // an unregistered user can still act when granted
        engine
            .chmod("/", &root_user(), &bob(), Rights::parse("w"))
            .unwrap();
        engine.touch("/f", &bob()).unwrap();
    }

    #[test]
    fn test_audit_records_successes_and_failures() {
        let mut engine = FileSystemEngine::new();
        engine.mkdir("/", "docs").unwrap();
        let _ = engine.mkdir("/", "docs");

        let entries: Vec<&LogEntry> = engine.audit().entries().collect();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].level, LogLevel::Info);
        assert_eq!(entries[0].action, "fs.mkdir");
        assert_eq!(entries[0].field("name"), Some("docs"));

        assert_eq!(entries[1].level, LogLevel::Warn);
        assert!(entries[1].field("error").unwrap().contains("Already exists"));
    }
}
