//! Static path-keyed file tree.
//!
//! The whole tree lives in a `BTreeMap<String, Node>` keyed by absolute path.
//! Directories carry their child names in declaration order; that order is
//! what `list` returns.

use std::collections::BTreeMap;

use hackme_types::error::{HackError, Result};

/// Kind of a node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone)]
enum Node {
    Dir(Vec<String>),
    File(String),
}

impl Node {
    fn kind(&self) -> EntryKind {
        match self {
            Node::Dir(_) => EntryKind::Directory,
            Node::File(_) => EntryKind::File,
        }
    }
}

/// Join `input` onto `current_dir` unless it is already absolute.
///
/// No normalization happens: `resolve("/a", "../b")` is `"/a/../b"`. A
/// trailing separator on `current_dir` (the root) is not doubled.
pub fn resolve(current_dir: &str, input: &str) -> String {
    if input.starts_with('/') {
        input.to_string()
    } else if current_dir.ends_with('/') {
        format!("{current_dir}{input}")
    } else {
        format!("{current_dir}/{input}")
    }
}

/// Return the parent of an absolute path, or `None` for the root.
fn parent(path: &str) -> Option<&str> {
    if path == "/" {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some("/"),
        Some(i) => Some(&path[..i]),
        None => None,
    }
}

/// An immutable virtual file system.
#[derive(Debug, Clone)]
pub struct StaticVfs {
    nodes: BTreeMap<String, Node>,
}

impl StaticVfs {
    /// Start building a tree. The root directory always exists.
    pub fn builder() -> VfsBuilder {
        VfsBuilder::new()
    }

    /// See [`resolve`].
    pub fn resolve(&self, current_dir: &str, input: &str) -> String {
        resolve(current_dir, input)
    }

    /// Child names of a directory, in declaration order.
    pub fn list(&self, path: &str) -> Result<&[String]> {
        match self.nodes.get(path) {
            Some(Node::Dir(children)) => Ok(children),
            Some(Node::File(_)) => Err(HackError::NotADirectory(path.to_string())),
            None => Err(HackError::NotFound(path.to_string())),
        }
    }

    /// Content of a file.
    pub fn read(&self, path: &str) -> Result<&str> {
        match self.nodes.get(path) {
            Some(Node::File(content)) => Ok(content),
            Some(Node::Dir(_)) => Err(HackError::NotAFile(path.to_string())),
            None => Err(HackError::NotFound(path.to_string())),
        }
    }

    /// Whether an absolute path names any entry.
    pub fn exists(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    /// Whether an absolute path names a directory.
    pub fn is_dir(&self, path: &str) -> bool {
        matches!(self.nodes.get(path), Some(Node::Dir(_)))
    }

    /// Kind of the node at `path`.
    pub fn stat(&self, path: &str) -> Result<EntryKind> {
        self.nodes
            .get(path)
            .map(Node::kind)
            .ok_or_else(|| HackError::NotFound(path.to_string()))
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Collects nodes and checks the tree invariant on [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct VfsBuilder {
    nodes: BTreeMap<String, Node>,
}

impl VfsBuilder {
    fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Dir(Vec::new()));
        Self { nodes }
    }

    /// Declare a directory and its children in listing order.
    ///
    /// Redeclaring a path replaces the earlier node.
    pub fn dir(mut self, path: &str, children: &[&str]) -> Self {
        let children = children.iter().map(|c| c.to_string()).collect();
        self.nodes.insert(path.to_string(), Node::Dir(children));
        self
    }

    /// Declare a file with its content.
    pub fn file(mut self, path: &str, content: &str) -> Self {
        self.nodes
            .insert(path.to_string(), Node::File(content.to_string()));
        self
    }

    /// Validate and freeze the tree.
    ///
    /// Every path must be absolute, and every non-root path's parent must
    /// exist and be a directory.
    pub fn build(self) -> Result<StaticVfs> {
        if !matches!(self.nodes.get("/"), Some(Node::Dir(_))) {
            return Err(HackError::NotADirectory("/".to_string()));
        }
        for path in self.nodes.keys() {
            if !path.starts_with('/') {
                return Err(HackError::NotFound(path.clone()));
            }
            let Some(par) = parent(path) else {
                continue;
            };
            match self.nodes.get(par) {
                Some(Node::Dir(_)) => {},
                Some(Node::File(_)) => return Err(HackError::NotADirectory(par.to_string())),
                None => return Err(HackError::NotFound(par.to_string())),
            }
        }
        log::debug!("virtual file system built with {} nodes", self.nodes.len());
        Ok(StaticVfs { nodes: self.nodes })
    }
}
