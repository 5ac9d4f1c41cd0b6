//! Read-only virtual file system.
//!
//! The tree is built once per session from a [`VfsBuilder`] and never changes
//! afterwards. Lookups are exact string matches on absolute paths: there is
//! no `.`/`..` handling, and relative paths are joined literally.

mod static_vfs;
mod stock;

pub use static_vfs::{EntryKind, StaticVfs, VfsBuilder, resolve};
pub use stock::stock_tree;
