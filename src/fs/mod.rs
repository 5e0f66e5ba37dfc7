//! Filesystem-facing building blocks: the adapter, name search, and the note tree.
//!
//! Only the backend calls the adapter and the build walk; the display side
//! works on `TreeNode` values it received over the bridge.

pub mod adapter;
pub mod search;
pub mod tree;
