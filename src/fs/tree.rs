use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::adapter::{list_directory, DirEntry, FsResult};
use crate::error::{FsError, FsErrorKind};

/// Type of tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Folder,
    Document,
}

/// A node in the note tree. The path is the node's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub path: PathBuf,
    pub kind: NodeKind,
    pub display_name: String,
    /// `Some` for folders, `None` for documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
    /// UI-only expansion state; never crosses the bridge.
    #[serde(skip)]
    pub expanded: bool,
}

/// What the build walk keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeOptions {
    /// Note extension without the leading dot.
    pub extension: String,
    pub show_hidden: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            extension: "md".to_string(),
            show_hidden: false,
        }
    }
}

/// Whether `name` carries the note extension.
pub fn is_note_name(name: &str, extension: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy() == extension)
        .unwrap_or(false)
}

fn display_name_for(path: &Path, kind: NodeKind) -> String {
    let name = match kind {
        NodeKind::Folder => path.file_name(),
        NodeKind::Document => path.file_stem(),
    };
    name.map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Walk `root` and build the full tree.
///
/// Folders are always included; files are kept only if they carry the note
/// extension. A subfolder that cannot be listed is kept with no children.
pub fn build(root: &Path, options: &TreeOptions) -> FsResult<TreeNode> {
    let entries = list_directory(root)?;
    let mut node = TreeNode::folder(root.to_path_buf());
    node.children = Some(build_children(root, entries, options));
    node.expanded = true;
    Ok(node)
}

fn build_children(
    dir: &Path,
    entries: Vec<DirEntry>,
    options: &TreeOptions,
) -> Vec<TreeNode> {
    let mut children = Vec::new();
    for entry in entries {
        if !options.show_hidden && entry.name.starts_with('.') {
            continue;
        }
        let path = dir.join(&entry.name);
        if entry.is_directory {
            let mut folder = TreeNode::folder(path);
            let nested = match list_directory(&folder.path) {
                Ok(nested) => build_children(&folder.path, nested, options),
                Err(err) => {
                    tracing::warn!(path = %folder.path.display(), error = %err, "unreadable folder");
                    Vec::new()
                }
            };
            folder.children = Some(nested);
            children.push(folder);
        } else if is_note_name(&entry.name, &options.extension) {
            children.push(TreeNode::document(path));
        }
    }
    children
}

impl TreeNode {
    pub fn folder(path: PathBuf) -> Self {
        Self {
            display_name: display_name_for(&path, NodeKind::Folder),
            path,
            kind: NodeKind::Folder,
            children: Some(Vec::new()),
            expanded: false,
        }
    }

    pub fn document(path: PathBuf) -> Self {
        Self {
            display_name: display_name_for(&path, NodeKind::Document),
            path,
            kind: NodeKind::Document,
            children: None,
            expanded: false,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// Exact path lookup within this subtree.
    pub fn find_node(&self, target: &Path) -> Option<&TreeNode> {
        if self.path == target {
            return Some(self);
        }
        // Only descend into the branch that can contain the target.
        if !target.starts_with(&self.path) {
            return None;
        }
        self.children
            .as_ref()?
            .iter()
            .find_map(|child| child.find_node(target))
    }

    /// Find a mutable reference to a node by path.
    pub fn find_node_mut(&mut self, target: &Path) -> Option<&mut TreeNode> {
        if self.path == target {
            return Some(self);
        }
        if !target.starts_with(&self.path) {
            return None;
        }
        self.children
            .as_mut()?
            .iter_mut()
            .find_map(|child| child.find_node_mut(target))
    }

    /// Reflect a file created on disk as a new document under `parent`.
    /// Only names carrying `extension` are notes.
    pub fn insert_document(
        &mut self,
        parent: &Path,
        name: &str,
        extension: &str,
    ) -> FsResult<TreeNode> {
        if !is_note_name(name, extension) {
            return Err(FsError::invalid_path(format!(
                "{} does not end in .{}",
                name, extension
            )));
        }
        self.attach(parent, TreeNode::document(parent.join(name)))
    }

    /// Reflect a directory created on disk as a new, empty folder under `parent`.
    pub fn insert_folder(&mut self, parent: &Path, name: &str) -> FsResult<TreeNode> {
        self.attach(parent, TreeNode::folder(parent.join(name)))
    }

    fn attach(&mut self, parent: &Path, node: TreeNode) -> FsResult<TreeNode> {
        if self.find_node(&node.path).is_some() {
            return Err(FsError::already_exists(&node.path));
        }
        let parent_node = self
            .find_node_mut(parent)
            .ok_or_else(|| FsError::not_found(parent))?;
        let children = parent_node.children.as_mut().ok_or_else(|| {
            FsError::invalid_path(format!("{} is not a folder", parent.display()))
        })?;
        children.push(node.clone());
        Ok(node)
    }

    /// Detach the node at `target` (and its subtree) from its parent.
    ///
    /// Returns the removed node, or `None` if nothing matched. The node this
    /// is called on is never removed.
    pub fn remove_node(&mut self, target: &Path) -> Option<TreeNode> {
        let parent = target.parent()?;
        let children = self.find_node_mut(parent)?.children.as_mut()?;
        let index = children.iter().position(|c| c.path == target)?;
        Some(children.remove(index))
    }

    /// Move the node at `old` to `new`, rewriting every descendant path.
    ///
    /// `new`'s parent must be a known folder and `new` must be free. On error
    /// the tree is left untouched.
    pub fn rename_path(&mut self, old: &Path, new: &Path) -> FsResult<()> {
        if old == new {
            return Ok(());
        }
        if old == self.path {
            return Err(FsError::invalid_path("the root cannot be renamed"));
        }
        if new.starts_with(old) {
            return Err(FsError::invalid_path(format!(
                "{} cannot move inside itself",
                old.display()
            )));
        }
        if self.find_node(old).is_none() {
            return Err(FsError::not_found(old));
        }
        if self.find_node(new).is_some() {
            return Err(FsError::already_exists(new));
        }
        let new_parent = new
            .parent()
            .ok_or_else(|| FsError::invalid_path(format!("{} has no parent", new.display())))?;
        match self.find_node(new_parent) {
            Some(node) if node.is_folder() => {}
            Some(_) => {
                return Err(FsError::new(
                    FsErrorKind::InvalidPath,
                    format!("{} is not a folder", new_parent.display()),
                ))
            }
            None => return Err(FsError::not_found(new_parent)),
        }

        let Some(mut node) = self.remove_node(old) else {
            return Err(FsError::not_found(old));
        };
        node.rebase(old, new);
        node.display_name = display_name_for(&node.path, node.kind);
        if let Some(children) = self.find_node_mut(new_parent).and_then(|p| p.children.as_mut()) {
            children.push(node);
        }
        Ok(())
    }

    /// Replace the `old` prefix with `new` on this node and all descendants.
    fn rebase(&mut self, old: &Path, new: &Path) {
        if let Ok(rest) = self.path.strip_prefix(old) {
            self.path = if rest.as_os_str().is_empty() {
                new.to_path_buf()
            } else {
                new.join(rest)
            };
        }
        if let Some(children) = &mut self.children {
            for child in children.iter_mut() {
                child.rebase(old, new);
            }
        }
    }

    /// Sort immediate children: folders first (optionally), then by name.
    fn sort_children(&mut self, dirs_first: bool) {
        if let Some(children) = &mut self.children {
            children.sort_by(|a, b| {
                let mut cmp = std::cmp::Ordering::Equal;
                if dirs_first {
                    cmp = b.is_folder().cmp(&a.is_folder());
                }
                cmp.then_with(|| {
                    a.display_name
                        .to_lowercase()
                        .cmp(&b.display_name.to_lowercase())
                })
            });
        }
    }

    fn sort_recursive(&mut self, dirs_first: bool) {
        self.sort_children(dirs_first);
        if let Some(children) = &mut self.children {
            for child in children.iter_mut() {
                child.sort_recursive(dirs_first);
            }
        }
    }

    /// Iterate over this node and all descendants, depth first.
    pub fn walk(&self) -> Box<dyn Iterator<Item = &TreeNode> + '_> {
        let children = self.children.iter().flatten().flat_map(|c| c.walk());
        Box::new(std::iter::once(self).chain(children))
    }
}

/// A flattened representation of a tree node for rendering.
#[derive(Debug, Clone)]
pub struct FlatItem {
    pub name: String,
    pub path: PathBuf,
    pub kind: NodeKind,
    pub depth: usize,
    pub is_expanded: bool,
    pub is_last_sibling: bool,
}

/// State for the tree view: the owned tree plus what is visible and selected.
pub struct TreeState {
    pub root: TreeNode,
    pub flat_items: Vec<FlatItem>,
    pub selected_index: usize,
    pub scroll_offset: usize,
    /// Whether folders are shown before documents.
    pub dirs_first: bool,
    /// Note extension; documents with any other extension are refused.
    pub extension: String,
}

impl TreeState {
    /// Take ownership of a freshly built tree. The root starts expanded.
    pub fn new(mut root: TreeNode, extension: &str, dirs_first: bool) -> Self {
        root.expanded = true;
        root.sort_recursive(dirs_first);
        let mut state = Self {
            root,
            flat_items: Vec::new(),
            selected_index: 0,
            scroll_offset: 0,
            dirs_first,
            extension: extension.to_string(),
        };
        state.flatten();
        state
    }

    /// Rebuild the flat items list from the tree.
    pub fn flatten(&mut self) {
        self.flat_items.clear();
        Self::flatten_node(&self.root, &mut self.flat_items, 0, true);
        // Clamp selected index
        if !self.flat_items.is_empty() && self.selected_index >= self.flat_items.len() {
            self.selected_index = self.flat_items.len() - 1;
        }
    }

    fn flatten_node(node: &TreeNode, items: &mut Vec<FlatItem>, depth: usize, is_last: bool) {
        items.push(FlatItem {
            name: node.display_name.clone(),
            path: node.path.clone(),
            kind: node.kind,
            depth,
            is_expanded: node.expanded,
            is_last_sibling: is_last,
        });

        if node.expanded {
            if let Some(children) = &node.children {
                for (i, child) in children.iter().enumerate() {
                    let is_last_child = i == children.len() - 1;
                    Self::flatten_node(child, items, depth + 1, is_last_child);
                }
            }
        }
    }

    pub fn selected_item(&self) -> Option<&FlatItem> {
        self.flat_items.get(self.selected_index)
    }

    /// The folder a new entry should go into: the selected folder, or the
    /// parent of the selected document.
    pub fn selected_folder(&self) -> PathBuf {
        match self.selected_item() {
            Some(item) if item.kind == NodeKind::Folder => item.path.clone(),
            Some(item) => item
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.root.path.clone()),
            None => self.root.path.clone(),
        }
    }

    pub fn select_next(&mut self) {
        let len = self.flat_items.len();
        if len > 0 && self.selected_index < len - 1 {
            self.selected_index += 1;
        }
    }

    pub fn select_previous(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        let len = self.flat_items.len();
        if len > 0 {
            self.selected_index = len - 1;
        }
    }

    /// Toggle the selected folder between collapsed and expanded.
    pub fn toggle_selected(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        if item.kind != NodeKind::Folder {
            return;
        }
        let path = item.path.clone();
        if let Some(node) = self.root.find_node_mut(&path) {
            node.expanded = !node.expanded;
            self.flatten();
        }
    }

    /// Collapse the selected folder, or jump to the parent.
    pub fn collapse_selected(&mut self) {
        let Some(selected) = self.selected_item() else {
            return;
        };
        let path = selected.path.clone();

        if selected.kind == NodeKind::Folder && selected.is_expanded {
            if let Some(node) = self.root.find_node_mut(&path) {
                node.expanded = false;
                self.flatten();
            }
            return;
        }

        if let Some(parent_path) = path.parent() {
            if let Some(i) = self.find_index_by_path(parent_path) {
                self.selected_index = i;
            }
        }
    }

    /// Expand every ancestor of `path` and move the selection onto it.
    pub fn select_path(&mut self, path: &Path) -> bool {
        if self.root.find_node(path).is_none() {
            return false;
        }
        for ancestor in path.ancestors().skip(1) {
            if let Some(node) = self.root.find_node_mut(ancestor) {
                node.expanded = true;
            }
        }
        self.flatten();
        match self.find_index_by_path(path) {
            Some(i) => {
                self.selected_index = i;
                true
            }
            None => false,
        }
    }

    /// Find the flat_items index of a node by its path.
    pub fn find_index_by_path(&self, path: &Path) -> Option<usize> {
        self.flat_items.iter().position(|item| item.path == path)
    }

    /// Update the scroll offset to ensure the selected item is visible.
    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected_index - visible_height + 1;
        }
    }

    /// Insert a document created on disk, expanding its parent.
    pub fn insert_document(&mut self, parent: &Path, name: &str) -> FsResult<TreeNode> {
        let node = self.root.insert_document(parent, name, &self.extension)?;
        self.after_insert(parent);
        Ok(node)
    }

    /// Insert a folder created on disk, expanding its parent.
    pub fn insert_folder(&mut self, parent: &Path, name: &str) -> FsResult<TreeNode> {
        let node = self.root.insert_folder(parent, name)?;
        self.after_insert(parent);
        Ok(node)
    }

    fn after_insert(&mut self, parent: &Path) {
        let dirs_first = self.dirs_first;
        if let Some(parent_node) = self.root.find_node_mut(parent) {
            parent_node.sort_children(dirs_first);
            parent_node.expanded = true;
        }
        self.flatten();
    }

    /// Remove a node and its subtree. Idempotent.
    pub fn remove_node(&mut self, path: &Path) -> Option<TreeNode> {
        let removed = self.root.remove_node(path);
        if removed.is_some() {
            self.flatten();
        }
        removed
    }

    /// Relocate a node after a rename on disk, keeping the selection on it.
    pub fn rename_path(&mut self, old: &Path, new: &Path) -> FsResult<()> {
        let was_selected = self.selected_item().map(|i| i.path == old).unwrap_or(false);
        self.root.rename_path(old, new)?;
        let dirs_first = self.dirs_first;
        if let Some(parent) = new.parent().and_then(|p| self.root.find_node_mut(p)) {
            parent.sort_children(dirs_first);
        }
        self.flatten();
        if was_selected {
            self.select_path(new);
        }
        Ok(())
    }

    /// Swap in a rebuilt tree, keeping expanded folders and the selection.
    pub fn replace_root(&mut self, root: TreeNode) {
        let expanded = self.collect_expanded_paths();
        let selected = self.selected_item().map(|i| i.path.clone());

        self.root = root;
        self.root.expanded = true;
        self.root.sort_recursive(self.dirs_first);
        self.restore_expanded(&expanded);
        self.flatten();

        if let Some(path) = selected {
            if let Some(i) = self.find_index_by_path(&path) {
                self.selected_index = i;
            }
        }
    }

    /// Collect all currently expanded folder paths.
    pub fn collect_expanded_paths(&self) -> HashSet<PathBuf> {
        self.root
            .walk()
            .filter(|node| node.is_folder() && node.expanded)
            .map(|node| node.path.clone())
            .collect()
    }

    /// Re-expand folders from a saved set of expanded paths.
    pub fn restore_expanded(&mut self, expanded: &HashSet<PathBuf>) {
        for path in expanded {
            if let Some(node) = self.root.find_node_mut(path) {
                if node.is_folder() {
                    node.expanded = true;
                }
            }
        }
    }
}
