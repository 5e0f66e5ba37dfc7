//! The single active document.
//!
//! A [`DocumentSession`] holds at most one open note. Opening another note
//! replaces it outright. Every content update is written straight through to
//! the store, so the buffer and the file only differ while a write is in
//! flight.

use std::path::{Path, PathBuf};

use crate::bridge::Bridge;
use crate::error::{FsError, Result};
use crate::fs::tree::TreeState;

#[derive(Debug, Clone)]
pub struct DocumentSession {
    active_path: Option<PathBuf>,
    title: String,
    content: String,
    /// Note extension without the dot, used to build rename targets.
    extension: String,
}

fn title_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

impl DocumentSession {
    /// An empty session; nothing is open.
    pub fn new(extension: &str) -> Self {
        Self {
            active_path: None,
            title: String::new(),
            content: String::new(),
            extension: extension.to_string(),
        }
    }

    pub fn active_path(&self) -> Option<&Path> {
        self.active_path.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_open(&self) -> bool {
        self.active_path.is_some()
    }

    /// Whether the active note is `path` or lives somewhere under it.
    pub fn is_within(&self, path: &Path) -> bool {
        self.active_path
            .as_deref()
            .map(|p| p.starts_with(path))
            .unwrap_or(false)
    }

    /// Load `path` and make it the active note. On failure the previous
    /// session stays as it was.
    pub async fn open<B: Bridge>(&mut self, store: &B, path: &Path) -> Result<()> {
        let (path, content) = store.open_file(path).await?;
        tracing::debug!(path = %path.display(), "document opened");
        self.title = title_for(&path);
        self.active_path = Some(path);
        self.content = content;
        Ok(())
    }

    /// Write the buffer to the active note. Nothing open is not an error.
    pub async fn persist<B: Bridge>(&self, store: &B) -> Result<()> {
        let Some(path) = self.active_path.as_deref() else {
            return Ok(());
        };
        store.save_file(Some(path), &self.content).await?;
        Ok(())
    }

    /// Replace the buffer and persist it immediately.
    pub async fn update_content<B: Bridge>(&mut self, store: &B, text: String) -> Result<()> {
        self.content = text;
        self.persist(store).await
    }

    /// Rename the active note to `new_title` plus the note extension.
    ///
    /// On success the session follows the file and the tree node is moved.
    /// On failure nothing changes and the error is returned.
    pub async fn rename<B: Bridge>(
        &mut self,
        store: &B,
        tree: &mut TreeState,
        new_title: &str,
    ) -> Result<PathBuf> {
        let Some(old_path) = self.active_path.clone() else {
            return Err(FsError::invalid_path("no document is open").into());
        };
        let new_title = new_title.trim();
        if new_title.is_empty() {
            return Err(FsError::invalid_path("title must not be empty").into());
        }

        let new_name = format!("{}.{}", new_title, self.extension);
        let new_path = store.rename_file(&old_path, &new_name).await?;
        if new_path == old_path {
            return Ok(new_path);
        }

        self.title = title_for(&new_path);
        self.active_path = Some(new_path.clone());
        if let Err(err) = tree.rename_path(&old_path, &new_path) {
            // The old file was never in the tree; the renamed note belongs there now.
            let inserted = match (new_path.parent(), new_path.file_name()) {
                (Some(parent), Some(name)) => {
                    tree.insert_document(parent, &name.to_string_lossy())
                }
                _ => Err(err),
            };
            if let Err(err) = inserted {
                tracing::warn!(error = %err, "tree out of step after rename");
            }
        }
        Ok(new_path)
    }

    /// Delete the active note, clear the session, and drop the tree node.
    /// Nothing open is a successful no-op.
    pub async fn delete<B: Bridge>(&mut self, store: &B, tree: &mut TreeState) -> Result<()> {
        let Some(path) = self.active_path.clone() else {
            return Ok(());
        };
        store.delete_file(&path).await?;
        self.clear();
        tree.remove_node(&path);
        Ok(())
    }

    /// Follow a rename of the active note or of a folder above it.
    pub fn follow_rename(&mut self, old: &Path, new: &Path) {
        let Some(active) = self.active_path.as_deref() else {
            return;
        };
        if let Ok(rest) = active.strip_prefix(old) {
            let moved = if rest.as_os_str().is_empty() {
                new.to_path_buf()
            } else {
                new.join(rest)
            };
            self.title = title_for(&moved);
            self.active_path = Some(moved);
        }
    }

    /// Forget the active note without touching the disk.
    pub fn clear(&mut self) {
        self.active_path = None;
        self.title.clear();
        self.content.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::Backend;
    use crate::error::{AppError, FsErrorKind};
    use crate::fs::tree::TreeOptions;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        root: PathBuf,
        store: Backend,
        tree: TreeState,
    }

    async fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("todo.md"), "buy milk").unwrap();
        fs::write(root.join("plans.md"), "world domination").unwrap();
        fs::create_dir(root.join("work")).unwrap();
        fs::write(root.join("work").join("meeting.md"), "draft").unwrap();

        let store = Backend::new(root.clone(), TreeOptions::default());
        let tree = TreeState::new(store.load_tree().await.unwrap(), "md", true);
        Fixture {
            _dir: dir,
            root,
            store,
            tree,
        }
    }

    #[tokio::test]
    async fn open_sets_path_title_and_content() {
        let f = fixture().await;
        let mut session = DocumentSession::new("md");
        session.open(&f.store, &f.root.join("todo.md")).await.unwrap();

        assert_eq!(session.active_path(), Some(f.root.join("todo.md").as_path()));
        assert_eq!(session.title(), "todo");
        assert_eq!(session.content(), "buy milk");
    }

    #[tokio::test]
    async fn opening_another_note_replaces_the_session() {
        let f = fixture().await;
        let mut session = DocumentSession::new("md");
        session.open(&f.store, &f.root.join("todo.md")).await.unwrap();
        session.open(&f.store, &f.root.join("plans.md")).await.unwrap();

        assert_eq!(session.active_path(), Some(f.root.join("plans.md").as_path()));
        assert_eq!(session.content(), "world domination");
    }

    #[tokio::test]
    async fn failed_open_keeps_previous_session() {
        let f = fixture().await;
        let mut session = DocumentSession::new("md");
        session.open(&f.store, &f.root.join("todo.md")).await.unwrap();

        let err = session
            .open(&f.store, &f.root.join("missing.md"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Fs(ref e) if e.kind == FsErrorKind::NotFound));
        assert_eq!(session.title(), "todo");
    }

    #[tokio::test]
    async fn update_content_writes_through() {
        let f = fixture().await;
        let mut session = DocumentSession::new("md");
        session.open(&f.store, &f.root.join("todo.md")).await.unwrap();
        session
            .update_content(&f.store, "buy oat milk".to_string())
            .await
            .unwrap();

        assert_eq!(
            fs::read_to_string(f.root.join("todo.md")).unwrap(),
            "buy oat milk"
        );
    }

    #[tokio::test]
    async fn persist_is_idempotent() {
        let f = fixture().await;
        let mut session = DocumentSession::new("md");
        session.open(&f.store, &f.root.join("todo.md")).await.unwrap();
        session
            .update_content(&f.store, "eggs".to_string())
            .await
            .unwrap();

        session.persist(&f.store).await.unwrap();
        let first = fs::read(f.root.join("todo.md")).unwrap();
        session.persist(&f.store).await.unwrap();
        let second = fs::read(f.root.join("todo.md")).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, b"eggs");
    }

    #[tokio::test]
    async fn persist_without_document_is_noop() {
        let f = fixture().await;
        let session = DocumentSession::new("md");
        session.persist(&f.store).await.unwrap();
    }

    #[tokio::test]
    async fn rename_moves_file_session_and_tree_node() {
        let mut f = fixture().await;
        let mut session = DocumentSession::new("md");
        session.open(&f.store, &f.root.join("todo.md")).await.unwrap();

        let new_path = session
            .rename(&f.store, &mut f.tree, "groceries")
            .await
            .unwrap();

        assert_eq!(new_path, f.root.join("groceries.md"));
        assert_eq!(session.active_path(), Some(new_path.as_path()));
        assert_eq!(session.title(), "groceries");
        assert!(new_path.exists());
        assert!(!f.root.join("todo.md").exists());
        assert!(f.tree.root.find_node(&new_path).is_some());
        assert!(f.tree.root.find_node(&f.root.join("todo.md")).is_none());
    }

    #[tokio::test]
    async fn renaming_an_untracked_file_into_a_note_adds_it_to_the_tree() {
        let mut f = fixture().await;
        let stray = f.root.join("work").join("meeting.txt");
        fs::write(&stray, "minutes").unwrap();
        let mut session = DocumentSession::new("md");
        session.open(&f.store, &stray).await.unwrap();

        let new_path = session.rename(&f.store, &mut f.tree, "agenda").await.unwrap();

        assert_eq!(new_path, f.root.join("work").join("agenda.md"));
        assert!(new_path.exists());
        assert!(f.tree.root.find_node(&new_path).is_some());
    }

    #[tokio::test]
    async fn rename_onto_existing_note_fails_and_keeps_session() {
        let mut f = fixture().await;
        let mut session = DocumentSession::new("md");
        session.open(&f.store, &f.root.join("todo.md")).await.unwrap();

        let err = session
            .rename(&f.store, &mut f.tree, "plans")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Fs(ref e) if e.kind == FsErrorKind::AlreadyExists));
        assert_eq!(session.active_path(), Some(f.root.join("todo.md").as_path()));
        assert_eq!(session.title(), "todo");
        assert_eq!(
            fs::read_to_string(f.root.join("plans.md")).unwrap(),
            "world domination"
        );
        assert!(f.tree.root.find_node(&f.root.join("todo.md")).is_some());
    }

    #[tokio::test]
    async fn rename_with_nothing_open_fails() {
        let mut f = fixture().await;
        let mut session = DocumentSession::new("md");
        assert!(session.rename(&f.store, &mut f.tree, "x").await.is_err());
    }

    #[tokio::test]
    async fn rename_to_blank_title_fails() {
        let mut f = fixture().await;
        let mut session = DocumentSession::new("md");
        session.open(&f.store, &f.root.join("todo.md")).await.unwrap();
        let err = session.rename(&f.store, &mut f.tree, "  ").await.unwrap_err();
        assert!(matches!(err, AppError::Fs(ref e) if e.kind == FsErrorKind::InvalidPath));
        assert!(f.root.join("todo.md").exists());
    }

    #[tokio::test]
    async fn delete_clears_session_and_tree_node() {
        let mut f = fixture().await;
        let mut session = DocumentSession::new("md");
        let path = f.root.join("work").join("meeting.md");
        session.open(&f.store, &path).await.unwrap();

        session.delete(&f.store, &mut f.tree).await.unwrap();

        assert!(!session.is_open());
        assert_eq!(session.content(), "");
        assert!(!path.exists());
        assert!(f.tree.root.find_node(&path).is_none());
    }

    #[tokio::test]
    async fn delete_without_document_is_noop() {
        let mut f = fixture().await;
        let mut session = DocumentSession::new("md");
        session.delete(&f.store, &mut f.tree).await.unwrap();
        assert!(f.root.join("todo.md").exists());
    }

    #[tokio::test]
    async fn failed_delete_keeps_session() {
        let mut f = fixture().await;
        let mut session = DocumentSession::new("md");
        let path = f.root.join("todo.md");
        session.open(&f.store, &path).await.unwrap();
        fs::remove_file(&path).unwrap();

        assert!(session.delete(&f.store, &mut f.tree).await.is_err());
        assert_eq!(session.active_path(), Some(path.as_path()));
    }

    #[test]
    fn follow_rename_rebases_under_moved_folder() {
        let mut session = DocumentSession::new("md");
        session.active_path = Some(PathBuf::from("/notes/work/meeting.md"));
        session.title = "meeting".into();

        session.follow_rename(Path::new("/notes/work"), Path::new("/notes/job"));
        assert_eq!(
            session.active_path(),
            Some(Path::new("/notes/job/meeting.md"))
        );

        session.follow_rename(Path::new("/notes/other"), Path::new("/notes/else"));
        assert_eq!(
            session.active_path(),
            Some(Path::new("/notes/job/meeting.md"))
        );
    }

    #[test]
    fn is_within_matches_self_and_ancestors() {
        let mut session = DocumentSession::new("md");
        assert!(!session.is_within(Path::new("/notes")));
        session.active_path = Some(PathBuf::from("/notes/work/meeting.md"));
        assert!(session.is_within(Path::new("/notes/work")));
        assert!(session.is_within(Path::new("/notes/work/meeting.md")));
        assert!(!session.is_within(Path::new("/notes/workshop")));
    }
}
