use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::bridge::Bridge;
use crate::editor::EditorState;
use crate::error::{AppError, FsError, Result};
use crate::fs::tree::{is_note_name, NodeKind, TreeState};
use crate::session::DocumentSession;
use crate::theme::ThemeColors;

/// The kind of dialog being displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogKind {
    NewNote { parent: PathBuf },
    NewFolder { parent: PathBuf },
    Rename { target: PathBuf, kind: NodeKind },
    DeleteConfirm { target: PathBuf, kind: NodeKind },
    Error { message: String },
}

/// Application mode.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    Dialog(DialogKind),
    /// Typing a search query.
    SearchInput,
    /// Browsing the results of the last search.
    SearchResults,
}

/// Which panel receives keys in normal mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Tree,
    Editor,
}

/// State for a dialog's text input.
#[derive(Debug, Default)]
pub struct DialogState {
    pub input: String,
    /// Byte offset into `input`.
    pub cursor_position: usize,
}

impl DialogState {
    fn with_text(text: String) -> Self {
        Self {
            cursor_position: text.len(),
            input: text,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor_position, c);
        self.cursor_position += c.len_utf8();
    }

    pub fn delete_char(&mut self) {
        if let Some(prev) = self.input[..self.cursor_position].chars().next_back() {
            self.cursor_position -= prev.len_utf8();
            self.input.remove(self.cursor_position);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if let Some(prev) = self.input[..self.cursor_position].chars().next_back() {
            self.cursor_position -= prev.len_utf8();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(next) = self.input[self.cursor_position..].chars().next() {
            self.cursor_position += next.len_utf8();
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor_position = self.input.len();
    }
}

/// Last search query and its results.
#[derive(Debug, Default)]
pub struct SearchState {
    pub query: DialogState,
    pub results: Vec<PathBuf>,
    /// Directories the backend could not read.
    pub skipped: usize,
    pub selected_index: usize,
}

impl SearchState {
    pub fn selected(&self) -> Option<&Path> {
        self.results.get(self.selected_index).map(PathBuf::as_path)
    }

    pub fn select_next(&mut self) {
        if self.selected_index + 1 < self.results.len() {
            self.selected_index += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }
}

/// Editing keys forwarded to the editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Char(char),
    Newline,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    /// End of the whole buffer.
    Bottom,
}

/// Main application state.
///
/// The app never touches the disk itself; everything goes through `store`.
pub struct App<B> {
    pub store: B,
    pub tree_state: TreeState,
    pub session: DocumentSession,
    pub editor: EditorState,
    pub focus: Focus,
    pub mode: AppMode,
    pub dialog_state: DialogState,
    pub search: SearchState,
    pub status_message: Option<(String, Instant)>,
    pub should_quit: bool,
    /// A quit already failed to persist; the next one leaves regardless.
    quit_armed: bool,
    pub confirm_delete: bool,
    pub theme: ThemeColors,
}

impl<B: Bridge> App<B> {
    /// Load the tree through `store` and start with nothing open.
    pub async fn new(
        store: B,
        extension: &str,
        dirs_first: bool,
        confirm_delete: bool,
        theme: ThemeColors,
    ) -> Result<Self> {
        let root = store.load_tree().await?;
        Ok(Self {
            store,
            tree_state: TreeState::new(root, extension, dirs_first),
            session: DocumentSession::new(extension),
            editor: EditorState::default(),
            focus: Focus::Tree,
            mode: AppMode::Normal,
            dialog_state: DialogState::default(),
            search: SearchState::default(),
            status_message: None,
            should_quit: false,
            quit_armed: false,
            confirm_delete,
            theme,
        })
    }

    fn extension(&self) -> &str {
        &self.tree_state.extension
    }

    // ── Dialogs & status ─────────────────────────────────────────────

    /// Open a dialog, prefilling the input where it makes sense.
    pub fn open_dialog(&mut self, kind: DialogKind) {
        self.dialog_state = match &kind {
            DialogKind::Rename { target, kind } => {
                let name = match kind {
                    NodeKind::Document => target.file_stem(),
                    NodeKind::Folder => target.file_name(),
                };
                DialogState::with_text(
                    name.map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default(),
                )
            }
            _ => DialogState::default(),
        };
        self.mode = AppMode::Dialog(kind);
    }

    pub fn close_dialog(&mut self) {
        self.mode = AppMode::Normal;
        self.dialog_state = DialogState::default();
    }

    /// Show `err` in a blocking dialog.
    pub fn show_error(&mut self, err: AppError) {
        tracing::debug!(error = %err, "showing error dialog");
        self.open_dialog(DialogKind::Error {
            message: err.to_string(),
        });
    }

    pub fn set_status_message(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now()));
    }

    /// Clear the status message once it has been shown for 3 seconds.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, ref created)) = self.status_message {
            if created.elapsed().as_secs() >= 3 {
                self.status_message = None;
            }
        }
    }

    // ── Tree actions ─────────────────────────────────────────────────

    /// Kind and path of the node under the cursor.
    pub fn selected_entry(&self) -> Option<(NodeKind, PathBuf)> {
        self.tree_state
            .selected_item()
            .map(|item| (item.kind, item.path.clone()))
    }

    /// Re-walk the root, keeping expansion and selection.
    pub async fn reload_tree(&mut self) -> Result<()> {
        let root = self.store.load_tree().await?;
        self.tree_state.replace_root(root);
        self.set_status_message("Reloaded".to_string());
        Ok(())
    }

    /// Toggle the selected folder, or open the selected note.
    pub async fn activate_selected(&mut self) -> Result<()> {
        let Some((kind, path)) = self.selected_entry() else {
            return Ok(());
        };
        match kind {
            NodeKind::Folder => {
                self.tree_state.toggle_selected();
                Ok(())
            }
            NodeKind::Document => self.open_note(&path).await,
        }
    }

    /// Open `path` in the editor and move focus there.
    pub async fn open_note(&mut self, path: &Path) -> Result<()> {
        self.session.open(&self.store, path).await?;
        self.editor = EditorState::new(self.session.content());
        self.focus = Focus::Editor;
        Ok(())
    }

    pub async fn create_note(&mut self, parent: &Path, name: &str) -> Result<()> {
        let name = name.trim();
        let path = self.store.create_note(parent, name).await?;
        self.insert_created_document(parent, &path);
        self.open_note(&path).await?;
        self.set_status_message(format!("Created {}", display(&path)));
        Ok(())
    }

    fn insert_created_document(&mut self, parent: &Path, path: &Path) {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if let Err(err) = self.tree_state.insert_document(parent, &file_name) {
            tracing::warn!(error = %err, "tree out of step after create");
        }
        self.tree_state.select_path(path);
    }

    pub async fn create_folder(&mut self, parent: &Path, name: &str) -> Result<()> {
        let name = name.trim();
        let path = self.store.create_folder(parent, name).await?;
        if let Err(err) = self.tree_state.insert_folder(parent, name) {
            tracing::warn!(error = %err, "tree out of step after mkdir");
        }
        self.tree_state.select_path(&path);
        self.set_status_message(format!("Created folder {}", display(&path)));
        Ok(())
    }

    /// Rename a note (by title, extension kept) or a folder (by name).
    pub async fn rename(&mut self, target: &Path, kind: NodeKind, input: &str) -> Result<()> {
        let input = input.trim();
        if kind == NodeKind::Document && self.session.active_path() == Some(target) {
            let new_path = self
                .session
                .rename(&self.store, &mut self.tree_state, input)
                .await?;
            self.set_status_message(format!("Renamed to {}", display(&new_path)));
            return Ok(());
        }

        let new_name = match kind {
            NodeKind::Document => format!("{}.{}", input, self.extension()),
            NodeKind::Folder => input.to_string(),
        };
        let new_path = self.store.rename_file(target, &new_name).await?;
        if new_path != target {
            if let Err(err) = self.tree_state.rename_path(target, &new_path) {
                tracing::warn!(error = %err, "tree out of step after rename");
            }
            self.session.follow_rename(target, &new_path);
        }
        self.set_status_message(format!("Renamed to {}", display(&new_path)));
        Ok(())
    }

    /// Ask first when configured to, otherwise delete right away.
    pub async fn request_delete(&mut self) -> Result<()> {
        let Some((kind, target)) = self.selected_entry() else {
            return Ok(());
        };
        if target == self.tree_state.root.path {
            self.set_status_message("The notes root cannot be deleted".to_string());
            return Ok(());
        }
        if self.confirm_delete {
            self.open_dialog(DialogKind::DeleteConfirm { target, kind });
            Ok(())
        } else {
            self.delete(&target, kind).await
        }
    }

    pub async fn delete(&mut self, target: &Path, kind: NodeKind) -> Result<()> {
        match kind {
            NodeKind::Document if self.session.active_path() == Some(target) => {
                self.session
                    .delete(&self.store, &mut self.tree_state)
                    .await?;
                self.after_session_closed();
            }
            NodeKind::Document => {
                self.store.delete_file(target).await?;
                self.tree_state.remove_node(target);
            }
            NodeKind::Folder => {
                self.store.delete_folder(target).await?;
                self.tree_state.remove_node(target);
                if self.session.is_within(target) {
                    self.session.clear();
                    self.after_session_closed();
                }
            }
        }
        self.set_status_message(format!("Deleted {}", display(target)));
        Ok(())
    }

    fn after_session_closed(&mut self) {
        self.editor = EditorState::default();
        self.focus = Focus::Tree;
    }

    // ── Editor actions ───────────────────────────────────────────────

    /// Apply one key to the buffer; content changes are written through.
    pub async fn edit(&mut self, key: EditKey) -> Result<()> {
        if !self.session.is_open() {
            return Ok(());
        }
        let changed = match key {
            EditKey::Char(c) => {
                self.editor.insert_char(c);
                true
            }
            EditKey::Newline => {
                self.editor.insert_newline();
                true
            }
            EditKey::Backspace => {
                self.editor.delete_char_before();
                true
            }
            EditKey::Delete => {
                self.editor.delete_char_at();
                true
            }
            EditKey::Left => {
                self.editor.move_left();
                false
            }
            EditKey::Right => {
                self.editor.move_right();
                false
            }
            EditKey::Up => {
                self.editor.move_up();
                false
            }
            EditKey::Down => {
                self.editor.move_down();
                false
            }
            EditKey::Home => {
                self.editor.move_home();
                false
            }
            EditKey::End => {
                self.editor.move_end();
                false
            }
            EditKey::Bottom => {
                self.editor.move_to_bottom();
                false
            }
        };

        let content = self.editor.content();
        if changed && content != self.session.content() {
            self.session.update_content(&self.store, content).await?;
        }
        Ok(())
    }

    pub async fn save(&mut self) -> Result<()> {
        if !self.session.is_open() {
            return Ok(());
        }
        self.session.persist(&self.store).await?;
        self.set_status_message(format!("Saved {}", self.session.title()));
        Ok(())
    }

    // ── Search ───────────────────────────────────────────────────────

    pub fn start_search(&mut self) {
        self.search = SearchState::default();
        self.mode = AppMode::SearchInput;
    }

    /// Run the typed query over the whole root.
    pub async fn run_search(&mut self) -> Result<()> {
        let query = self.search.query.input.trim().to_string();
        if query.is_empty() {
            self.mode = AppMode::Normal;
            return Ok(());
        }
        let root = self.tree_state.root.path.clone();
        let (results, skipped) = self.store.search_files(&query, &root).await?;
        self.search.results = results;
        self.search.skipped = skipped.len();
        self.search.selected_index = 0;
        self.mode = AppMode::SearchResults;
        Ok(())
    }

    /// Open the highlighted result and reveal it in the tree.
    ///
    /// Search matches every file name, but only notes can be opened; anything
    /// else would be an active document the tree does not hold.
    pub async fn open_search_result(&mut self) -> Result<()> {
        let Some(path) = self.search.selected().map(Path::to_path_buf) else {
            return Ok(());
        };
        if !is_note_name(&display(&path), self.extension()) {
            return Err(FsError::invalid_path(format!(
                "{} is not a .{} note",
                display(&path),
                self.extension()
            ))
            .into());
        }
        self.mode = AppMode::Normal;
        self.tree_state.select_path(&path);
        self.open_note(&path).await
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Persist the open note one last time, then stop.
    ///
    /// If that write fails the app stays up so the error can be seen; asking
    /// to quit a second time leaves without saving.
    pub async fn quit(&mut self) -> Result<()> {
        match self.session.persist(&self.store).await {
            Ok(()) => {
                self.should_quit = true;
                Ok(())
            }
            Err(err) if self.quit_armed => {
                tracing::error!(error = %err, "quitting without saving the open note");
                self.should_quit = true;
                Ok(())
            }
            Err(err) => {
                self.quit_armed = true;
                self.set_status_message("Not saved. Quit again to leave anyway".to_string());
                Err(err)
            }
        }
    }
}

fn display(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
