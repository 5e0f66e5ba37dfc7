use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppMode, DialogKind, EditKey, Focus};
use crate::bridge::Bridge;
use crate::error::Result;

/// Handle a key event. Failures end up in the error dialog.
pub async fn handle_key_event<B: Bridge>(app: &mut App<B>, key: KeyEvent) {
    if let Err(err) = dispatch(app, key).await {
        app.show_error(err);
    }
}

async fn dispatch<B: Bridge>(app: &mut App<B>, key: KeyEvent) -> Result<()> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return app.quit().await;
    }

    match app.mode.clone() {
        AppMode::Dialog(kind) => handle_dialog_key(app, kind, key).await,
        AppMode::SearchInput => handle_search_input_key(app, key).await,
        AppMode::SearchResults => handle_search_results_key(app, key).await,
        AppMode::Normal => match app.focus {
            Focus::Tree => handle_tree_key(app, key).await,
            Focus::Editor => handle_editor_key(app, key).await,
        },
    }
}

async fn handle_tree_key<B: Bridge>(app: &mut App<B>, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Char('q') => return app.quit().await,
        KeyCode::Char('j') | KeyCode::Down => app.tree_state.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.tree_state.select_previous(),
        KeyCode::Char('g') | KeyCode::Home => app.tree_state.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.tree_state.select_last(),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
            return app.activate_selected().await
        }
        KeyCode::Char('h') | KeyCode::Left => app.tree_state.collapse_selected(),
        KeyCode::Tab | KeyCode::Char('i') => {
            if app.session.is_open() {
                app.focus = Focus::Editor;
            }
        }
        KeyCode::Char('n') => {
            let parent = app.tree_state.selected_folder();
            app.open_dialog(DialogKind::NewNote { parent });
        }
        KeyCode::Char('N') => {
            let parent = app.tree_state.selected_folder();
            app.open_dialog(DialogKind::NewFolder { parent });
        }
        KeyCode::Char('r') => {
            if let Some((kind, target)) = app.selected_entry() {
                if target == app.tree_state.root.path {
                    app.set_status_message("The notes root cannot be renamed".to_string());
                } else {
                    app.open_dialog(DialogKind::Rename { target, kind });
                }
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => return app.request_delete().await,
        KeyCode::Char('/') => app.start_search(),
        KeyCode::Char('R') => return app.reload_tree().await,
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return app.save().await
        }
        _ => {}
    }
    Ok(())
}

async fn handle_editor_key<B: Bridge>(app: &mut App<B>, key: KeyEvent) -> Result<()> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let edit = match key.code {
        KeyCode::Esc | KeyCode::Tab => {
            app.focus = Focus::Tree;
            return Ok(());
        }
        KeyCode::Char('s') if ctrl => return app.save().await,
        KeyCode::Char(_) if ctrl => return Ok(()),
        KeyCode::Char(c) => EditKey::Char(c),
        KeyCode::Enter => EditKey::Newline,
        KeyCode::Backspace => EditKey::Backspace,
        KeyCode::Delete => EditKey::Delete,
        KeyCode::Left => EditKey::Left,
        KeyCode::Right => EditKey::Right,
        KeyCode::Up => EditKey::Up,
        KeyCode::Down => EditKey::Down,
        KeyCode::Home => EditKey::Home,
        KeyCode::End if ctrl => EditKey::Bottom,
        KeyCode::End => EditKey::End,
        _ => return Ok(()),
    };
    app.edit(edit).await
}

async fn handle_dialog_key<B: Bridge>(
    app: &mut App<B>,
    kind: DialogKind,
    key: KeyEvent,
) -> Result<()> {
    match kind {
        DialogKind::Error { .. } => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                app.close_dialog();
            }
            Ok(())
        }
        DialogKind::DeleteConfirm { target, kind } => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                app.close_dialog();
                app.delete(&target, kind).await
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.close_dialog();
                Ok(())
            }
            _ => Ok(()),
        },
        input_kind => {
            match key.code {
                KeyCode::Esc => app.close_dialog(),
                KeyCode::Enter => {
                    let input = app.dialog_state.input.clone();
                    app.close_dialog();
                    return submit_input(app, input_kind, &input).await;
                }
                KeyCode::Char(c) => app.dialog_state.insert_char(c),
                KeyCode::Backspace => app.dialog_state.delete_char(),
                KeyCode::Left => app.dialog_state.move_cursor_left(),
                KeyCode::Right => app.dialog_state.move_cursor_right(),
                KeyCode::Home => app.dialog_state.cursor_home(),
                KeyCode::End => app.dialog_state.cursor_end(),
                _ => {}
            }
            Ok(())
        }
    }
}

async fn submit_input<B: Bridge>(app: &mut App<B>, kind: DialogKind, input: &str) -> Result<()> {
    match kind {
        DialogKind::NewNote { parent } => app.create_note(&parent, input).await,
        DialogKind::NewFolder { parent } => app.create_folder(&parent, input).await,
        DialogKind::Rename { target, kind } => app.rename(&target, kind, input).await,
        DialogKind::DeleteConfirm { .. } | DialogKind::Error { .. } => Ok(()),
    }
}

async fn handle_search_input_key<B: Bridge>(app: &mut App<B>, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Esc => app.mode = AppMode::Normal,
        KeyCode::Enter => return app.run_search().await,
        KeyCode::Char(c) => app.search.query.insert_char(c),
        KeyCode::Backspace => app.search.query.delete_char(),
        KeyCode::Left => app.search.query.move_cursor_left(),
        KeyCode::Right => app.search.query.move_cursor_right(),
        _ => {}
    }
    Ok(())
}

async fn handle_search_results_key<B: Bridge>(app: &mut App<B>, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.mode = AppMode::Normal,
        KeyCode::Char('j') | KeyCode::Down => app.search.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.search.select_previous(),
        KeyCode::Char('/') => app.mode = AppMode::SearchInput,
        KeyCode::Enter => return app.open_search_result().await,
        _ => {}
    }
    Ok(())
}
