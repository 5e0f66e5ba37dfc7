use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, AppMode, Focus};
use crate::components::dialog::DialogWidget;
use crate::components::editor::EditorWidget;
use crate::components::search::SearchWidget;
use crate::components::status_bar::StatusBarWidget;
use crate::components::tree::TreeWidget;

/// Render the application UI.
pub fn render<B>(app: &mut App<B>, frame: &mut Frame) {
    let area = frame.area();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[0]);

    // Both panels have a border; the editor also spends two rows on its title.
    app.tree_state
        .update_scroll(panels[0].height.saturating_sub(2) as usize);
    app.editor.visible_height = panels[1].height.saturating_sub(4) as usize;
    app.editor.ensure_cursor_visible();

    let theme = &app.theme;
    let border = |focused: bool| {
        Style::default().fg(if focused {
            theme.border_focused_fg
        } else {
            theme.border_fg
        })
    };

    let tree_block = Block::default()
        .title(format!(" {} ", app.tree_state.root.display_name))
        .borders(Borders::ALL)
        .border_style(border(app.focus == Focus::Tree));
    frame.render_widget(
        TreeWidget::new(&app.tree_state, theme)
            .active_path(app.session.active_path())
            .block(tree_block),
        panels[0],
    );

    let title = app.session.is_open().then(|| app.session.title());
    let editor_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border(app.focus == Focus::Editor));
    frame.render_widget(
        EditorWidget::new(&app.editor, title, theme)
            .focused(app.focus == Focus::Editor && app.mode == AppMode::Normal)
            .block(editor_block),
        panels[1],
    );

    let label = app
        .session
        .active_path()
        .and_then(|p| p.strip_prefix(&app.tree_state.root.path).ok())
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();
    let status = app.status_message.as_ref().map(|(msg, _)| msg.as_str());
    frame.render_widget(
        StatusBarWidget::new(&label, app.focus, theme).status_message(status),
        rows[1],
    );

    match app.mode {
        AppMode::Dialog(_) => {
            frame.render_widget(DialogWidget::new(&app.mode, &app.dialog_state, theme), area)
        }
        AppMode::SearchInput | AppMode::SearchResults => frame.render_widget(
            SearchWidget::new(&app.search, &app.tree_state.root.path, theme)
                .editing(app.mode == AppMode::SearchInput),
            area,
        ),
        AppMode::Normal => {}
    }
}
