use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::editor::EditorState;
use crate::theme::ThemeColors;

/// The editor panel: the note title on top, the buffer below.
pub struct EditorWidget<'a> {
    editor: &'a EditorState,
    title: Option<&'a str>,
    theme: &'a ThemeColors,
    focused: bool,
    block: Option<Block<'a>>,
}

impl<'a> EditorWidget<'a> {
    /// `title` is `None` when no note is open.
    pub fn new(editor: &'a EditorState, title: Option<&'a str>, theme: &'a ThemeColors) -> Self {
        Self {
            editor,
            title,
            theme,
            focused: false,
            block: None,
        }
    }

    /// Draw the cursor.
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn render_line(&self, line_idx: usize, text: &str) -> Line<'static> {
        let text_style = Style::default().fg(self.theme.editor_fg);
        if !self.focused || line_idx != self.editor.cursor_line {
            return Line::from(Span::styled(text.to_string(), text_style));
        }

        let cursor_style = Style::default()
            .fg(self.theme.editor_cursor_fg)
            .bg(self.theme.editor_cursor_bg);
        let col = self.editor.cursor_col;
        let before: String = text.chars().take(col).collect();
        let at: String = text.chars().nth(col).map(String::from).unwrap_or_else(|| " ".into());
        let after: String = text.chars().skip(col + 1).collect();
        Line::from(vec![
            Span::styled(before, text_style),
            Span::styled(at, cursor_style),
            Span::styled(after, text_style),
        ])
    }
}

impl<'a> Widget for EditorWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let Some(title) = self.title else {
            let hint = Line::from(Span::styled(
                "No note open. Pick one in the tree, or press n to create one.",
                Style::default()
                    .fg(self.theme.dim_fg)
                    .add_modifier(Modifier::ITALIC),
            ));
            buf.set_line(inner.x, inner.y, &hint, inner.width);
            return;
        };

        let title_line = Line::from(Span::styled(
            title.to_string(),
            Style::default()
                .fg(self.theme.editor_title_fg)
                .add_modifier(Modifier::BOLD),
        ));
        buf.set_line(inner.x, inner.y, &title_line, inner.width);

        let body_height = inner.height.saturating_sub(2) as usize;
        let body_y = inner.y + 2;
        for (row, (idx, text)) in self
            .editor
            .buffer
            .iter()
            .enumerate()
            .skip(self.editor.scroll_offset)
            .take(body_height)
            .enumerate()
        {
            let line = self.render_line(idx, text);
            buf.set_line(inner.x, body_y + row as u16, &line, inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::dark_theme;

    fn render(editor: &EditorState, title: Option<&str>, focused: bool) -> Buffer {
        let theme = dark_theme();
        let area = Rect::new(0, 0, 40, 6);
        let mut buf = Buffer::empty(area);
        EditorWidget::new(editor, title, &theme)
            .focused(focused)
            .render(area, &mut buf);
        buf
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn shows_title_and_body() {
        let editor = EditorState::new("first line\nsecond");
        let buf = render(&editor, Some("todo"), false);
        assert!(row(&buf, 0).starts_with("todo"));
        assert!(row(&buf, 2).starts_with("first line"));
        assert!(row(&buf, 3).starts_with("second"));
    }

    #[test]
    fn shows_hint_without_a_note() {
        let buf = render(&EditorState::default(), None, false);
        assert!(row(&buf, 0).starts_with("No note open"));
    }

    #[test]
    fn cursor_cell_is_highlighted_when_focused() {
        let theme = dark_theme();
        let mut editor = EditorState::new("abc");
        editor.cursor_col = 1;
        let buf = render(&editor, Some("t"), true);
        let cell = buf.cell((1, 2)).unwrap();
        assert_eq!(cell.symbol(), "b");
        assert_eq!(cell.bg, theme.editor_cursor_bg);
    }
}
