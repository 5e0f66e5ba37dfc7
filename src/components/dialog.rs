use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use crate::app::{AppMode, DialogKind, DialogState};
use crate::fs::tree::NodeKind;
use crate::theme::ThemeColors;

/// Calculate a centered rectangle within the given area.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Width for `chars` of text plus border and padding, clamped to `u16`.
fn text_width(chars: usize) -> u16 {
    u16::try_from(chars).unwrap_or(u16::MAX).saturating_add(6)
}

/// One-line text input with a block cursor, scrolled to keep the cursor visible.
pub fn input_line<'a>(state: &'a DialogState, theme: &ThemeColors, width: usize) -> Line<'a> {
    let input = &state.input;
    let cursor = state.cursor_position;
    let (before, at, after) = match input[cursor..].chars().next() {
        Some(ch) => (
            &input[..cursor],
            &input[cursor..cursor + ch.len_utf8()],
            &input[cursor + ch.len_utf8()..],
        ),
        None => (input.as_str(), " ", ""),
    };

    let budget = width.saturating_sub(2);
    let before_count = before.chars().count();
    let before = if before_count > budget {
        let skip = before_count - budget;
        let start = before
            .char_indices()
            .nth(skip)
            .map(|(i, _)| i)
            .unwrap_or(before.len());
        &before[start..]
    } else {
        before
    };

    let input_style = Style::default().fg(theme.editor_fg);
    let cursor_style = Style::default()
        .bg(theme.editor_cursor_bg)
        .fg(theme.editor_cursor_fg)
        .add_modifier(Modifier::BOLD);
    Line::from(vec![
        Span::styled(before, input_style),
        Span::styled(at, cursor_style),
        Span::styled(after, input_style),
    ])
}

/// Centered modal overlay for the current dialog, if any.
pub struct DialogWidget<'a> {
    mode: &'a AppMode,
    dialog_state: &'a DialogState,
    theme: &'a ThemeColors,
}

impl<'a> DialogWidget<'a> {
    pub fn new(mode: &'a AppMode, dialog_state: &'a DialogState, theme: &'a ThemeColors) -> Self {
        Self {
            mode,
            dialog_state,
            theme,
        }
    }

    fn frame(&self, title: &str, border: ratatui::style::Color, rect: Rect, buf: &mut Buffer) -> Rect {
        Clear.render(rect, buf);
        let block = Block::default()
            .title(format!(" {} ", title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(self.theme.dialog_bg))
            .padding(Padding::horizontal(1));
        let inner = block.inner(rect);
        block.render(rect, buf);
        inner
    }

    fn hint(&self, text: &'static str, inner: Rect, buf: &mut Buffer) {
        if inner.height > 1 {
            let line = Line::from(Span::styled(
                text,
                Style::default()
                    .fg(self.theme.dim_fg)
                    .add_modifier(Modifier::DIM),
            ));
            buf.set_line(inner.x, inner.y + inner.height - 1, &line, inner.width);
        }
    }

    fn render_input(&self, title: &str, area: Rect, buf: &mut Buffer) {
        let width = 50u16.min(area.width.saturating_sub(4));
        let rect = centered_rect(width, 5, area);
        let inner = self.frame(title, self.theme.dialog_border_fg, rect, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }
        let line = input_line(self.dialog_state, self.theme, inner.width as usize);
        buf.set_line(inner.x, inner.y + inner.height / 2, &line, inner.width);
        self.hint("[Enter] Confirm  [Esc] Cancel", inner, buf);
    }

    fn render_confirm(&self, target: &std::path::Path, kind: NodeKind, area: Rect, buf: &mut Buffer) {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| target.to_string_lossy().to_string());
        let question = match kind {
            NodeKind::Folder => "Delete this folder and everything in it?",
            NodeKind::Document => "Delete this note?",
        };
        let width = text_width(name.chars().count().max(question.len()))
            .max(40)
            .min(area.width.saturating_sub(4));
        let rect = centered_rect(width, 7, area);
        let inner = self.frame("Delete", self.theme.error_fg, rect, buf);
        if inner.height < 3 || inner.width == 0 {
            return;
        }

        let header = Line::from(Span::styled(
            question,
            Style::default()
                .fg(self.theme.warning_fg)
                .add_modifier(Modifier::BOLD),
        ));
        buf.set_line(inner.x, inner.y, &header, inner.width);
        let target_line = Line::from(Span::styled(
            format!("  {}", name),
            Style::default().fg(self.theme.editor_fg),
        ));
        buf.set_line(inner.x, inner.y + 2, &target_line, inner.width);
        self.hint("[y] Yes  [n/Esc] Cancel", inner, buf);
    }

    fn render_error(&self, message: &str, area: Rect, buf: &mut Buffer) {
        let width = text_width(message.chars().count())
            .max(30)
            .min(area.width.saturating_sub(4));
        let rect = centered_rect(width, 5, area);
        let inner = self.frame("Error", self.theme.error_fg, rect, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }
        let line = Line::from(Span::styled(
            message,
            Style::default().fg(self.theme.error_fg),
        ));
        buf.set_line(inner.x, inner.y + inner.height / 2, &line, inner.width);
        self.hint("[Enter/Esc] Dismiss", inner, buf);
    }
}

impl<'a> Widget for DialogWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let AppMode::Dialog(kind) = self.mode else {
            return;
        };
        match kind {
            DialogKind::NewNote { .. } => self.render_input("New Note", area, buf),
            DialogKind::NewFolder { .. } => self.render_input("New Folder", area, buf),
            DialogKind::Rename { .. } => self.render_input("Rename", area, buf),
            DialogKind::DeleteConfirm { target, kind } => {
                self.render_confirm(target, *kind, area, buf)
            }
            DialogKind::Error { message } => self.render_error(message, area, buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::dark_theme;
    use std::path::PathBuf;

    fn render(mode: &AppMode, state: &DialogState) -> String {
        let theme = dark_theme();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        DialogWidget::new(mode, state, &theme).render(area, &mut buf);
        buffer_to_string(&buf, area)
    }

    #[test]
    fn test_input_dialog_renders() {
        let mode = AppMode::Dialog(DialogKind::NewNote {
            parent: PathBuf::from("/notes"),
        });
        let state = DialogState {
            input: "ideas".to_string(),
            cursor_position: 5,
        };
        let content = render(&mode, &state);
        assert!(content.contains("New Note"));
        assert!(content.contains("ideas"));
    }

    #[test]
    fn test_folder_delete_warns_about_contents() {
        let mode = AppMode::Dialog(DialogKind::DeleteConfirm {
            target: PathBuf::from("/notes/work"),
            kind: NodeKind::Folder,
        });
        let content = render(&mode, &DialogState::default());
        assert!(content.contains("everything in it"));
        assert!(content.contains("work"));
    }

    #[test]
    fn test_error_dialog_renders() {
        let mode = AppMode::Dialog(DialogKind::Error {
            message: "permission denied: /notes/locked.md".to_string(),
        });
        let content = render(&mode, &DialogState::default());
        assert!(content.contains("Error"));
        assert!(content.contains("permission denied"));
    }

    #[test]
    fn test_oversized_text_is_clipped_to_area() {
        let mode = AppMode::Dialog(DialogKind::Error {
            message: "e".repeat(70_000),
        });
        let content = render(&mode, &DialogState::default());
        assert!(content.contains("Error"));

        let mode = AppMode::Dialog(DialogKind::DeleteConfirm {
            target: PathBuf::from(format!("/notes/{}", "n".repeat(70_000))),
            kind: NodeKind::Document,
        });
        let content = render(&mode, &DialogState::default());
        assert!(content.contains("Delete this note?"));
        assert_eq!(text_width(70_000), u16::MAX);
    }

    #[test]
    fn test_no_dialog_mode_noop() {
        let content = render(&AppMode::Normal, &DialogState::default());
        assert!(content.trim().is_empty());
    }

    #[test]
    fn test_long_input_keeps_cursor_visible() {
        let theme = dark_theme();
        let state = DialogState {
            input: "x".repeat(100),
            cursor_position: 100,
        };
        let line = input_line(&state, &theme, 20);
        let shown: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(shown.chars().count(), 19);
        assert!(shown.ends_with(' '));
    }

    fn buffer_to_string(buf: &Buffer, area: Rect) -> String {
        let mut s = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                s.push_str(buf.cell((x, y)).unwrap().symbol());
            }
            s.push('\n');
        }
        s
    }
}
