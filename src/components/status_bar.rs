use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::app::Focus;
use crate::theme::ThemeColors;

const TREE_HINTS: &str = " n:note  N:folder  r:ren  d:del  /:find  q:quit ";
const EDITOR_HINTS: &str = " Esc:tree  Ctrl+S:save ";

/// Bottom line: the open note on the left, key hints on the right.
/// A transient status message replaces both while it is live.
pub struct StatusBarWidget<'a> {
    label: &'a str,
    focus: Focus,
    theme: &'a ThemeColors,
    status_message: Option<&'a str>,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(label: &'a str, focus: Focus, theme: &'a ThemeColors) -> Self {
        Self {
            label,
            focus,
            theme,
            status_message: None,
        }
    }

    pub fn status_message(mut self, msg: Option<&'a str>) -> Self {
        self.status_message = msg;
        self
    }
}

/// Keep the tail of `text` so it fits in `budget` columns.
fn truncate_front(text: &str, budget: usize) -> String {
    let count = text.chars().count();
    if count <= budget {
        return text.to_string();
    }
    if budget <= 3 {
        return text.chars().take(budget).collect();
    }
    let tail: String = text.chars().skip(count - (budget - 3)).collect();
    format!("...{}", tail)
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let width = area.width as usize;
        let base = Style::default()
            .bg(self.theme.status_bg)
            .fg(self.theme.status_fg);
        buf.set_style(area, base);

        if let Some(msg) = self.status_message {
            let line = Line::from(Span::styled(
                format!(" {}", msg),
                base.fg(self.theme.success_fg),
            ));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        let hints = match self.focus {
            Focus::Tree => TREE_HINTS,
            Focus::Editor => EDITOR_HINTS,
        };
        let hints_len = hints.chars().count();
        let label = truncate_front(self.label, width.saturating_sub(hints_len + 1));
        let pad = width
            .saturating_sub(label.chars().count() + 1)
            .saturating_sub(hints_len);

        let line = Line::from(vec![
            Span::styled(format!(" {}", label), base.add_modifier(Modifier::BOLD)),
            Span::styled(" ".repeat(pad), base),
            Span::styled(hints, base.fg(self.theme.dim_fg)),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::dark_theme;

    fn render(widget: StatusBarWidget, width: u16) -> (Buffer, String) {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        let content = (0..width)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect();
        (buf, content)
    }

    #[test]
    fn test_shows_label_and_tree_hints() {
        let tc = dark_theme();
        let (_, content) = render(StatusBarWidget::new("todo", Focus::Tree, &tc), 100);
        assert!(content.contains("todo"));
        assert!(content.contains("n:note"));
        assert!(content.contains("q:quit"));
    }

    #[test]
    fn test_editor_focus_switches_hints() {
        let tc = dark_theme();
        let (_, content) = render(StatusBarWidget::new("todo", Focus::Editor, &tc), 100);
        assert!(content.contains("Ctrl+S:save"));
        assert!(!content.contains("n:note"));
    }

    #[test]
    fn test_status_message_replaces_bar() {
        let tc = dark_theme();
        let widget =
            StatusBarWidget::new("todo", Focus::Tree, &tc).status_message(Some("Saved todo"));
        let (buf, content) = render(widget, 80);
        assert!(content.contains("Saved todo"));
        assert!(!content.contains("n:note"));
        assert_eq!(buf.cell((1, 0)).unwrap().fg, tc.success_fg);
    }

    #[test]
    fn test_long_label_keeps_tail() {
        assert_eq!(truncate_front("/a/very/long/path/note.md", 10), "...note.md");
        assert_eq!(truncate_front("short", 10), "short");
    }

    #[test]
    fn test_zero_area_does_not_panic() {
        let tc = dark_theme();
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        StatusBarWidget::new("x", Focus::Tree, &tc).render(area, &mut buf);
    }
}
