use std::path::Path;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use crate::app::SearchState;
use crate::components::dialog::{centered_rect, input_line};
use crate::theme::ThemeColors;

/// Find-by-name overlay: the query on top, matches below.
pub struct SearchWidget<'a> {
    state: &'a SearchState,
    root: &'a Path,
    theme: &'a ThemeColors,
    editing: bool,
}

impl<'a> SearchWidget<'a> {
    /// Results are shown relative to `root`.
    pub fn new(state: &'a SearchState, root: &'a Path, theme: &'a ThemeColors) -> Self {
        Self {
            state,
            root,
            theme,
            editing: true,
        }
    }

    /// Whether the query line has the cursor, or the result list does.
    pub fn editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }

    fn summary(&self) -> String {
        if self.editing {
            return "Enter to search, Esc to cancel".to_string();
        }
        let count = self.state.results.len();
        let mut text = format!("{} match{}", count, if count == 1 { "" } else { "es" });
        if self.state.skipped > 0 {
            text.push_str(&format!(", {} folder(s) unreadable", self.state.skipped));
        }
        text
    }

    /// Split `display` around the last case-insensitive hit of `query`.
    fn highlight(&self, display: String, base: Style) -> Vec<Span<'static>> {
        let query = self.state.query.input.trim().to_lowercase();
        if query.is_empty() {
            return vec![Span::styled(display, base)];
        }
        // Lowercasing can change a char's byte width, so keep each char's
        // offset in both strings and only cut where the two line up.
        let mut lower = String::with_capacity(display.len());
        let mut offsets = Vec::new();
        for (at, ch) in display.char_indices() {
            offsets.push((lower.len(), at));
            lower.extend(ch.to_lowercase());
        }
        offsets.push((lower.len(), display.len()));
        let to_display = |offset: usize| {
            offsets
                .iter()
                .find(|(lowered, _)| *lowered == offset)
                .map(|(_, at)| *at)
        };
        let bounds = lower
            .rfind(&query)
            .and_then(|hit| Some((to_display(hit)?, to_display(hit + query.len())?)));
        let Some((start, end)) = bounds else {
            return vec![Span::styled(display, base)];
        };
        let matched = base.fg(self.theme.warning_fg).add_modifier(Modifier::BOLD);
        vec![
            Span::styled(display[..start].to_string(), base),
            Span::styled(display[start..end].to_string(), matched),
            Span::styled(display[end..].to_string(), base),
        ]
    }
}

impl<'a> Widget for SearchWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 5 || area.width < 20 {
            return;
        }

        let width = (area.width * 60 / 100).clamp(30, 80).min(area.width);
        let height = if self.editing {
            5
        } else {
            (area.height * 60 / 100).clamp(8, 30).min(area.height)
        };
        let rect = centered_rect(width, height, area);
        Clear.render(rect, buf);

        let block = Block::default()
            .title(" Find Note ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.dialog_border_fg))
            .style(Style::default().bg(self.theme.dialog_bg))
            .padding(Padding::horizontal(1));
        let inner = block.inner(rect);
        block.render(rect, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let prompt = Span::styled(
            "/ ",
            Style::default()
                .fg(self.theme.info_fg)
                .add_modifier(Modifier::BOLD),
        );
        let mut query = if self.editing {
            input_line(&self.state.query, self.theme, (inner.width as usize).saturating_sub(2))
        } else {
            Line::from(Span::styled(
                self.state.query.input.as_str(),
                Style::default().fg(self.theme.editor_fg),
            ))
        };
        query.spans.insert(0, prompt);
        buf.set_line(inner.x, inner.y, &query, inner.width);

        if inner.height > 1 {
            let summary = Line::from(Span::styled(
                format!("─── {} ", self.summary()),
                Style::default().fg(self.theme.dim_fg),
            ));
            buf.set_line(inner.x, inner.y + 1, &summary, inner.width);
        }
        if self.editing {
            return;
        }

        let visible = inner.height.saturating_sub(2) as usize;
        let scroll = (self.state.selected_index + 1).saturating_sub(visible);
        for (row, (idx, path)) in self
            .state
            .results
            .iter()
            .enumerate()
            .skip(scroll)
            .take(visible)
            .enumerate()
        {
            let selected = idx == self.state.selected_index;
            let base = if selected {
                Style::default()
                    .fg(self.theme.editor_fg)
                    .bg(self.theme.tree_selected_bg)
            } else {
                Style::default().fg(self.theme.dim_fg)
            };
            let display = path
                .strip_prefix(self.root)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();
            let mut spans = vec![Span::styled(if selected { "▸ " } else { "  " }, base)];
            spans.extend(self.highlight(display, base));
            buf.set_line(inner.x, inner.y + 2 + row as u16, &Line::from(spans), inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::DialogState;
    use crate::theme::dark_theme;
    use std::path::PathBuf;

    fn state(query: &str, results: &[&str]) -> SearchState {
        SearchState {
            query: DialogState {
                input: query.to_string(),
                cursor_position: query.len(),
            },
            results: results.iter().map(|p| PathBuf::from(*p)).collect(),
            skipped: 0,
            selected_index: 0,
        }
    }

    fn render(state: &SearchState, editing: bool) -> String {
        let theme = dark_theme();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        SearchWidget::new(state, Path::new("/notes"), &theme)
            .editing(editing)
            .render(area, &mut buf);
        let mut s = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                s.push_str(buf.cell((x, y)).unwrap().symbol());
            }
            s.push('\n');
        }
        s
    }

    #[test]
    fn test_input_shows_query() {
        let s = state("meet", &[]);
        let out = render(&s, true);
        assert!(out.contains("Find Note"));
        assert!(out.contains("/ meet"));
        assert!(out.contains("Enter to search"));
    }

    #[test]
    fn test_results_are_relative_to_root() {
        let s = state("meet", &["/notes/work/meeting.md", "/notes/meetups.md"]);
        let out = render(&s, false);
        assert!(out.contains("2 matches"));
        assert!(out.contains("▸ work/meeting.md"));
        assert!(out.contains("  meetups.md"));
    }

    #[test]
    fn test_skipped_folders_are_reported() {
        let mut s = state("x", &["/notes/x.md"]);
        s.skipped = 2;
        let out = render(&s, false);
        assert!(out.contains("1 match,"));
        assert!(out.contains("2 folder(s) unreadable"));
    }

    #[test]
    fn test_highlight_follows_char_boundaries() {
        let theme = dark_theme();
        let s = state("ß", &[]);
        let widget = SearchWidget::new(&s, Path::new("/notes"), &theme);
        let spans = widget.highlight("İẞ.md".to_string(), Style::default());
        let parts: Vec<&str> = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(parts, vec!["İ", "ẞ", ".md"]);
    }

    #[test]
    fn test_highlight_without_hit_keeps_text_whole() {
        let theme = dark_theme();
        let s = state("i", &[]);
        let widget = SearchWidget::new(&s, Path::new("/notes"), &theme);
        // "İ" lowers to "i" plus a combining dot, which is not a whole-char hit.
        let spans = widget.highlight("İẞ".to_string(), Style::default());
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "İẞ");
    }

    #[test]
    fn test_tiny_area_is_skipped() {
        let theme = dark_theme();
        let s = state("x", &[]);
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        SearchWidget::new(&s, Path::new("/"), &theme).render(area, &mut buf);
    }
}
