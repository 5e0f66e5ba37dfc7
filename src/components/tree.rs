use std::path::Path;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::fs::tree::{FlatItem, NodeKind, TreeState};
use crate::theme::ThemeColors;

/// Tree widget that renders the note tree with box-drawing characters.
pub struct TreeWidget<'a> {
    tree_state: &'a TreeState,
    theme: &'a ThemeColors,
    active_path: Option<&'a Path>,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(tree_state: &'a TreeState, theme: &'a ThemeColors) -> Self {
        Self {
            tree_state,
            theme,
            active_path: None,
            block: None,
        }
    }

    /// Highlight the note open in the editor.
    pub fn active_path(mut self, path: Option<&'a Path>) -> Self {
        self.active_path = path;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Indentation guides for `item`, looking back through its ancestors to
    /// know which levels still have siblings below.
    fn build_prefix(item: &FlatItem, items: &[FlatItem], item_index: usize) -> String {
        if item.depth == 0 {
            return String::new();
        }

        let mut prefix = String::new();
        for d in 1..item.depth {
            let ancestor_is_last = items[..item_index]
                .iter()
                .rev()
                .take_while(|i| i.depth >= d)
                .find(|i| i.depth == d)
                .map(|i| i.is_last_sibling)
                .unwrap_or(false);
            prefix.push_str(if ancestor_is_last { "   " } else { "│  " });
        }
        prefix.push_str(if item.is_last_sibling { "└──" } else { "├──" });
        prefix
    }

    fn item_indicator(item: &FlatItem) -> &'static str {
        match item.kind {
            NodeKind::Folder if item.is_expanded => "▾ ",
            NodeKind::Folder => "▸ ",
            NodeKind::Document => "  ",
        }
    }
}

impl<'a> Widget for TreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        let items = &self.tree_state.flat_items;
        let visible_height = inner_area.height as usize;
        if items.is_empty() || visible_height == 0 {
            return;
        }

        let visible = items
            .iter()
            .enumerate()
            .skip(self.tree_state.scroll_offset)
            .take(visible_height);

        for (row, (idx, item)) in visible.enumerate() {
            let y = inner_area.y + row as u16;

            let is_active = self.active_path == Some(item.path.as_path());
            let mut style = match item.kind {
                NodeKind::Folder => Style::default()
                    .fg(self.theme.tree_folder_fg)
                    .add_modifier(Modifier::BOLD),
                NodeKind::Document if is_active => Style::default()
                    .fg(self.theme.tree_active_fg)
                    .add_modifier(Modifier::BOLD),
                NodeKind::Document => Style::default().fg(self.theme.tree_note_fg),
            };
            if idx == self.tree_state.selected_index {
                style = style.bg(self.theme.tree_selected_bg);
            }

            let line = Line::from(vec![
                Span::styled(
                    Self::build_prefix(item, items, idx),
                    Style::default().fg(self.theme.tree_guide_fg),
                ),
                Span::styled(
                    format!("{}{}", Self::item_indicator(item), item.name),
                    style,
                ),
            ]);
            buf.set_line(inner_area.x, y, &line, inner_area.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::tree::{build, TreeOptions};
    use crate::theme::dark_theme;
    use std::fs;
    use tempfile::TempDir;

    fn render_to_string(state: &TreeState, active: Option<&Path>) -> String {
        let theme = dark_theme();
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        TreeWidget::new(state, &theme)
            .active_path(active)
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
    fn renders_names_and_guides() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("work")).unwrap();
        fs::write(dir.path().join("todo.md"), "").unwrap();
        let root = build(dir.path(), &TreeOptions::default()).unwrap();
        let state = TreeState::new(root, "md", true);

        let out = render_to_string(&state, None);
        assert!(out.contains("├──▸ work"));
        assert!(out.contains("└──  todo"));
    }

    #[test]
    fn nested_guides_continue_under_open_folders() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("work")).unwrap();
        fs::write(dir.path().join("work").join("meeting.md"), "").unwrap();
        fs::write(dir.path().join("todo.md"), "").unwrap();
        let root = build(dir.path(), &TreeOptions::default()).unwrap();
        let mut state = TreeState::new(root, "md", true);
        state.select_path(&dir.path().join("work").join("meeting.md"));

        let out = render_to_string(&state, Some(&dir.path().join("work").join("meeting.md")));
        assert!(out.contains("├──▾ work"));
        assert!(out.contains("│  └──  meeting"));
    }
}
