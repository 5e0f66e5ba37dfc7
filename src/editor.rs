//! Line buffer behind the editor panel.
//!
//! The buffer is a view of the session's content: `content()` joins the lines
//! back with `\n`, so loading and re-joining is lossless.

/// Editor cursor and lines for the active note.
#[derive(Debug, Clone)]
pub struct EditorState {
    /// Lines of text in the buffer; never empty.
    pub buffer: Vec<String>,
    pub cursor_line: usize,
    /// Cursor column in chars, not bytes.
    pub cursor_col: usize,
    /// Line index of the topmost visible line.
    pub scroll_offset: usize,
    /// Visible height of the editor area, set during render.
    pub visible_height: usize,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new("")
    }
}

/// Byte index of the `col`-th char of `line` (or its end).
fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

impl EditorState {
    pub fn new(content: &str) -> Self {
        Self {
            buffer: content.split('\n').map(String::from).collect(),
            cursor_line: 0,
            cursor_col: 0,
            scroll_offset: 0,
            visible_height: 24,
        }
    }

    /// The buffer as note content.
    pub fn content(&self) -> String {
        self.buffer.join("\n")
    }

    fn current_line_len(&self) -> usize {
        self.buffer
            .get(self.cursor_line)
            .map(|l| l.chars().count())
            .unwrap_or(0)
    }

    fn clamp_cursor(&mut self) {
        if self.cursor_line >= self.buffer.len() {
            self.cursor_line = self.buffer.len().saturating_sub(1);
        }
        let line_len = self.current_line_len();
        if self.cursor_col > line_len {
            self.cursor_col = line_len;
        }
    }

    /// Scroll so the cursor line is on screen.
    pub fn ensure_cursor_visible(&mut self) {
        if self.visible_height == 0 {
            return;
        }
        if self.cursor_line < self.scroll_offset {
            self.scroll_offset = self.cursor_line;
        } else if self.cursor_line >= self.scroll_offset + self.visible_height {
            self.scroll_offset = self.cursor_line + 1 - self.visible_height;
        }
    }

    // ── Buffer mutation ───────────────────────────────────────────────

    pub fn insert_char(&mut self, ch: char) {
        if let Some(line) = self.buffer.get_mut(self.cursor_line) {
            let at = byte_index(line, self.cursor_col);
            line.insert(at, ch);
            self.cursor_col += 1;
        }
    }

    /// Split the current line at the cursor (Enter).
    pub fn insert_newline(&mut self) {
        let Some(line) = self.buffer.get_mut(self.cursor_line) else {
            return;
        };
        let at = byte_index(line, self.cursor_col);
        let rest = line.split_off(at);
        self.buffer.insert(self.cursor_line + 1, rest);
        self.cursor_line += 1;
        self.cursor_col = 0;
        self.ensure_cursor_visible();
    }

    /// Backspace; at a line start, joins with the previous line.
    pub fn delete_char_before(&mut self) {
        if self.cursor_col > 0 {
            let line = &mut self.buffer[self.cursor_line];
            let at = byte_index(line, self.cursor_col - 1);
            line.remove(at);
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            let current = self.buffer.remove(self.cursor_line);
            self.cursor_line -= 1;
            self.cursor_col = self.current_line_len();
            self.buffer[self.cursor_line].push_str(&current);
            self.ensure_cursor_visible();
        }
    }

    /// Delete; at a line end, pulls the next line up.
    pub fn delete_char_at(&mut self) {
        if self.cursor_col < self.current_line_len() {
            let line = &mut self.buffer[self.cursor_line];
            let at = byte_index(line, self.cursor_col);
            line.remove(at);
        } else if self.cursor_line + 1 < self.buffer.len() {
            let next = self.buffer.remove(self.cursor_line + 1);
            self.buffer[self.cursor_line].push_str(&next);
        }
    }

    // ── Navigation ────────────────────────────────────────────────────

    pub fn move_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.clamp_cursor();
            self.ensure_cursor_visible();
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor_line + 1 < self.buffer.len() {
            self.cursor_line += 1;
            self.clamp_cursor();
            self.ensure_cursor_visible();
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.current_line_len();
            self.ensure_cursor_visible();
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor_col < self.current_line_len() {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.buffer.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
            self.ensure_cursor_visible();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_col = self.current_line_len();
    }

    /// Put the cursor after the last char of the buffer.
    pub fn move_to_bottom(&mut self) {
        self.cursor_line = self.buffer.len().saturating_sub(1);
        self.cursor_col = self.current_line_len();
        self.ensure_cursor_visible();
    }
}
