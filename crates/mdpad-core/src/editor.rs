use crate::insertion::{CursorPosition, EditingSurface, SelectionRange};

/// Caret-and-selection text buffer backing the editor pane.
///
/// Positions are byte indices that always sit on char boundaries. Undo is
/// not handled here; every change is reported to the session instead.
#[derive(Debug, Clone)]
pub struct EditorBuffer {
    text: String,
    cursor: usize,
    anchor: Option<usize>,
}

impl EditorBuffer {
    pub fn new(text: String) -> Self {
        let cursor = text.len();
        Self {
            text,
            cursor,
            anchor: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replaces the whole text (undo, redo, import) keeping the caret as
    /// close to its old byte index as the new text allows.
    pub fn set_text(&mut self, text: String) {
        self.text = text;
        self.cursor = self.floor_boundary(self.cursor.min(self.text.len()));
        self.anchor = None;
    }

    pub fn selection_bounds(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        if anchor == self.cursor {
            return None;
        }
        Some((anchor.min(self.cursor), anchor.max(self.cursor)))
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selection_bounds()
            .map(|(start, end)| &self.text[start..end])
    }

    pub fn select_all(&mut self) {
        self.anchor = Some(0);
        self.cursor = self.text.len();
    }

    pub fn insert_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.insert_str(c.encode_utf8(&mut buf));
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// Inserts `s` at the caret, replacing the selection if there is one.
    pub fn insert_str(&mut self, s: &str) {
        let (start, end) = self.selection_bounds().unwrap_or((self.cursor, self.cursor));
        self.text.replace_range(start..end, s);
        self.cursor = start + s.len();
        self.anchor = None;
    }

    pub fn backspace(&mut self) {
        if self.delete_selection() || self.cursor == 0 {
            return;
        }
        let prev = self.prev_char_boundary(self.cursor);
        self.text.replace_range(prev..self.cursor, "");
        self.cursor = prev;
    }

    pub fn delete_forward(&mut self) {
        if self.delete_selection() || self.cursor >= self.text.len() {
            return;
        }
        let next = self.next_char_boundary(self.cursor);
        self.text.replace_range(self.cursor..next, "");
    }

    pub fn move_left(&mut self, extend: bool) {
        self.begin_motion(extend);
        if self.cursor == 0 {
            return;
        }
        self.cursor = self.prev_char_boundary(self.cursor);
    }

    pub fn move_right(&mut self, extend: bool) {
        self.begin_motion(extend);
        if self.cursor >= self.text.len() {
            return;
        }
        self.cursor = self.next_char_boundary(self.cursor);
    }

    pub fn move_up(&mut self, extend: bool) {
        self.begin_motion(extend);
        let (line, col) = self.line_col_at(self.cursor);
        if line == 0 {
            return;
        }
        self.cursor = self.index_at_line_col(line - 1, col);
    }

    pub fn move_down(&mut self, extend: bool) {
        self.begin_motion(extend);
        let (line, col) = self.line_col_at(self.cursor);
        let total_lines = self.text.split('\n').count();
        if line + 1 >= total_lines {
            return;
        }
        self.cursor = self.index_at_line_col(line + 1, col);
    }

    pub fn move_line_start(&mut self, extend: bool) {
        self.begin_motion(extend);
        let (line, _) = self.line_col_at(self.cursor);
        self.cursor = self.index_at_line_col(line, 0);
    }

    pub fn move_line_end(&mut self, extend: bool) {
        self.begin_motion(extend);
        let (line, _) = self.line_col_at(self.cursor);
        self.cursor = self.index_at_line_col(line, usize::MAX);
    }

    /// Zero-based (line, column) of the caret, columns counted in chars.
    pub fn line_col_at_cursor(&self) -> (usize, usize) {
        self.line_col_at(self.cursor)
    }

    pub fn move_to_line_col(&mut self, line: usize, col: usize) {
        self.anchor = None;
        self.cursor = self.index_at_line_col(line, col);
    }

    fn begin_motion(&mut self, extend: bool) {
        if extend {
            self.anchor.get_or_insert(self.cursor);
        } else {
            self.anchor = None;
        }
    }

    fn delete_selection(&mut self) -> bool {
        let Some((start, end)) = self.selection_bounds() else {
            self.anchor = None;
            return false;
        };
        self.text.replace_range(start..end, "");
        self.cursor = start;
        self.anchor = None;
        true
    }

    fn position_at(&self, byte_index: usize) -> CursorPosition {
        let (line, col) = self.line_col_at(byte_index);
        CursorPosition::new(line + 1, col + 1)
    }

    fn byte_index_at(&self, position: CursorPosition) -> usize {
        self.index_at_line_col(
            position.line_number.saturating_sub(1),
            position.column.saturating_sub(1),
        )
    }

    fn line_col_at(&self, byte_index: usize) -> (usize, usize) {
        let clamped = byte_index.min(self.text.len());
        let mut line = 0usize;
        let mut col = 0usize;
        for (idx, ch) in self.text.char_indices() {
            if idx >= clamped {
                break;
            }
            if ch == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    fn index_at_line_col(&self, target_line: usize, target_col: usize) -> usize {
        let mut line = 0usize;
        let mut col = 0usize;

        for (idx, ch) in self.text.char_indices() {
            if line == target_line && col == target_col {
                return idx;
            }
            if ch == '\n' {
                if line == target_line {
                    return idx;
                }
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }

        self.text.len()
    }

    fn floor_boundary(&self, i: usize) -> usize {
        let mut idx = i;
        while idx > 0 && !self.text.is_char_boundary(idx) {
            idx -= 1;
        }
        idx
    }

    fn prev_char_boundary(&self, i: usize) -> usize {
        self.floor_boundary(i.saturating_sub(1))
    }

    fn next_char_boundary(&self, i: usize) -> usize {
        let mut idx = (i + 1).min(self.text.len());
        while idx < self.text.len() && !self.text.is_char_boundary(idx) {
            idx += 1;
        }
        idx
    }
}

impl EditingSurface for EditorBuffer {
    fn position(&self) -> Option<CursorPosition> {
        Some(self.position_at(self.cursor))
    }

    fn selection(&self) -> Option<SelectionRange> {
        let (start, end) = self
            .selection_bounds()
            .unwrap_or((self.cursor, self.cursor));
        Some(SelectionRange {
            start: self.position_at(start),
            end: self.position_at(end),
        })
    }

    fn value(&self) -> String {
        self.text.clone()
    }

    fn execute_edit(&mut self, range: SelectionRange, text: &str) {
        let a = self.byte_index_at(range.start);
        let b = self.byte_index_at(range.end);
        let (start, end) = (a.min(b), a.max(b));
        self.text.replace_range(start..end, text);
        self.cursor = start + text.len();
        self.anchor = None;
    }
}

#[cfg(test)]
mod tests {
    use crate::insertion::{CursorPosition, EditingSurface, SelectionRange};

    use super::EditorBuffer;

    #[test]
    fn insert_and_backspace_work() {
        let mut buf = EditorBuffer::new("abc".into());
        buf.insert_char('d');
        assert_eq!(buf.text(), "abcd");

        buf.backspace();
        assert_eq!(buf.text(), "abc");
    }

    #[test]
    fn move_up_down_keeps_column_when_possible() {
        let mut buf = EditorBuffer::new("ab\n1234\nxy".into());
        buf.move_left(false);
        buf.move_left(false);
        let (_, col_before) = buf.line_col_at_cursor();

        buf.move_up(false);
        let (_, col_up) = buf.line_col_at_cursor();
        assert_eq!(col_before, col_up);

        buf.move_down(false);
        let (_, col_down) = buf.line_col_at_cursor();
        assert_eq!(col_before, col_down);
    }

    #[test]
    fn no_op_movement_and_backspace_at_edges() {
        let mut buf = EditorBuffer::new(String::new());
        assert_eq!(buf.cursor(), 0);
        buf.backspace();
        buf.delete_forward();
        buf.move_left(false);
        buf.move_right(false);
        buf.move_up(false);
        buf.move_down(false);
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn insert_newline_and_unicode_movement() {
        let mut buf = EditorBuffer::new("é".into());
        buf.insert_newline();
        assert_eq!(buf.text(), "é\n");
        buf.move_left(false);
        buf.move_left(false);
        assert_eq!(buf.cursor(), 0);
        buf.move_right(false);
        assert_eq!(buf.cursor(), "é".len());
    }

    #[test]
    fn move_down_reaches_trailing_empty_line() {
        let mut buf = EditorBuffer::new("ab\n".into());
        buf.move_to_line_col(0, 1);
        buf.move_down(false);
        assert_eq!(buf.line_col_at_cursor(), (1, 0));
    }

    #[test]
    fn shift_motion_builds_selection_and_typing_replaces_it() {
        let mut buf = EditorBuffer::new("hello world".into());
        buf.move_line_end(false);
        for _ in 0..5 {
            buf.move_left(true);
        }
        assert_eq!(buf.selected_text(), Some("world"));

        buf.insert_str("there");
        assert_eq!(buf.text(), "hello there");
        assert_eq!(buf.selection_bounds(), None);
    }

    #[test]
    fn backspace_and_delete_remove_selection_first() {
        let mut buf = EditorBuffer::new("abcdef".into());
        buf.move_to_line_col(0, 1);
        buf.move_right(true);
        buf.move_right(true);
        buf.backspace();
        assert_eq!(buf.text(), "adef");

        buf.select_all();
        buf.delete_forward();
        assert_eq!(buf.text(), "");
    }

    #[test]
    fn line_start_and_end_motions() {
        let mut buf = EditorBuffer::new("one\ntwo three".into());
        buf.move_to_line_col(1, 4);
        buf.move_line_start(false);
        assert_eq!(buf.line_col_at_cursor(), (1, 0));
        buf.move_line_end(false);
        assert_eq!(buf.line_col_at_cursor(), (1, 9));
    }

    #[test]
    fn set_text_clamps_cursor_to_char_boundary() {
        let mut buf = EditorBuffer::new("abcdef".into());
        buf.set_text("é".into());
        assert_eq!(buf.cursor(), "é".len());

        let mut buf = EditorBuffer::new("ab".into());
        buf.move_to_line_col(0, 1);
        buf.set_text("éé".into());
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn surface_reports_one_based_position_and_caret_selection() {
        let mut buf = EditorBuffer::new("ab\ncd".into());
        buf.move_to_line_col(1, 1);
        let pos = buf.position().expect("position");
        assert_eq!(pos, CursorPosition::new(2, 2));
        assert_eq!(buf.selection(), Some(SelectionRange::caret(pos)));
    }

    #[test]
    fn execute_edit_replaces_range_and_moves_caret() {
        let mut buf = EditorBuffer::new("ab\ncd".into());
        buf.execute_edit(
            SelectionRange {
                start: CursorPosition::new(2, 1),
                end: CursorPosition::new(2, 3),
            },
            "XY",
        );
        assert_eq!(buf.value(), "ab\nXY");
        assert_eq!(buf.cursor(), buf.text().len());
    }
}
