//! Toolbar-driven insertion of template text.
//!
//! A template lands at the most precise location available: the live
//! editing surface's selection, else the last caret position the surface
//! reported, else the end of the document. Whatever path is taken, the
//! resulting text is handed to [`Session::apply`] so it becomes a history
//! entry like any typed edit.

use crate::session::Session;

/// 1-based caret location as reported by an editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CursorPosition {
    pub line_number: usize,
    pub column: usize,
}

impl CursorPosition {
    pub const fn new(line_number: usize, column: usize) -> Self {
        Self {
            line_number,
            column,
        }
    }
}

/// A selection between two caret positions. An empty selection is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub start: CursorPosition,
    pub end: CursorPosition,
}

impl SelectionRange {
    pub const fn caret(at: CursorPosition) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Narrow view of the embedded editing component.
pub trait EditingSurface {
    fn position(&self) -> Option<CursorPosition>;
    fn selection(&self) -> Option<SelectionRange>;
    fn value(&self) -> String;
    /// Replaces `range` with `text`, leaving the caret after the new text.
    fn execute_edit(&mut self, range: SelectionRange, text: &str);
}

/// Where a template should go, in decreasing order of precision.
pub enum InsertTarget<'a> {
    Surface {
        surface: &'a mut dyn EditingSurface,
        range: SelectionRange,
    },
    Cursor(CursorPosition),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPath {
    Surface,
    Cursor,
    End,
}

impl InsertTarget<'_> {
    pub fn path(&self) -> InsertPath {
        match self {
            InsertTarget::Surface { .. } => InsertPath::Surface,
            InsertTarget::Cursor(_) => InsertPath::Cursor,
            InsertTarget::End => InsertPath::End,
        }
    }
}

/// Produces the new document text for `template` at `target`.
pub fn apply_template(document: &str, template: &str, target: InsertTarget<'_>) -> String {
    match target {
        InsertTarget::Surface { surface, range } => {
            surface.execute_edit(range, template);
            surface.value()
        }
        InsertTarget::Cursor(position) => {
            let offset = byte_offset_at(document, position);
            let mut out = String::with_capacity(document.len() + template.len());
            out.push_str(&document[..offset]);
            out.push_str(template);
            out.push_str(&document[offset..]);
            out
        }
        InsertTarget::End => {
            let mut out = String::with_capacity(document.len() + template.len());
            out.push_str(document);
            out.push_str(template);
            out
        }
    }
}

/// Character offset of `position`: the lengths of all earlier lines (each
/// plus one for its `'\n'`) and then `column - 1`.
///
/// Lines are split on `'\n'` only, so a CRLF line's `'\r'` counts towards
/// that line's length. Lines past the end clamp to the end of the text and
/// columns past the end of a line clamp to that line's end.
pub fn char_offset_at(document: &str, position: CursorPosition) -> usize {
    let target_line = position.line_number.max(1) - 1;
    let mut offset = 0usize;

    for (idx, line) in document.split('\n').enumerate() {
        let len = line.chars().count();
        if idx == target_line {
            return offset + (position.column.max(1) - 1).min(len);
        }
        offset += len + 1;
    }

    document.chars().count()
}

/// Caret position just before the char at `offset`; offsets past the end
/// land after the last char.
pub fn position_at_char_offset(document: &str, offset: usize) -> CursorPosition {
    let mut position = CursorPosition::new(1, 1);
    for ch in document.chars().take(offset) {
        if ch == '\n' {
            position.line_number += 1;
            position.column = 1;
        } else {
            position.column += 1;
        }
    }
    position
}

/// Byte index matching [`char_offset_at`], always on a char boundary.
pub fn byte_offset_at(document: &str, position: CursorPosition) -> usize {
    let chars = char_offset_at(document, position);
    document
        .char_indices()
        .nth(chars)
        .map_or(document.len(), |(idx, _)| idx)
}

/// Tracks the caret reported by the editing surface and routes template
/// insertions through the document session.
#[derive(Debug, Default, Clone)]
pub struct InsertionCoordinator {
    last_cursor: Option<CursorPosition>,
}

impl InsertionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_cursor_change(&mut self, position: CursorPosition) {
        self.last_cursor = Some(position);
    }

    pub fn last_cursor(&self) -> Option<CursorPosition> {
        self.last_cursor
    }

    /// Picks the most precise target available.
    pub fn target<'a>(&self, surface: Option<&'a mut dyn EditingSurface>) -> InsertTarget<'a> {
        if let Some(surface) = surface
            && let Some(range) = surface.selection()
        {
            return InsertTarget::Surface { surface, range };
        }
        match self.last_cursor {
            Some(position) => InsertTarget::Cursor(position),
            None => InsertTarget::End,
        }
    }

    pub fn insert(
        &mut self,
        session: &mut Session,
        surface: Option<&mut dyn EditingSurface>,
        template: &str,
    ) -> InsertPath {
        let target = self.target(surface);
        let path = target.path();
        tracing::debug!(?path, len = template.len(), "inserting template");

        let caret_after = match &target {
            InsertTarget::Cursor(position) => {
                Some(char_offset_at(session.content(), *position) + template.chars().count())
            }
            _ => None,
        };
        let next = apply_template(session.content(), template, target);
        session.apply(next);

        // Keep successive insertions in order while no surface reports a caret.
        if let Some(offset) = caret_after {
            self.last_cursor = Some(position_at_char_offset(session.content(), offset));
        }
        path
    }
}
