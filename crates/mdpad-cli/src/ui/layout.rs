use mdpad_core::{ContainerSpan, LayoutState};
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

use crate::app::state::PaneFocus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    /// Editor, divider and preview side by side.
    Split,
    /// One pane at a time.
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub kind: LayoutKind,
    pub top_bar: Rect,
    pub toolbar: Rect,
    pub content: Rect,
    pub editor: Rect,
    pub divider: Rect,
    pub preview: Rect,
    pub status: Rect,
}

impl ScreenLayout {
    /// Horizontal extent the divider ratio is projected onto.
    pub fn content_span(&self) -> ContainerSpan {
        ContainerSpan {
            left: f64::from(self.content.x),
            width: f64::from(self.content.width),
        }
    }

    pub fn on_divider(&self, column: u16, row: u16) -> bool {
        self.kind == LayoutKind::Split && self.divider.contains(Position::new(column, row))
    }

    pub fn pane_at(&self, column: u16, row: u16) -> Option<PaneFocus> {
        let pos = Position::new(column, row);
        if self.editor.contains(pos) {
            Some(PaneFocus::Editor)
        } else if self.preview.contains(pos) {
            Some(PaneFocus::Preview)
        } else {
            None
        }
    }

    pub fn editor_visible(&self) -> bool {
        self.editor.width > 0 && self.editor.height > 0
    }
}

pub fn compute_screen_layout(
    area: Rect,
    state: LayoutState,
    focus: PaneFocus,
    split_ratio: f64,
) -> ScreenLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);
    let content = rows[2];

    let (kind, editor, divider, preview) = if state.is_mobile {
        single_panes(content, focus)
    } else {
        split_panes(content, split_ratio)
    };

    ScreenLayout {
        kind,
        top_bar: rows[0],
        toolbar: rows[1],
        content,
        editor,
        divider,
        preview,
        status: rows[3],
    }
}

fn split_panes(content: Rect, split_ratio: f64) -> (LayoutKind, Rect, Rect, Rect) {
    let available = content.width.saturating_sub(1);
    let editor_width = (f64::from(content.width) * split_ratio / 100.0).round() as u16;
    let editor_width = editor_width.min(available);

    let editor = Rect {
        width: editor_width,
        ..content
    };
    let divider = Rect {
        x: content.x + editor_width,
        width: content.width.min(1),
        ..content
    };
    let preview = Rect {
        x: divider.x + divider.width,
        width: available - editor_width,
        ..content
    };
    (LayoutKind::Split, editor, divider, preview)
}

fn single_panes(content: Rect, focus: PaneFocus) -> (LayoutKind, Rect, Rect, Rect) {
    let zero = Rect {
        width: 0,
        height: 0,
        ..content
    };
    match focus {
        PaneFocus::Editor => (LayoutKind::Single, content, zero, zero),
        PaneFocus::Preview => (LayoutKind::Single, zero, zero, content),
    }
}
