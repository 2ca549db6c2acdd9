use std::borrow::Cow;

use mdpad_core::PreviewLine;
use ratatui::text::{Line, Span};

use super::theme::{ThemeTokens, style_for_line};

/// Shortens `value` to `max_chars` by cutting out its middle.
pub fn truncate_middle(value: &str, max_chars: usize) -> Cow<'_, str> {
    let count = value.chars().count();
    if count <= max_chars {
        return Cow::Borrowed(value);
    }
    if max_chars <= 1 {
        return Cow::Owned("…".chars().take(max_chars).collect());
    }

    let head = (max_chars - 1) / 2;
    let tail = max_chars - 1 - head;
    let start: String = value.chars().take(head).collect();
    let end: String = value.chars().skip(count - tail).collect();
    Cow::Owned(format!("{start}…{end}"))
}

/// Left-aligned status with a right-aligned hint, dropping the hint when
/// both do not fit.
pub fn compose_status(left: &str, right: &str, width: usize) -> String {
    let used = left.chars().count() + right.chars().count();
    if right.is_empty() || used + 1 > width {
        return truncate_middle(left, width).into_owned();
    }
    format!("{left}{:pad$}{right}", "", pad = width - used)
}

pub fn styled_preview_line(line: &PreviewLine, theme: &ThemeTokens) -> Line<'static> {
    let style = style_for_line(theme, line.kind);
    if line.kind != mdpad_core::LineKind::ListItem {
        return Line::from(Span::styled(line.text.clone(), style));
    }

    let indent = line.text.len() - line.text.trim_start().len();
    let body = &line.text[indent..];
    let marker_len = body
        .find(' ')
        .map(|idx| idx + 1)
        .unwrap_or(body.len());
    Line::from(vec![
        Span::styled(line.text[..indent + marker_len].to_string(), style),
        Span::styled(body[marker_len..].to_string(), theme.plain),
    ])
}
