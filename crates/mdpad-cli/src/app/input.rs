use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use mdpad_core::ToolbarAction;

use super::action::Action;
use super::state::{Prompt, PromptKind};
use crate::ui::layout::ScreenLayout;
use crate::ui::toolbar::{self, ToolbarButton, ToolbarHit};

/// Shortcuts that work regardless of which pane has focus.
pub fn map_global_key(key: KeyEvent) -> Option<Action> {
    let ctrl_shift = KeyModifiers::CONTROL | KeyModifiers::SHIFT;
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::CONTROL) => Some(Action::Quit),
        (KeyCode::Char('s'), KeyModifiers::CONTROL) => Some(Action::RequestExport),
        (KeyCode::Char('o'), KeyModifiers::CONTROL) => {
            Some(Action::OpenPrompt(Prompt::new(PromptKind::Import)))
        }
        (KeyCode::Char('g'), KeyModifiers::CONTROL) => {
            Some(Action::OpenPrompt(Prompt::new(PromptKind::AttachImage)))
        }
        (KeyCode::Char('z'), KeyModifiers::CONTROL) => Some(Action::Undo),
        (KeyCode::Char('y'), KeyModifiers::CONTROL) => Some(Action::Redo),
        (KeyCode::Char('z' | 'Z'), mods) if mods == ctrl_shift => Some(Action::Redo),
        (KeyCode::Char('l'), KeyModifiers::CONTROL) => Some(Action::RequestClear),
        (KeyCode::Char('k'), KeyModifiers::CONTROL) => Some(Action::Copy),
        (KeyCode::Char('t'), KeyModifiers::CONTROL) => Some(Action::ToggleMenu),
        (KeyCode::Char('/'), KeyModifiers::CONTROL) => Some(Action::ToggleHelp),
        (KeyCode::Char(digit), KeyModifiers::ALT) => {
            ToolbarAction::from_shortcut_digit(digit).map(Action::Insert)
        }
        (KeyCode::BackTab, _) => Some(Action::ToggleFocus),
        (KeyCode::Esc, _) => Some(Action::CloseOverlays),
        _ => None,
    }
}

pub fn map_mouse(
    mouse: MouseEvent,
    screen: &ScreenLayout,
    buttons: &[ToolbarButton],
    dragging: bool,
) -> Option<Action> {
    let (column, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(hit) = toolbar::hit_test(buttons, column, row) {
                return Some(match hit {
                    ToolbarHit::Action(action) => Action::Insert(action),
                    ToolbarHit::MenuToggle => Action::ToggleMenu,
                });
            }
            if screen.on_divider(column, row) {
                return Some(Action::BeginDrag);
            }
            screen.pane_at(column, row).map(Action::FocusPane)
        }
        MouseEventKind::Drag(MouseButton::Left) if dragging => Some(Action::DragTo(column)),
        MouseEventKind::Up(MouseButton::Left) if dragging => Some(Action::EndDrag),
        MouseEventKind::ScrollUp => Some(Action::Scroll(-1)),
        MouseEventKind::ScrollDown => Some(Action::Scroll(1)),
        _ => None,
    }
}

/// Terminals deliver a dropped file as a pasted path. A single-line paste
/// naming an existing file becomes a drop; anything else is text.
pub fn classify_paste(text: &str, is_file: impl Fn(&Path) -> bool) -> Action {
    if let Some(path) = dropped_path(text)
        && is_file(&path)
    {
        return Action::DropFile(path);
    }
    Action::Paste(text.to_string())
}

fn dropped_path(text: &str) -> Option<PathBuf> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.contains('\n') {
        return None;
    }
    let unquoted = ['\'', '"']
        .iter()
        .find_map(|q| {
            trimmed
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .unwrap_or(trimmed);
    let unquoted = unquoted.strip_prefix("file://").unwrap_or(unquoted);
    Some(PathBuf::from(unquoted.replace("\\ ", " ")))
}
