use std::path::PathBuf;

use mdpad_core::ToolbarAction;

use super::state::{PaneFocus, Prompt, ThemeChoice};

/// Commands sent over the app's bus. Every input source (keys, mouse,
/// paste, prompts) produces these instead of touching state directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    ToggleFocus,
    FocusPane(PaneFocus),
    ToggleHelp,
    ToggleMenu,
    CloseOverlays,
    OpenPrompt(Prompt),
    ApplyPrefs {
        focus: PaneFocus,
        theme: ThemeChoice,
        no_color: bool,
    },
    Undo,
    Redo,
    RequestClear,
    ConfirmClear(bool),
    Copy,
    Insert(ToolbarAction),
    RequestExport,
    /// Answer of the save-as prompt; `None` when it was dismissed.
    Export(Option<PathBuf>),
    Import(PathBuf),
    DropFile(PathBuf),
    AttachImage(PathBuf),
    Paste(String),
    BeginDrag,
    DragTo(u16),
    EndDrag,
    Scroll(i8),
    Resize(u16, u16),
}
