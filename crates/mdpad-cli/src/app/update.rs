use super::action::Action;
use super::state::UiState;

/// Applies the actions that only touch view state. Returns `false` for
/// everything the document side has to handle.
pub fn apply_ui_action(ui: &mut UiState, action: &Action) -> bool {
    match action {
        Action::ToggleFocus => ui.focus = ui.focus.other(),
        Action::FocusPane(focus) => ui.focus = *focus,
        Action::ToggleHelp => {
            ui.help_open = !ui.help_open;
            ui.menu_open = false;
        }
        Action::ToggleMenu => {
            ui.menu_open = !ui.menu_open;
            ui.help_open = false;
        }
        Action::CloseOverlays => {
            ui.help_open = false;
            ui.menu_open = false;
        }
        Action::OpenPrompt(prompt) => {
            ui.prompt = Some(prompt.clone());
            ui.help_open = false;
            ui.menu_open = false;
        }
        Action::ApplyPrefs {
            focus,
            theme,
            no_color,
        } => {
            ui.focus = *focus;
            ui.theme = *theme;
            ui.no_color = *no_color;
        }
        _ => return false,
    }
    true
}
