use mdpad_core::{LayoutState, ToolbarAction};
use ratatui::layout::{Position, Rect};

pub const MENU_LABEL: &str = " ≡ Menu ";

/// What a click on the toolbar row or the slide-out menu hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarHit {
    Action(ToolbarAction),
    MenuToggle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarButton {
    pub hit: ToolbarHit,
    pub label: String,
    pub area: Rect,
}

pub fn toolbar_actions(state: LayoutState) -> &'static [ToolbarAction] {
    if state.is_mobile {
        &ToolbarAction::MOBILE
    } else {
        &ToolbarAction::ALL
    }
}

pub fn button_label(action: ToolbarAction) -> String {
    format!(" {} {} ", action.shortcut_digit(), action.label())
}

/// Buttons on the toolbar row. In compact mode only the menu toggle is
/// shown; otherwise actions are laid out left to right while they fit.
pub fn toolbar_buttons(row: Rect, state: LayoutState) -> Vec<ToolbarButton> {
    if state.use_compact_menu {
        let width = (MENU_LABEL.chars().count() as u16).min(row.width);
        return vec![ToolbarButton {
            hit: ToolbarHit::MenuToggle,
            label: MENU_LABEL.to_string(),
            area: Rect { width, ..row },
        }];
    }

    let mut buttons = Vec::new();
    let mut x = row.x;
    let right = row.x + row.width;
    for action in toolbar_actions(state) {
        let label = button_label(*action);
        let width = label.chars().count() as u16;
        if x + width > right {
            break;
        }
        buttons.push(ToolbarButton {
            hit: ToolbarHit::Action(*action),
            label,
            area: Rect { x, width, ..row },
        });
        x += width + 1;
    }
    buttons
}

/// Rect of the slide-out menu, anchored under the toolbar row on the left.
pub fn menu_area(content: Rect, state: LayoutState) -> Rect {
    let actions = toolbar_actions(state);
    let width = actions
        .iter()
        .map(|a| button_label(*a).chars().count() as u16)
        .max()
        .unwrap_or(0)
        + 2;
    Rect {
        x: content.x,
        y: content.y,
        width: width.min(content.width),
        height: (actions.len() as u16 + 2).min(content.height),
    }
}

/// One row per action inside the menu border.
pub fn menu_buttons(menu: Rect, state: LayoutState) -> Vec<ToolbarButton> {
    let inner_height = menu.height.saturating_sub(2);
    toolbar_actions(state)
        .iter()
        .take(inner_height as usize)
        .enumerate()
        .map(|(idx, action)| ToolbarButton {
            hit: ToolbarHit::Action(*action),
            label: button_label(*action),
            area: Rect {
                x: menu.x + 1,
                y: menu.y + 1 + idx as u16,
                width: menu.width.saturating_sub(2),
                height: 1,
            },
        })
        .collect()
}

pub fn hit_test(buttons: &[ToolbarButton], column: u16, row: u16) -> Option<ToolbarHit> {
    let pos = Position::new(column, row);
    buttons
        .iter()
        .find(|button| button.area.contains(pos))
        .map(|button| button.hit)
}

#[cfg(test)]
mod tests {
    use mdpad_core::{LayoutState, ToolbarAction};
    use ratatui::layout::Rect;

    use super::{
        ToolbarHit, button_label, hit_test, menu_area, menu_buttons, toolbar_buttons,
    };

    fn row(width: u16) -> Rect {
        Rect {
            x: 0,
            y: 1,
            width,
            height: 1,
        }
    }

    const WIDE: LayoutState = LayoutState {
        is_mobile: false,
        use_compact_menu: false,
    };
    const COMPACT: LayoutState = LayoutState {
        is_mobile: false,
        use_compact_menu: true,
    };
    const MOBILE: LayoutState = LayoutState {
        is_mobile: true,
        use_compact_menu: true,
    };

    #[test]
    fn labels_carry_shortcut_digit() {
        assert_eq!(button_label(ToolbarAction::Heading), " 1 Heading ");
        assert_eq!(button_label(ToolbarAction::Template), " 0 Template ");
    }

    #[test]
    fn wide_toolbar_lays_out_buttons_and_hits_them() {
        let buttons = toolbar_buttons(row(200), WIDE);
        assert_eq!(buttons.len(), ToolbarAction::ALL.len());
        assert_eq!(buttons[0].area.x, 0);
        assert_eq!(buttons[1].area.x, buttons[0].area.width + 1);

        let second = buttons[1].area;
        assert_eq!(
            hit_test(&buttons, second.x, 1),
            Some(ToolbarHit::Action(ToolbarAction::Subheading))
        );
        assert_eq!(hit_test(&buttons, second.x - 1, 1), None);
        assert_eq!(hit_test(&buttons, second.x, 2), None);
    }

    #[test]
    fn narrow_toolbar_drops_buttons_that_do_not_fit() {
        let buttons = toolbar_buttons(row(26), WIDE);
        assert_eq!(buttons.len(), 2);
        assert!(buttons.iter().all(|b| b.area.x + b.area.width <= 26));
    }

    #[test]
    fn compact_toolbar_is_a_single_menu_toggle() {
        let buttons = toolbar_buttons(row(100), COMPACT);
        assert_eq!(buttons.len(), 1);
        assert_eq!(hit_test(&buttons, 2, 1), Some(ToolbarHit::MenuToggle));
    }

    #[test]
    fn menu_lists_mobile_subset_one_per_row() {
        let content = Rect {
            x: 0,
            y: 2,
            width: 60,
            height: 20,
        };
        let menu = menu_area(content, MOBILE);
        assert_eq!(menu.height, ToolbarAction::MOBILE.len() as u16 + 2);

        let buttons = menu_buttons(menu, MOBILE);
        assert_eq!(buttons.len(), ToolbarAction::MOBILE.len());
        assert_eq!(
            hit_test(&buttons, 2, menu.y + 1),
            Some(ToolbarHit::Action(ToolbarAction::Bold))
        );
        assert_eq!(
            hit_test(&buttons, 2, menu.y + 7),
            Some(ToolbarHit::Action(ToolbarAction::Template))
        );
    }
}
