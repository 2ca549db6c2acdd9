use mdpad_core::LineKind;
use ratatui::style::{Color, Modifier, Style};

use crate::app::state::ThemeChoice;

#[derive(Debug, Clone)]
pub struct ThemeTokens {
    pub top_bar: Style,
    pub toolbar: Style,
    pub toolbar_button: Style,
    pub status_ok: Style,
    pub status_warn: Style,
    pub status_error: Style,
    pub pane_border: Style,
    pub pane_focus: Style,
    pub divider: Style,
    pub divider_active: Style,
    pub help: Style,
    pub prompt: Style,
    pub selection: Style,
    pub heading: Style,
    pub list_bullet: Style,
    pub code_header: Style,
    pub code: Style,
    pub quote: Style,
    pub table_header: Style,
    pub table_row: Style,
    pub rule: Style,
    pub image: Style,
    pub plain: Style,
}

/// Colors a theme is derived from. `chrome_bg` paints the bars and
/// overlays when set.
#[derive(Debug, Clone, Copy)]
struct Palette {
    text: Color,
    muted: Color,
    accent: Color,
    focus: Color,
    bullet: Color,
    code: Color,
    table: Color,
    image: Color,
    button_bg: Color,
    chrome_bg: Option<Color>,
}

const EDITOR_PALETTE: Palette = Palette {
    text: Color::White,
    muted: Color::DarkGray,
    accent: Color::Cyan,
    focus: Color::LightBlue,
    bullet: Color::Magenta,
    code: Color::LightYellow,
    table: Color::LightCyan,
    image: Color::LightGreen,
    button_bg: Color::Gray,
    chrome_bg: None,
};

const HIGH_CONTRAST_PALETTE: Palette = Palette {
    text: Color::White,
    muted: Color::White,
    accent: Color::White,
    focus: Color::Yellow,
    bullet: Color::White,
    code: Color::Yellow,
    table: Color::White,
    image: Color::Green,
    button_bg: Color::White,
    chrome_bg: Some(Color::Black),
};

pub fn build_theme(choice: ThemeChoice, no_color: bool) -> ThemeTokens {
    if no_color {
        return monochrome();
    }

    match choice {
        ThemeChoice::Auto | ThemeChoice::Default => from_palette(EDITOR_PALETTE),
        ThemeChoice::HighContrast => from_palette(HIGH_CONTRAST_PALETTE),
    }
}

pub fn style_for_line(tokens: &ThemeTokens, kind: LineKind) -> Style {
    match kind {
        LineKind::Plain => tokens.plain,
        LineKind::Heading => tokens.heading,
        LineKind::ListItem => tokens.list_bullet,
        LineKind::Quote => tokens.quote,
        LineKind::CodeHeader => tokens.code_header,
        LineKind::Code => tokens.code,
        LineKind::TableHeader => tokens.table_header,
        LineKind::TableRow => tokens.table_row,
        LineKind::Rule => tokens.rule,
        LineKind::Image => tokens.image,
    }
}

fn from_palette(p: Palette) -> ThemeTokens {
    let fg = |color: Color| Style::default().fg(color);
    let strong = |color: Color| fg(color).add_modifier(Modifier::BOLD);
    let chrome = |style: Style| match p.chrome_bg {
        Some(bg) => style.bg(bg),
        None => style,
    };

    ThemeTokens {
        top_bar: chrome(strong(p.accent)),
        toolbar: chrome(fg(Color::Gray)),
        toolbar_button: strong(Color::Black).bg(p.button_bg),
        status_ok: chrome(fg(Color::Green)),
        status_warn: chrome(fg(Color::Yellow)),
        status_error: chrome(fg(Color::Red)),
        pane_border: fg(p.muted),
        pane_focus: strong(p.focus),
        divider: fg(p.muted),
        divider_active: strong(p.focus),
        help: chrome(fg(p.text)),
        prompt: chrome(fg(p.text)),
        selection: fg(Color::Black).bg(p.focus),
        heading: strong(p.accent),
        list_bullet: fg(p.bullet),
        code_header: strong(p.code),
        code: fg(p.code),
        quote: fg(Color::Gray),
        table_header: strong(p.table),
        table_row: fg(p.text),
        rule: fg(p.muted),
        image: fg(p.image).add_modifier(Modifier::ITALIC),
        plain: fg(p.text),
    }
}

fn monochrome() -> ThemeTokens {
    let plain = Style::default();
    let bold = plain.add_modifier(Modifier::BOLD);
    let reversed = plain.add_modifier(Modifier::REVERSED);

    ThemeTokens {
        top_bar: bold,
        toolbar: plain,
        toolbar_button: reversed,
        status_ok: plain,
        status_warn: plain,
        status_error: bold,
        pane_border: plain,
        pane_focus: bold,
        divider: plain,
        divider_active: reversed,
        help: plain,
        prompt: plain,
        selection: reversed,
        heading: bold,
        list_bullet: plain,
        code_header: bold,
        code: plain,
        quote: plain,
        table_header: bold,
        table_row: plain,
        rule: plain,
        image: plain.add_modifier(Modifier::ITALIC),
        plain,
    }
}

#[cfg(test)]
mod tests {
    use mdpad_core::LineKind;
    use ratatui::style::{Color, Modifier};

    use crate::app::state::ThemeChoice;

    use super::{build_theme, style_for_line};

    #[test]
    fn auto_resolves_to_the_default_palette() {
        let auto = build_theme(ThemeChoice::Auto, false);
        let default = build_theme(ThemeChoice::Default, false);
        assert_eq!(auto.heading, default.heading);
        assert_eq!(auto.selection, default.selection);
        assert_eq!(auto.top_bar.bg, None);
    }

    #[test]
    fn high_contrast_paints_chrome_and_highlights_focus() {
        let theme = build_theme(ThemeChoice::HighContrast, false);
        assert_eq!(theme.top_bar.bg, Some(Color::Black));
        assert_eq!(theme.status_error.bg, Some(Color::Black));
        assert_eq!(theme.toolbar_button.bg, Some(Color::White));
        assert_eq!(theme.selection.bg, Some(Color::Yellow));
        assert_eq!(theme.pane_focus.fg, Some(Color::Yellow));
        assert_eq!(theme.pane_border.bg, None);
    }

    #[test]
    fn no_color_wins_over_any_choice() {
        for choice in [ThemeChoice::Auto, ThemeChoice::HighContrast] {
            let theme = build_theme(choice, true);
            assert_eq!(theme.plain.fg, None);
            assert_eq!(theme.top_bar.bg, None);
            assert!(theme.selection.add_modifier.contains(Modifier::REVERSED));
            assert!(theme.heading.add_modifier.contains(Modifier::BOLD));
        }
    }

    #[test]
    fn preview_lines_take_their_kind_style() {
        let theme = build_theme(ThemeChoice::Default, false);
        assert_eq!(
            style_for_line(&theme, LineKind::Heading).fg,
            Some(Color::Cyan)
        );
        assert_eq!(
            style_for_line(&theme, LineKind::Code).fg,
            Some(Color::LightYellow)
        );
        assert!(
            style_for_line(&theme, LineKind::Image)
                .add_modifier
                .contains(Modifier::ITALIC)
        );
        assert_eq!(style_for_line(&theme, LineKind::Plain), theme.plain);
    }
}
