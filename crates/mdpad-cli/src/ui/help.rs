pub fn help_lines() -> &'static [&'static str] {
    &[
        "Ctrl+Q quit | Ctrl+S save as | Ctrl+O open file",
        "Ctrl+Z undo | Ctrl+Y / Ctrl+Shift+Z redo",
        "Ctrl+L clear all | Ctrl+K copy document",
        "Ctrl+G attach image | Ctrl+T toolbar menu",
        "Alt+1..Alt+9, Alt+0 insert toolbar template",
        "Shift+Tab switch editor/preview | Tab inserts spaces",
        "Drag the divider to resize panes | wheel scrolls",
        "Drop or paste a file path to open it",
        "Esc closes overlays | Ctrl+/ toggles this help",
    ]
}

pub fn help_text() -> String {
    help_lines().join("\n")
}

#[cfg(test)]
mod tests {
    use super::help_text;

    #[test]
    fn help_mentions_core_shortcuts() {
        let text = help_text();
        assert!(text.contains("Ctrl+Z undo"));
        assert!(text.contains("Ctrl+S save as"));
        assert!(text.contains("Alt+0"));
    }
}
