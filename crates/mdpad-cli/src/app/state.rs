#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneFocus {
    Editor,
    Preview,
}

impl PaneFocus {
    pub fn other(self) -> Self {
        match self {
            PaneFocus::Editor => PaneFocus::Preview,
            PaneFocus::Preview => PaneFocus::Editor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeChoice {
    Auto,
    Default,
    HighContrast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    SaveAs,
    Import,
    AttachImage,
    ConfirmClear,
}

impl PromptKind {
    pub fn title(self) -> &'static str {
        match self {
            PromptKind::SaveAs => "Save as",
            PromptKind::Import => "Open file",
            PromptKind::AttachImage => "Attach image",
            PromptKind::ConfirmClear => "Clear document",
        }
    }

    pub fn takes_text(self) -> bool {
        self != PromptKind::ConfirmClear
    }
}

/// Modal one-line question shown over the panes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

impl Prompt {
    pub fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            input: String::new(),
        }
    }

    pub fn with_input(kind: PromptKind, input: impl Into<String>) -> Self {
        Self {
            kind,
            input: input.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub focus: PaneFocus,
    pub help_open: bool,
    pub menu_open: bool,
    pub prompt: Option<Prompt>,
    pub theme: ThemeChoice,
    pub no_color: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            focus: PaneFocus::Editor,
            help_open: false,
            menu_open: false,
            prompt: None,
            theme: ThemeChoice::Auto,
            no_color: false,
        }
    }
}

impl UiState {
    pub fn overlay_open(&self) -> bool {
        self.help_open || self.menu_open || self.prompt.is_some()
    }
}
