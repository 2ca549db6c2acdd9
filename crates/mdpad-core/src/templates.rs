/// Shown when the store holds no document yet.
pub const DEFAULT_DOCUMENT: &str = r#"# Welcome to mdpad

## Features

- **Markdown syntax** with GitHub Flavored Markdown support
- **Syntax-aware preview** for fenced code blocks
- **Undo/redo** history for every change
- **Autosave** of your work between sessions

## Markup examples

### Emphasis

*Italic*, **bold text**, and ~~strikethrough~~.

### Code

Inline `code` looks like this.

```rust
// Fenced block with a language tag
fn hello() {
    println!("Hello, world!");
}
```

### Tables

| Name   | Description      | Price |
|--------|------------------|-------|
| Item 1 | First item       | 100   |
| Item 2 | Second item      | 200   |

### Lists

1. First point
2. Second point
   - Nested point
   - Another nested point
3. Third point

- [x] Try the toolbar
- [ ] Export the document

Enjoy!
"#;

const TABLE_TEMPLATE: &str = "| Header 1 | Header 2 | Header 3 |
| -------- | -------- | -------- |
| Cell 1   | Cell 2   | Cell 3   |
| Cell 4   | Cell 5   | Cell 6   |";

const DOCUMENT_TEMPLATE: &str = "# Document title

## Section 1

Section 1 text

## Section 2

Section 2 text

### Subsection 2.1

- Point 1
- Point 2
- Point 3

## Table

| Header 1 | Header 2 | Header 3 |
| -------- | -------- | -------- |
| Cell 1   | Cell 2   | Cell 3   |
| Cell 4   | Cell 5   | Cell 6   |";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolbarAction {
    Heading,
    Subheading,
    Bold,
    Italic,
    Code,
    List,
    OrderedList,
    Link,
    Table,
    Template,
}

impl ToolbarAction {
    pub const ALL: [ToolbarAction; 10] = [
        ToolbarAction::Heading,
        ToolbarAction::Subheading,
        ToolbarAction::Bold,
        ToolbarAction::Italic,
        ToolbarAction::List,
        ToolbarAction::OrderedList,
        ToolbarAction::Code,
        ToolbarAction::Link,
        ToolbarAction::Table,
        ToolbarAction::Template,
    ];

    /// Reduced set offered by the single-pane layout.
    pub const MOBILE: [ToolbarAction; 7] = [
        ToolbarAction::Bold,
        ToolbarAction::Italic,
        ToolbarAction::List,
        ToolbarAction::Code,
        ToolbarAction::Link,
        ToolbarAction::Table,
        ToolbarAction::Template,
    ];

    pub fn template(self) -> &'static str {
        match self {
            ToolbarAction::Heading => "# Heading",
            ToolbarAction::Subheading => "## Subheading",
            ToolbarAction::Bold => "**bold text**",
            ToolbarAction::Italic => "*italic text*",
            ToolbarAction::Code => "```\nYour code here\n```",
            ToolbarAction::List => "- Item 1\n- Item 2\n- Item 3",
            ToolbarAction::OrderedList => "1. First item\n2. Second item\n3. Third item",
            ToolbarAction::Link => "[Link text](https://example.com)",
            ToolbarAction::Table => TABLE_TEMPLATE,
            ToolbarAction::Template => DOCUMENT_TEMPLATE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ToolbarAction::Heading => "Heading",
            ToolbarAction::Subheading => "Subheading",
            ToolbarAction::Bold => "Bold",
            ToolbarAction::Italic => "Italic",
            ToolbarAction::Code => "Code",
            ToolbarAction::List => "List",
            ToolbarAction::OrderedList => "Num. list",
            ToolbarAction::Link => "Link",
            ToolbarAction::Table => "Table",
            ToolbarAction::Template => "Template",
        }
    }

    /// Digit used for the Alt+digit shortcut; `Template` sits on `0`.
    pub fn shortcut_digit(self) -> char {
        match Self::ALL.iter().position(|action| *action == self) {
            Some(9) | None => '0',
            Some(idx) => char::from(b'1' + idx as u8),
        }
    }

    pub fn from_shortcut_digit(digit: char) -> Option<Self> {
        match digit {
            '0' => Some(ToolbarAction::Template),
            '1'..='9' => Self::ALL.get(digit as usize - '1' as usize).copied(),
            _ => None,
        }
    }
}
