use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::images::ImageLibrary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Plain,
    Heading,
    ListItem,
    Quote,
    CodeHeader,
    Code,
    TableHeader,
    TableRow,
    Rule,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewLine {
    pub kind: LineKind,
    pub text: String,
}

impl PreviewLine {
    fn new(kind: LineKind, text: String) -> Self {
        Self { kind, text }
    }
}

pub fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Plain-text preview, one string per wrapped line.
pub fn render_preview_lines(markdown: &str, width: u16) -> Vec<String> {
    render_preview(markdown, width, &ImageLibrary::new())
        .into_iter()
        .map(|line| line.text)
        .collect()
}

/// Renders `markdown` into typed preview lines wrapped at `width` columns.
/// `upload:` image sources are looked up in `images`.
pub fn render_preview(markdown: &str, width: u16, images: &ImageLibrary) -> Vec<PreviewLine> {
    let mut renderer = Renderer::new(width, images);
    for event in Parser::new_ext(markdown, parser_options()) {
        renderer.event(event);
    }
    renderer.finish()
}

struct CodeBuf {
    language: String,
    text: String,
}

#[derive(Default)]
struct TableBuf {
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: String,
    header_rows: usize,
}

struct ImageBuf {
    src: String,
    alt: String,
}

struct Renderer<'a> {
    images: &'a ImageLibrary,
    max_width: usize,
    lines: Vec<PreviewLine>,
    current: String,
    kind: LineKind,
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    links: Vec<String>,
    code: Option<CodeBuf>,
    table: Option<TableBuf>,
    image: Option<ImageBuf>,
}

impl<'a> Renderer<'a> {
    fn new(width: u16, images: &'a ImageLibrary) -> Self {
        Self {
            images,
            max_width: width.max(8) as usize,
            lines: Vec::new(),
            current: String::new(),
            kind: LineKind::Plain,
            lists: Vec::new(),
            quote_depth: 0,
            links: Vec::new(),
            code: None,
            table: None,
            image: None,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush();
                self.begin_line(LineKind::Heading);
                self.current.push_str(heading_prefix(level));
            }
            Event::End(TagEnd::Heading(_)) | Event::End(TagEnd::Paragraph) => self.flush(),
            Event::Start(Tag::BlockQuote(_)) => {
                self.flush();
                self.quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            Event::Start(Tag::List(start)) => {
                self.flush();
                self.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.flush();
                self.lists.pop();
            }
            Event::Start(Tag::Item) => {
                self.flush();
                self.begin_line(LineKind::ListItem);
                let depth = self.lists.len().saturating_sub(1);
                self.current.push_str(&"  ".repeat(depth));
                let bullet = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let bullet = format!("{n}. ");
                        *n += 1;
                        bullet
                    }
                    _ => "- ".to_string(),
                };
                self.current.push_str(&bullet);
            }
            Event::End(TagEnd::Item) => self.flush(),
            Event::TaskListMarker(done) => {
                self.current.push_str(if done { "[x] " } else { "[ ] " });
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                self.flush();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or_default().to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                self.code = Some(CodeBuf {
                    language,
                    text: String::new(),
                });
            }
            Event::End(TagEnd::CodeBlock) => self.finish_code_block(),
            Event::Start(Tag::Table(_)) => {
                self.flush();
                self.table = Some(TableBuf::default());
            }
            Event::End(TagEnd::TableCell) => {
                if let Some(table) = &mut self.table {
                    let cell = std::mem::take(&mut table.cell);
                    table.row.push(cell.trim().to_string());
                }
            }
            Event::End(TagEnd::TableHead) => {
                if let Some(table) = &mut self.table {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                    table.header_rows += 1;
                }
            }
            Event::End(TagEnd::TableRow) => {
                if let Some(table) = &mut self.table {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            Event::End(TagEnd::Table) => self.finish_table(),
            Event::Start(Tag::Link { dest_url, .. }) => {
                self.links.push(dest_url.to_string());
            }
            Event::End(TagEnd::Link) => {
                if let Some(url) = self.links.pop()
                    && !self.current.ends_with(url.as_str())
                {
                    self.push_text(&format!(" <{url}>"));
                }
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                self.image = Some(ImageBuf {
                    src: dest_url.to_string(),
                    alt: String::new(),
                });
            }
            Event::End(TagEnd::Image) => self.finish_image(),
            Event::Start(Tag::Strikethrough) | Event::End(TagEnd::Strikethrough) => {
                self.push_text("~~");
            }
            Event::Code(code) => {
                self.push_text("`");
                self.push_text(&code);
                self.push_text("`");
            }
            Event::Text(text) => self.push_text(&text),
            Event::SoftBreak | Event::HardBreak => {
                if self.table.is_some() || self.image.is_some() {
                    self.push_text(" ");
                } else {
                    self.flush();
                }
            }
            Event::Rule => {
                self.flush();
                let rule = "─".repeat(self.max_width.min(40));
                self.lines.push(PreviewLine::new(LineKind::Rule, rule));
            }
            _ => {}
        }
    }

    fn begin_line(&mut self, kind: LineKind) {
        self.kind = kind;
    }

    fn push_text(&mut self, text: &str) {
        if let Some(code) = &mut self.code {
            code.text.push_str(text);
        } else if let Some(image) = &mut self.image {
            image.alt.push_str(text);
        } else if let Some(table) = &mut self.table {
            table.cell.push_str(text);
        } else {
            if self.current.is_empty() && self.quote_depth > 0 {
                self.kind = LineKind::Quote;
                self.current.push_str(&"> ".repeat(self.quote_depth));
            }
            self.current.push_str(text);
        }
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            self.kind = LineKind::Plain;
            return;
        }
        let kind = self.kind;
        for wrapped in wrap_line(&self.current, self.max_width) {
            self.lines.push(PreviewLine::new(kind, wrapped));
        }
        self.current.clear();
        self.kind = LineKind::Plain;
    }

    fn finish_code_block(&mut self) {
        let Some(code) = self.code.take() else {
            return;
        };
        if !code.language.is_empty() {
            self.lines.push(PreviewLine::new(
                LineKind::CodeHeader,
                format!("── {} ──", code.language),
            ));
        }
        let body = code.text.strip_suffix('\n').unwrap_or(&code.text);
        let code_lines: Vec<&str> = body.split('\n').collect();
        let gutter = code_lines.len().to_string().len();
        for (idx, line) in code_lines.iter().enumerate() {
            let numbered = format!("{:>gutter$} │ {line}", idx + 1);
            for wrapped in wrap_line(&numbered, self.max_width) {
                self.lines.push(PreviewLine::new(LineKind::Code, wrapped));
            }
        }
    }

    fn finish_table(&mut self) {
        let Some(table) = self.table.take() else {
            return;
        };
        let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![3usize; columns];
        for row in &table.rows {
            for (col, cell) in row.iter().enumerate() {
                widths[col] = widths[col].max(cell.chars().count());
            }
        }

        for (idx, row) in table.rows.iter().enumerate() {
            let cells: Vec<String> = (0..columns)
                .map(|col| {
                    let cell = row.get(col).map(String::as_str).unwrap_or_default();
                    let pad = widths[col] - cell.chars().count();
                    format!("{cell}{}", " ".repeat(pad))
                })
                .collect();
            let kind = if idx < table.header_rows {
                LineKind::TableHeader
            } else {
                LineKind::TableRow
            };
            self.lines
                .push(PreviewLine::new(kind, format!("| {} |", cells.join(" | "))));

            if idx + 1 == table.header_rows {
                let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
                self.lines.push(PreviewLine::new(
                    LineKind::TableHeader,
                    format!("|-{}-|", rule.join("-|-")),
                ));
            }
        }
    }

    fn finish_image(&mut self) {
        let Some(image) = self.image.take() else {
            return;
        };
        let label = if image.alt.is_empty() {
            image.src.as_str()
        } else {
            image.alt.as_str()
        };
        let text = match self.images.resolve(&image.src) {
            Some(stored) => format!("[image: {label} ({}, {} bytes)]", stored.mime, stored.byte_len),
            None if image.src.starts_with(crate::images::UPLOAD_SCHEME) => {
                format!("[image: {label} (missing upload)]")
            }
            None => format!("[image: {label} <{}>]", image.src),
        };
        self.flush();
        self.lines.push(PreviewLine::new(LineKind::Image, text));
    }

    fn finish(mut self) -> Vec<PreviewLine> {
        self.flush();
        if self.lines.is_empty() {
            self.lines.push(PreviewLine::new(LineKind::Plain, String::new()));
        }
        self.lines
    }
}

fn heading_prefix(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "# ",
        HeadingLevel::H2 => "## ",
        HeadingLevel::H3 => "### ",
        HeadingLevel::H4 => "#### ",
        HeadingLevel::H5 => "##### ",
        HeadingLevel::H6 => "###### ",
    }
}

fn wrap_line(input: &str, width: usize) -> Vec<String> {
    if input.chars().count() <= width {
        return vec![input.to_string()];
    }

    let mut chunks = Vec::new();
    let mut buf = String::new();
    let mut count = 0usize;

    for ch in input.chars() {
        buf.push(ch);
        count += 1;
        if count == width {
            chunks.push(std::mem::take(&mut buf));
            count = 0;
        }
    }

    if !buf.is_empty() {
        chunks.push(buf);
    }

    chunks
}
