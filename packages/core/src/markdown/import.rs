//! Markdown → block operations
//!
//! Walks the CommonMark event stream (tables, strikethrough and task lists
//! enabled) and emits one `AppendBlockParams` per recognized block, in
//! document order.
//! Inline formatting is flattened to plain strings. Anything that cannot be
//! represented faithfully is still imported on a best-effort basis and
//! recorded as a warning, which makes the import `lossy`.

use crate::blocks::validate::MAX_TABLE_DIMENSION;
use crate::blocks::WarningLog;
use crate::models::{AppendBlockParams, ListStyle};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    pub input_chars: usize,
    pub block_count: usize,
    pub unsupported_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownImport {
    pub operations: Vec<AppendBlockParams>,
    pub warnings: Vec<String>,
    pub lossy: bool,
    pub stats: ImportStats,
}

/// What a paragraph consists of, to detect lone links and images
#[derive(Debug, Default)]
struct ParagraphShape {
    media: usize,
    images: usize,
    stray_text: bool,
    depth: usize,
    lone: Option<Lone>,
}

#[derive(Debug)]
enum Lone {
    Link { url: String, start: usize, label: String },
    Image { url: String, start: usize, alt: String },
}

impl ParagraphShape {
    fn saw_text(&mut self, text: &str) {
        if self.depth == 0 && !text.trim().is_empty() {
            self.stray_text = true;
        }
    }

    fn open(&mut self, lone: Lone) {
        self.media += 1;
        if matches!(lone, Lone::Image { .. }) {
            self.images += 1;
        }
        self.depth += 1;
        if self.media == 1 {
            self.lone = Some(lone);
        }
    }

    fn close(&mut self, buffer: &str) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth > 0 {
            return;
        }
        match &mut self.lone {
            Some(Lone::Link { start, label, .. }) => *label = buffer[*start..].trim().to_string(),
            Some(Lone::Image { start, alt, .. }) => *alt = buffer[*start..].trim().to_string(),
            None => {}
        }
    }

    fn lone(self) -> Option<Lone> {
        (self.media == 1 && !self.stray_text).then_some(self.lone).flatten()
    }
}

#[derive(Debug)]
enum Frame {
    Paragraph(ParagraphShape),
    Heading(u8),
    Code { language: String },
    Quote { parts: Vec<String> },
    List { ordered: bool },
    Item {
        style: ListStyle,
        /// Set by a task-list marker (`[ ]` / `[x]`)
        checked: Option<bool>,
        parts: Vec<String>,
    },
    Table { rows: Vec<Vec<String>> },
    Row(Vec<String>),
    Cell,
    Html,
}

impl Frame {
    fn describe(&self) -> &'static str {
        match self {
            Frame::Paragraph(_) => "paragraph",
            Frame::Heading(_) => "heading",
            Frame::Code { .. } => "code block",
            Frame::Quote { .. } => "blockquote",
            Frame::List { .. } | Frame::Item { .. } => "list",
            Frame::Table { .. } | Frame::Row(_) | Frame::Cell => "table",
            Frame::Html => "HTML block",
        }
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[derive(Default)]
struct Importer {
    ops: Vec<AppendBlockParams>,
    warnings: WarningLog,
    unsupported: usize,
    stack: Vec<Frame>,
    buffer: String,
}

impl Importer {
    fn take_buffer(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    /// Index of the nearest enclosing quote or list item
    fn container(&self) -> Option<usize> {
        self.stack
            .iter()
            .rposition(|f| matches!(f, Frame::Quote { .. } | Frame::Item { .. }))
    }

    fn in_quote(&self) -> bool {
        self.stack.iter().any(|f| matches!(f, Frame::Quote { .. }))
    }

    /// Hand `text` to the enclosing quote/item; returns false at top level
    fn absorb(&mut self, text: String) -> bool {
        let Some(index) = self.container() else {
            return false;
        };
        if text.trim().is_empty() {
            return true;
        }
        match &mut self.stack[index] {
            Frame::Quote { parts } | Frame::Item { parts, .. } => parts.push(text),
            _ => {}
        }
        true
    }

    /// Move tight list-item text sitting in the buffer into the item
    fn flush_item_text(&mut self) {
        if matches!(self.stack.last(), Some(Frame::Item { .. })) {
            let text = self.take_buffer();
            let text = text.trim();
            if let Some(Frame::Item { parts, .. }) = self.stack.last_mut() {
                if !text.is_empty() {
                    parts.push(text.to_string());
                }
            }
        }
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message);
    }

    fn list_op(style: ListStyle, checked: Option<bool>, text: String) -> AppendBlockParams {
        match checked {
            Some(checked) => AppendBlockParams::of_type("list")
                .with_style(ListStyle::Todo)
                .with_checked(checked)
                .with_text(text),
            None => AppendBlockParams::of_type("list")
                .with_style(style)
                .with_text(text),
        }
    }

    /// Emit the list item at `index` with the text gathered so far
    fn emit_item(&mut self, index: usize) {
        let (style, checked, text) = match &mut self.stack[index] {
            Frame::Item {
                style,
                checked,
                parts,
            } if !parts.is_empty() => (*style, *checked, std::mem::take(parts).join("\n")),
            _ => return,
        };
        let quote = self.stack[..index]
            .iter()
            .rposition(|f| matches!(f, Frame::Quote { .. }));
        match quote.map(|q| &mut self.stack[q]) {
            Some(Frame::Quote { parts }) => {
                let marker = match checked {
                    Some(true) => "- [x]",
                    Some(false) => "- [ ]",
                    None => "-",
                };
                parts.push(format!("{marker} {text}"));
            }
            _ => self.ops.push(Self::list_op(style, checked, text)),
        }
    }

    fn start(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph => {
                self.flush_item_text();
                self.stack.push(Frame::Paragraph(ParagraphShape::default()));
            }
            Tag::Heading { level, .. } => {
                self.flush_item_text();
                self.stack.push(Frame::Heading(heading_level(level)));
            }
            Tag::BlockQuote { .. } => {
                self.flush_item_text();
                self.stack.push(Frame::Quote { parts: Vec::new() });
            }
            Tag::CodeBlock(kind) => {
                self.flush_item_text();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .unwrap_or_default()
                        .to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.stack.push(Frame::Code { language });
            }
            Tag::List(start) => {
                self.flush_item_text();
                if let Some(item) = self
                    .stack
                    .iter()
                    .rposition(|f| matches!(f, Frame::Item { .. }))
                {
                    self.emit_item(item);
                    self.warn("Nested list flattened into sibling items; nesting depth was not preserved");
                }
                self.stack.push(Frame::List {
                    ordered: start.is_some(),
                });
            }
            Tag::Item => {
                let ordered = self.stack.iter().rev().find_map(|f| match f {
                    Frame::List { ordered } => Some(*ordered),
                    _ => None,
                });
                let style = if ordered == Some(true) {
                    ListStyle::Numbered
                } else {
                    ListStyle::Bulleted
                };
                self.stack.push(Frame::Item {
                    style,
                    checked: None,
                    parts: Vec::new(),
                });
            }
            Tag::Table(_) => self.stack.push(Frame::Table { rows: Vec::new() }),
            Tag::TableHead | Tag::TableRow => self.stack.push(Frame::Row(Vec::new())),
            Tag::TableCell => {
                self.buffer.clear();
                self.stack.push(Frame::Cell);
            }
            Tag::HtmlBlock => {
                self.flush_item_text();
                self.stack.push(Frame::Html);
            }
            Tag::Link { dest_url, .. } => {
                let start = self.buffer.len();
                if let Some(Frame::Paragraph(shape)) = self.stack.last_mut() {
                    shape.open(Lone::Link {
                        url: dest_url.to_string(),
                        start,
                        label: String::new(),
                    });
                }
            }
            Tag::Image { dest_url, .. } => {
                let start = self.buffer.len();
                match self.stack.last_mut() {
                    Some(Frame::Paragraph(shape)) => shape.open(Lone::Image {
                        url: dest_url.to_string(),
                        start,
                        alt: String::new(),
                    }),
                    _ => self.warn("Inline image reduced to its alt text"),
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                let Some(Frame::Paragraph(shape)) = self.stack.pop() else {
                    return;
                };
                let text = self.take_buffer().trim().to_string();
                self.finish_paragraph(shape, text);
            }
            TagEnd::Heading(_) => {
                let Some(Frame::Heading(level)) = self.stack.pop() else {
                    return;
                };
                let text = self.take_buffer().trim().to_string();
                if !self.absorb(text.clone()) {
                    self.ops.push(
                        AppendBlockParams::of_type("heading")
                            .with_level(level)
                            .with_text(text),
                    );
                }
            }
            TagEnd::CodeBlock => {
                let Some(Frame::Code { language }) = self.stack.pop() else {
                    return;
                };
                let code = self.take_buffer();
                let code = code.strip_suffix('\n').unwrap_or(&code).to_string();
                if self.in_quote() {
                    self.absorb(format!("```{language}\n{code}\n```"));
                    return;
                }
                if let Some(item) = self.container() {
                    self.emit_item(item);
                    self.warn("Code block inside a list item imported after the item");
                }
                let mut op = AppendBlockParams::of_type("code").with_text(code);
                if !language.is_empty() {
                    op = op.with_language(language);
                }
                self.ops.push(op);
            }
            TagEnd::BlockQuote { .. } => {
                let Some(Frame::Quote { parts }) = self.stack.pop() else {
                    return;
                };
                let text = parts.join("\n");
                if !self.absorb(text.clone()) && !text.trim().is_empty() {
                    self.ops.push(AppendBlockParams::of_type("quote").with_text(text));
                }
            }
            TagEnd::List(_) => {
                self.stack.pop();
            }
            TagEnd::Item => {
                self.flush_item_text();
                if let Some(index) = self
                    .stack
                    .iter()
                    .rposition(|f| matches!(f, Frame::Item { .. }))
                {
                    self.emit_item(index);
                }
                self.stack.pop();
            }
            TagEnd::TableCell => {
                self.stack.pop();
                let text = self.take_buffer().trim().to_string();
                if let Some(Frame::Row(cells)) = self.stack.last_mut() {
                    cells.push(text);
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                let Some(Frame::Row(cells)) = self.stack.pop() else {
                    return;
                };
                if let Some(Frame::Table { rows }) = self.stack.last_mut() {
                    rows.push(cells);
                }
            }
            TagEnd::Table => {
                let Some(Frame::Table { mut rows }) = self.stack.pop() else {
                    return;
                };
                let limit = MAX_TABLE_DIMENSION as usize;
                let widest = rows.iter().map(Vec::len).max().unwrap_or(0);
                if rows.len() > limit || widest > limit {
                    self.unsupported += 1;
                    self.warn(format!(
                        "Table of {} rows and {widest} columns truncated to {limit}x{limit}",
                        rows.len()
                    ));
                    rows.truncate(limit);
                }
                let columns = widest.min(limit);
                for row in &mut rows {
                    row.resize(columns, String::new());
                }
                if rows.is_empty() || columns == 0 {
                    self.warn("Empty table skipped");
                    return;
                }
                if self.container().is_some() {
                    let text = rows
                        .iter()
                        .map(|r| r.join(" | "))
                        .collect::<Vec<_>>()
                        .join("\n");
                    self.absorb(text);
                    self.warn("Table inside a quote or list item imported as plain text");
                    return;
                }
                self.ops
                    .push(AppendBlockParams::of_type("table").with_table(rows));
            }
            TagEnd::HtmlBlock => {
                self.stack.pop();
                let html = self.take_buffer().trim_end().to_string();
                self.unsupported += 1;
                self.warn("Raw HTML block imported as plain text");
                if !self.absorb(html.clone()) && !html.is_empty() {
                    self.ops
                        .push(AppendBlockParams::of_type("paragraph").with_text(html));
                }
            }
            TagEnd::Link | TagEnd::Image => {
                let buffer = &self.buffer;
                if let Some(Frame::Paragraph(shape)) = self.stack.last_mut() {
                    shape.close(buffer);
                }
            }
            _ => {}
        }
    }

    fn finish_paragraph(&mut self, shape: ParagraphShape, text: String) {
        let nested = self.container().is_some();
        let images = shape.images;
        match shape.lone() {
            Some(Lone::Link { url, label, .. }) if !nested => {
                let mut op = AppendBlockParams::of_type("bookmark").with_url(url.clone());
                if !label.is_empty() && label != url {
                    op = op.with_caption(label);
                }
                self.ops.push(op);
            }
            Some(Lone::Image { url, alt, .. }) if !nested => {
                self.unsupported += 1;
                self.warn("Image imported as bookmark; image blobs are not uploaded");
                let mut op = AppendBlockParams::of_type("bookmark").with_url(url);
                if !alt.is_empty() {
                    op = op.with_caption(alt);
                }
                self.ops.push(op);
            }
            _ => {
                if images > 0 {
                    self.unsupported += images;
                    self.warn("Inline image reduced to its alt text");
                }
                if !self.absorb(text.clone()) && !text.is_empty() {
                    self.ops
                        .push(AppendBlockParams::of_type("paragraph").with_text(text));
                }
            }
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(Frame::Paragraph(shape)) = self.stack.last_mut() {
            shape.saw_text(text);
        }
        self.buffer.push_str(text);
    }

    fn event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) | Event::Code(text) => self.text(&text),
            Event::SoftBreak | Event::HardBreak => self.buffer.push('\n'),
            Event::TaskListMarker(done) => {
                if let Some(Frame::Item { checked, .. }) = self
                    .stack
                    .iter_mut()
                    .rev()
                    .find(|f| matches!(f, Frame::Item { .. }))
                {
                    *checked = Some(done);
                }
            }
            Event::Html(html) => {
                if !matches!(self.stack.last(), Some(Frame::Html)) {
                    self.unsupported += 1;
                    self.warn("Raw HTML block imported as plain text");
                }
                self.buffer.push_str(&html);
            }
            Event::InlineHtml(html) => {
                self.unsupported += 1;
                self.warn("Inline HTML preserved as text");
                self.text(&html);
            }
            Event::Rule => {
                if self.in_quote() {
                    self.absorb("---".to_string());
                } else {
                    if let Some(item) = self.container() {
                        self.emit_item(item);
                    }
                    self.ops.push(AppendBlockParams::of_type("divider"));
                }
            }
            _ => {}
        }
    }

    fn finish(mut self, markdown: &str) -> MarkdownImport {
        while let Some(frame) = self.stack.pop() {
            self.unsupported += 1;
            self.warnings
                .push(format!("Unterminated {} skipped", frame.describe()));
        }

        let warnings = self.warnings.into_vec();
        MarkdownImport {
            stats: ImportStats {
                input_chars: markdown.chars().count(),
                block_count: self.ops.len(),
                unsupported_count: self.unsupported,
            },
            lossy: !warnings.is_empty(),
            operations: self.ops,
            warnings,
        }
    }
}

/// Parse Markdown into ordered block-creation operations
///
/// # Examples
///
/// ```
/// use blockdoc_core::markdown::import_markdown;
///
/// let import = import_markdown("# Title\n\n- [x] done\n");
/// assert_eq!(import.operations.len(), 2);
/// assert_eq!(import.operations[1].style.as_deref(), Some("todo"));
/// assert!(!import.lossy);
/// ```
pub fn import_markdown(markdown: &str) -> MarkdownImport {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut importer = Importer::default();
    for event in Parser::new_ext(markdown, options) {
        importer.event(event);
    }
    importer.finish(markdown)
}

#[cfg(test)]
#[path = "import_test.rs"]
mod import_test;
