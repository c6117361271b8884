//! Block tree → Markdown
//!
//! Renders the subtrees under a list of root ids. Container flavours (page,
//! surface, note) contribute only their children. Every block that cannot be
//! expressed in Markdown still leaves a trace in the output (a placeholder or
//! an approximation) and a warning, so nothing is dropped silently.

use crate::blocks::WarningLog;
use crate::models::{BlockId, BlockNode, Flavour, NodeTable};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Line starts that CommonMark would read as block syntax
static BLOCK_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:#{1,6}(?:\s|$)|[-+*](?:\s|$)|[><]|=+\s*$|```|~~~|(?:-\s*){3,}$|(?:\*\s*){3,}$|(?:_\s*){3,}$)")
        .unwrap()
});

/// `1.` / `1)` ordered-list markers
static ORDERED_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,9})[.)](?:\s|$)").unwrap());

/// Text that the importer would read as a task checkbox
static CHECKBOX_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[ xX]\](?:\s|$)").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderStats {
    pub block_count: usize,
    pub unsupported_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownExport {
    pub markdown: String,
    pub warnings: Vec<String>,
    pub lossy: bool,
    pub stats: RenderStats,
}

/// Marker family of a rendered list; a change of family starts a new list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListFamily {
    Bullet,
    Ordered,
}

/// One rendered block; consecutive chunks of one list family join without a blank line
struct Chunk {
    text: String,
    list: Option<ListFamily>,
}

fn join_chunks(chunks: &[Chunk]) -> String {
    let mut out = String::new();
    let mut previous: Option<Option<ListFamily>> = None;
    for chunk in chunks {
        match previous {
            None => {}
            Some(Some(family)) if chunk.list == Some(family) => out.push('\n'),
            Some(_) => out.push_str("\n\n"),
        }
        out.push_str(&chunk.text);
        previous = Some(chunk.list);
    }
    out
}

/// Backslash-escape a leading block marker so the line re-imports as text
fn escape_block_start(line: &str) -> String {
    let body = line.trim_start();
    let lead = &line[..line.len() - body.len()];
    if let Some(captures) = ORDERED_START_RE.captures(body) {
        let digits = captures.get(1).map_or("", |m| m.as_str());
        return format!("{lead}{digits}\\{}", &body[digits.len()..]);
    }
    if BLOCK_START_RE.is_match(body) {
        return format!("{lead}\\{body}");
    }
    line.to_string()
}

fn escape_lines(text: &str) -> String {
    text.lines()
        .map(escape_block_start)
        .collect::<Vec<_>>()
        .join("\n")
}

fn indent_lines(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn quote_lines(text: &str) -> String {
    if text.is_empty() {
        return ">".to_string();
    }
    text.lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Ids of a table axis (`rows` / `columns`) sorted by their order key
fn axis_ids(node: &BlockNode, key: &str) -> Vec<String> {
    let Some(Value::Object(entries)) = node.props.get(key) else {
        return Vec::new();
    };
    let mut axis: Vec<(String, String)> = entries
        .iter()
        .map(|(id, entry)| {
            let order = entry
                .get("order")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            (order, id.clone())
        })
        .collect();
    axis.sort();
    axis.into_iter().map(|(_, id)| id).collect()
}

struct Renderer<'a> {
    table: &'a NodeTable,
    visited: HashSet<&'a str>,
    warnings: WarningLog,
    stats: RenderStats,
}

impl<'a> Renderer<'a> {
    fn unsupported(&mut self, message: String) {
        self.stats.unsupported_count += 1;
        self.warnings.push(message);
    }

    /// Resolve `id`, guarding against missing nodes and revisits
    fn enter(&mut self, id: &'a str) -> Option<&'a BlockNode> {
        let Some(node) = self.table.get(id) else {
            self.unsupported(format!("Block '{id}' does not exist; skipped"));
            return None;
        };
        if !self.visited.insert(id) {
            self.warnings
                .push(format!("Block '{id}' is referenced more than once; rendered only the first time"));
            return None;
        }
        self.stats.block_count += 1;
        Some(node)
    }

    /// Render sibling ids in order, numbering runs of numbered list items
    fn render_sequence(&mut self, ids: &'a [BlockId], indent: usize, out: &mut Vec<Chunk>) {
        let mut ordinal = 0;
        for id in ids {
            let numbered = self.table.get(id).is_some_and(|c| {
                c.flavour == Flavour::List && c.block_type.as_deref() == Some("numbered")
            });
            ordinal = if numbered { ordinal + 1 } else { 0 };
            self.render(id, indent, ordinal, out);
        }
    }

    fn text(node: &BlockNode) -> String {
        node.text
            .as_ref()
            .map(|t| t.to_markdown())
            .unwrap_or_default()
    }

    fn render(&mut self, id: &'a str, indent: usize, ordinal: usize, out: &mut Vec<Chunk>) {
        let Some(node) = self.enter(id) else {
            return;
        };

        let own = match &node.flavour {
            Flavour::Page | Flavour::Surface | Flavour::Note => {
                self.render_sequence(&node.children, indent, out);
                return;
            }
            Flavour::List => {
                self.render_list_item(node, indent, ordinal, out);
                return;
            }
            Flavour::Paragraph => self.paragraph(node),
            Flavour::Code => {
                let language = node.prop_str("language").unwrap_or_default();
                let code = node.plain_text();
                Some(format!("```{language}\n{code}\n```"))
            }
            Flavour::Divider => Some("---".to_string()),
            Flavour::Callout => {
                self.warnings.push("Callout rendered as blockquote");
                Some(quote_lines(&escape_lines(&Self::text(node))))
            }
            Flavour::Latex => {
                let latex = node.prop_str("latex").unwrap_or_default();
                Some(format!("$$\n{latex}\n$$"))
            }
            Flavour::Bookmark | Flavour::Embed(_) => self.link_card(node),
            Flavour::Image => self.image(node),
            Flavour::Attachment => self.attachment(node),
            Flavour::Table => Some(self.table_block(node)),
            Flavour::Unknown(name) => {
                let name = name.clone();
                self.unsupported(format!("Unsupported flavour '{name}' rendered as placeholder"));
                Some(format!("<!-- unsupported flavour: {name} ({}) -->", node.id))
            }
        };

        if let Some(text) = own {
            out.push(Chunk {
                text: indent_lines(&text, &"  ".repeat(indent)),
                list: None,
            });
        }
        self.render_sequence(&node.children, indent, out);
    }

    fn paragraph(&mut self, node: &BlockNode) -> Option<String> {
        let text = Self::text(node);
        if let Some(level) = node.heading_level() {
            return Some(format!("{} {text}", "#".repeat(level as usize)));
        }
        if node.block_type.as_deref() == Some("quote") {
            return Some(quote_lines(&escape_lines(&text)));
        }
        (!text.is_empty()).then(|| escape_lines(&text))
    }

    fn render_list_item(
        &mut self,
        node: &'a BlockNode,
        indent: usize,
        ordinal: usize,
        out: &mut Vec<Chunk>,
    ) {
        let (marker, family) = match node.block_type.as_deref() {
            Some("numbered") => (format!("{}.", ordinal.max(1)), ListFamily::Ordered),
            Some("todo") if node.prop_bool("checked") == Some(true) => {
                ("- [x]".to_string(), ListFamily::Bullet)
            }
            Some("todo") => ("- [ ]".to_string(), ListFamily::Bullet),
            _ => ("-".to_string(), ListFamily::Bullet),
        };
        let prefix = "  ".repeat(indent);
        let continuation = " ".repeat(prefix.len() + marker.len() + 1);
        let mut text = escape_lines(&Self::text(node));
        if family == ListFamily::Bullet
            && node.block_type.as_deref() != Some("todo")
            && CHECKBOX_START_RE.is_match(&text)
        {
            text.insert(0, '\\');
        }
        let mut lines = text.lines();
        let first = lines.next().unwrap_or_default();
        let mut item = format!("{prefix}{marker} {first}").trim_end().to_string();
        for line in lines {
            item.push('\n');
            item.push_str(&continuation);
            item.push_str(line);
        }
        out.push(Chunk {
            text: item,
            list: Some(family),
        });

        let mut ordinal = 0;
        for child_id in &node.children {
            let child_is_list = self
                .table
                .get(child_id)
                .is_some_and(|c| c.flavour == Flavour::List);
            let numbered = child_is_list
                && self.table.get(child_id).and_then(|c| c.block_type.as_deref()) == Some("numbered");
            ordinal = if numbered { ordinal + 1 } else { 0 };

            let mut nested = Vec::new();
            let child_indent = if child_is_list { indent + 1 } else { indent };
            self.render(child_id, child_indent, ordinal, &mut nested);
            out.extend(nested.into_iter().map(|chunk| Chunk {
                list: Some(family),
                ..chunk
            }));
        }
    }

    fn link_card(&mut self, node: &BlockNode) -> Option<String> {
        let url = node.prop_str("url").unwrap_or_default();
        if url.is_empty() {
            self.unsupported(format!("{} '{}' has no url; skipped", node.flavour, node.id));
            return None;
        }
        let text = node.plain_text();
        let label = node
            .prop_str("caption")
            .filter(|c| !c.is_empty())
            .or_else(|| (!text.is_empty()).then_some(text.as_str()))
            .unwrap_or(url);
        Some(format!("[{label}]({url})"))
    }

    fn image(&mut self, node: &BlockNode) -> Option<String> {
        let source = node.prop_str("sourceId").unwrap_or_default();
        if source.is_empty() {
            self.unsupported(format!("Image '{}' has no source; skipped", node.id));
            return None;
        }
        let caption = node.prop_str("caption").unwrap_or_default();
        Some(format!("![{caption}](blob://{source})"))
    }

    fn attachment(&mut self, node: &BlockNode) -> Option<String> {
        let source = node.prop_str("sourceId").unwrap_or_default();
        if source.is_empty() {
            self.unsupported(format!("Attachment '{}' has no source; skipped", node.id));
            return None;
        }
        let name = node
            .prop_str("name")
            .filter(|n| !n.is_empty())
            .unwrap_or(source);
        Some(format!("[{name}](blob://{source})"))
    }

    fn table_block(&mut self, node: &BlockNode) -> String {
        let rows = axis_ids(node, "rows");
        let columns = axis_ids(node, "columns");
        let cells = node.props.get("cells").and_then(Value::as_object);

        if rows.is_empty() || columns.is_empty() || cells.map_or(true, |c| c.is_empty()) {
            self.warnings
                .push(format!("Table '{}' has no cells; rendered an empty placeholder", node.id));
            return "|  |\n| --- |".to_string();
        }

        let cell = |row: &str, column: &str| {
            cells
                .and_then(|c| c.get(&format!("{row}:{column}")))
                .and_then(|c| c.get("text"))
                .and_then(Value::as_str)
                .map(escape_cell)
                .unwrap_or_default()
        };
        let line = |row: &str| {
            let values: Vec<String> = columns
                .iter()
                .map(|column| cell(row, column.as_str()))
                .collect();
            format!("| {} |", values.join(" | "))
        };

        let mut lines = vec![line(rows[0].as_str())];
        lines.push(format!("|{}", " --- |".repeat(columns.len())));
        lines.extend(rows[1..].iter().map(|row| line(row.as_str())));
        lines.join("\n")
    }
}

/// Render the subtrees under `root_ids` as Markdown
pub fn export_markdown(table: &NodeTable, root_ids: &[BlockId]) -> MarkdownExport {
    let mut renderer = Renderer {
        table,
        visited: HashSet::new(),
        warnings: WarningLog::new(),
        stats: RenderStats::default(),
    };

    let mut chunks = Vec::new();
    renderer.render_sequence(root_ids, 0, &mut chunks);

    let mut markdown = join_chunks(&chunks);
    if !markdown.is_empty() {
        markdown.push('\n');
    }
    let warnings = renderer.warnings.into_vec();
    MarkdownExport {
        markdown,
        lossy: !warnings.is_empty(),
        warnings,
        stats: renderer.stats,
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;
