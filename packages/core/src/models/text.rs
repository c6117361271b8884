//! Inline Rich Text
//!
//! Block text is a sequence of runs, each carrying optional inline attributes
//! (bold, italic, strike, code, link). On the wire a text value may be either a
//! bare string or an array of runs; both deserialize into [`RichText`].

use serde::{Deserialize, Serialize};

/// Inline attributes attached to one text run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAttributes {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub strike: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl TextAttributes {
    pub fn is_plain(&self) -> bool {
        *self == TextAttributes::default()
    }
}

/// A contiguous piece of text sharing one set of attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub insert: String,

    #[serde(default, skip_serializing_if = "TextAttributes::is_plain")]
    pub attributes: TextAttributes,
}

impl TextRun {
    pub fn plain(insert: impl Into<String>) -> Self {
        Self {
            insert: insert.into(),
            attributes: TextAttributes::default(),
        }
    }

    pub fn styled(insert: impl Into<String>, attributes: TextAttributes) -> Self {
        Self {
            insert: insert.into(),
            attributes,
        }
    }

    fn to_markdown(&self) -> String {
        let attrs = &self.attributes;
        let mut out = if attrs.code {
            format!("`{}`", self.insert)
        } else {
            self.insert.clone()
        };
        if attrs.strike {
            out = format!("~~{out}~~");
        }
        if attrs.italic {
            out = format!("*{out}*");
        }
        if attrs.bold {
            out = format!("**{out}**");
        }
        if let Some(link) = &attrs.link {
            out = format!("[{out}]({link})");
        }
        out
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RichTextRepr {
    Plain(String),
    Runs(Vec<TextRun>),
}

impl From<RichTextRepr> for RichText {
    fn from(value: RichTextRepr) -> Self {
        match value {
            RichTextRepr::Plain(text) => RichText::plain(text),
            RichTextRepr::Runs(runs) => RichText::from_runs(runs),
        }
    }
}

/// Ordered inline runs making up a block's text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RichTextRepr", into = "Vec<TextRun>")]
pub struct RichText {
    runs: Vec<TextRun>,
}

impl From<RichText> for Vec<TextRun> {
    fn from(value: RichText) -> Self {
        value.runs
    }
}

impl RichText {
    /// Single unformatted run; an empty string yields empty text
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::default();
        }
        Self {
            runs: vec![TextRun::plain(text)],
        }
    }

    pub fn from_runs(runs: Vec<TextRun>) -> Self {
        Self {
            runs: runs.into_iter().filter(|r| !r.insert.is_empty()).collect(),
        }
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.insert.is_empty())
    }

    /// Concatenate runs, dropping all attributes
    pub fn to_plain_string(&self) -> String {
        self.runs.iter().map(|r| r.insert.as_str()).collect()
    }

    /// Render runs as inline Markdown (`**bold**`, `*italic*`, `~~strike~~`, `` `code` ``, links)
    pub fn to_markdown(&self) -> String {
        self.runs.iter().map(TextRun::to_markdown).collect()
    }
}
