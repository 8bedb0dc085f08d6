//! Minimal HCL document builder
//!
//! Enough of HCL to write `azurerm` resources: blocks with labels,
//! attributes, nested blocks and comments. Attribute runs are aligned on
//! `=` the way `terraform fmt` does.

use serde_json::Number;
use std::fmt::Write;

const INDENT: &str = "  ";

/// Attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Quoted string literal
    Str(String),
    /// Unquoted reference, e.g. `azurerm_resource_group.main.name`
    Ref(String),
    /// Number literal
    Number(Number),
    /// Boolean literal
    Bool(bool),
    /// Single-line list
    List(Vec<Expr>),
    /// Multi-line object
    Map(Vec<(String, Expr)>),
}

impl Expr {
    /// Reference expression
    #[inline]
    #[must_use]
    pub fn reference(path: impl Into<String>) -> Self {
        Self::Ref(path.into())
    }

    /// List of string literals
    #[must_use]
    pub fn strings<S: AsRef<str>>(items: &[S]) -> Self {
        Self::List(items.iter().map(|s| Self::Str(s.as_ref().to_string())).collect())
    }

    /// Whether this renders on one line
    fn is_inline(&self) -> bool {
        !matches!(self, Self::Map(entries) if !entries.is_empty())
    }

    fn write(&self, out: &mut String, depth: usize) {
        match self {
            Self::Str(s) => {
                out.push('"');
                out.push_str(&escape(s));
                out.push('"');
            }
            Self::Ref(path) => out.push_str(path),
            Self::Number(n) => {
                let _ = write!(out, "{n}");
            }
            Self::Bool(b) => {
                let _ = write!(out, "{b}");
            }
            Self::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write(out, depth);
                }
                out.push(']');
            }
            Self::Map(entries) if entries.is_empty() => out.push_str("{}"),
            Self::Map(entries) => {
                out.push_str("{\n");
                let keys: Vec<String> = entries.iter().map(|(k, _)| map_key(k)).collect();
                let width = keys.iter().map(String::len).max().unwrap_or(0);
                for (key, (_, value)) in keys.iter().zip(entries) {
                    push_indent(out, depth + 1);
                    let _ = write!(out, "{key:<width$} = ");
                    value.write(out, depth + 1);
                    out.push('\n');
                }
                push_indent(out, depth);
                out.push('}');
            }
        }
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u32> for Expr {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

/// Item inside a block body
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// `key = value`
    Attribute(String, Expr),
    /// Nested block
    Block(Block),
    /// `# text`
    Comment(String),
}

/// HCL block, e.g. `resource "azurerm_key_vault" "main" { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Block type keyword
    pub keyword: String,
    /// Quoted labels after the keyword
    pub labels: Vec<String>,
    /// Body in order
    pub entries: Vec<Entry>,
}

impl Block {
    /// Create block with no labels
    #[must_use]
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            labels: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// `resource "<terraform_type>" "<label>"`
    #[must_use]
    pub fn resource(terraform_type: &str, label: &str) -> Self {
        Self::new("resource").with_label(terraform_type).with_label(label)
    }

    /// With one more label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// With attribute
    #[inline]
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Expr>) -> Self {
        self.entries.push(Entry::Attribute(key.into(), value.into()));
        self
    }

    /// With attribute when `value` is present
    #[inline]
    #[must_use]
    pub fn opt_attr<V: Into<Expr>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.attr(key, value),
            None => self,
        }
    }

    /// With nested block
    #[inline]
    #[must_use]
    pub fn block(mut self, block: Block) -> Self {
        self.entries.push(Entry::Block(block));
        self
    }

    /// With comment line
    #[inline]
    #[must_use]
    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.entries.push(Entry::Comment(text.into()));
        self
    }

    /// Top-level attributes in order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Attribute(k, v) => Some((k.as_str(), v)),
            _ => None,
        })
    }

    /// Value of one top-level attribute
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Expr> {
        self.attributes().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Render as text, ending with a newline
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, 0);
        out
    }

    fn write(&self, out: &mut String, depth: usize) {
        push_indent(out, depth);
        out.push_str(&self.keyword);
        for label in &self.labels {
            let _ = write!(out, " \"{}\"", escape(label));
        }
        if self.entries.is_empty() {
            out.push_str(" {}\n");
            return;
        }
        out.push_str(" {\n");

        let mut index = 0;
        while index < self.entries.len() {
            match &self.entries[index] {
                Entry::Attribute(..) => {
                    let run_end = self.entries[index..]
                        .iter()
                        .position(|e| !matches!(e, Entry::Attribute(_, v) if v.is_inline()))
                        .map_or(self.entries.len(), |offset| index + offset.max(1));
                    let run = &self.entries[index..run_end];
                    let width = run
                        .iter()
                        .filter_map(|e| match e {
                            Entry::Attribute(k, _) => Some(k.len()),
                            _ => None,
                        })
                        .max()
                        .unwrap_or(0);
                    for entry in run {
                        if let Entry::Attribute(key, value) = entry {
                            push_indent(out, depth + 1);
                            let _ = write!(out, "{key:<width$} = ");
                            value.write(out, depth + 1);
                            out.push('\n');
                        }
                    }
                    index = run_end;
                }
                Entry::Block(block) => {
                    if index > 0 {
                        out.push('\n');
                    }
                    block.write(out, depth + 1);
                    index += 1;
                }
                Entry::Comment(text) => {
                    push_indent(out, depth + 1);
                    let _ = writeln!(out, "# {text}");
                    index += 1;
                }
            }
        }

        push_indent(out, depth);
        out.push_str("}\n");
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn map_key(key: &str) -> String {
    let mut chars = key.chars();
    let bare = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        key.to_string()
    } else {
        format!("\"{}\"", escape(key))
    }
}

/// Escape a string for use inside an HCL quoted literal
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            other => out.push(other),
        }
    }
    out
}

/// Reverse of [`escape`]
#[must_use]
pub fn unescape(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            },
            '$' | '%' if chars.peek() == Some(&c) => {
                let mut lookahead = chars.clone();
                lookahead.next();
                if lookahead.peek() == Some(&'{') {
                    chars.next();
                }
                out.push(c);
            }
            other => out.push(other),
        }
    }
    out
}
