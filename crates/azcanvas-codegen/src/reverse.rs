//! Read generated documents back
//!
//! Not a general HCL parser. It understands what the assembler writes:
//! top-level `resource`/`module`/`data` blocks with one attribute per line.
//! Only literal values (strings, numbers, booleans) at the first level of a
//! block are captured; references, lists, maps and nested blocks are
//! skipped.

use crate::error::CodegenError;
use crate::hcl::unescape;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(resource|module|data)((?:\s+"(?:[^"\\]|\\.)*")+)\s*\{\s*$"#)
        .expect("literal pattern compiles")
});

static LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)""#).expect("literal pattern compiles"));

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_-]*)\s*=\s*(.*?)\s*$").expect("literal pattern compiles")
});

/// Top-level block keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `resource "<type>" "<label>"`
    Resource,
    /// `module "<label>"`
    Module,
    /// `data "<type>" "<label>"`
    Data,
}

/// One top-level block read back from text
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBlock {
    /// Keyword
    pub kind: BlockKind,
    /// Resource or data type; `None` for modules
    pub terraform_type: Option<String>,
    /// Local name
    pub label: String,
    /// Literal first-level attributes in document order
    pub attributes: IndexMap<String, Value>,
    /// 1-based line of the header
    pub line: usize,
}

impl ParsedBlock {
    /// String attribute
    #[must_use]
    pub fn str_attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }
}

/// Parse every top-level `resource`, `module` and `data` block
///
/// Other top-level blocks (`terraform`, `provider`, ...) are skipped.
///
/// # Errors
/// [`CodegenError::Parse`] on unbalanced braces or a malformed block header
pub fn parse_document(text: &str) -> Result<Vec<ParsedBlock>, CodegenError> {
    let mut blocks = Vec::new();
    let mut current: Option<ParsedBlock> = None;
    let mut depth: usize = 0;

    for (index, line) in text.lines().enumerate() {
        let number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
            continue;
        }

        if depth == 0 {
            current = parse_header(trimmed, number)?;
        } else if depth == 1 {
            if let Some(block) = current.as_mut() {
                if let Some((key, value)) = parse_attribute(trimmed) {
                    block.attributes.insert(key, value);
                }
            }
        }

        let (opened, closed) = count_braces(trimmed);
        depth = (depth + opened).checked_sub(closed).ok_or(CodegenError::Parse {
            line: number,
            reason: "unexpected '}'".to_string(),
        })?;

        if depth == 0 {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
        }
    }

    if depth != 0 {
        return Err(CodegenError::Parse {
            line: text.lines().count(),
            reason: format!("{depth} unclosed block(s) at end of document"),
        });
    }
    Ok(blocks)
}

fn parse_header(line: &str, number: usize) -> Result<Option<ParsedBlock>, CodegenError> {
    let keyword = line.split_whitespace().next().unwrap_or_default();
    let kind = match keyword {
        "resource" => BlockKind::Resource,
        "module" => BlockKind::Module,
        "data" => BlockKind::Data,
        _ => return Ok(None),
    };
    let malformed = || CodegenError::Parse {
        line: number,
        reason: format!("malformed {keyword} header"),
    };

    let captures = HEADER.captures(line).ok_or_else(malformed)?;
    let mut labels: Vec<String> = LABEL
        .captures_iter(&captures[2])
        .map(|c| unescape(&c[1]))
        .collect();

    let (terraform_type, label) = match (kind, labels.len()) {
        (BlockKind::Module, 1) => (None, labels.remove(0)),
        (BlockKind::Resource | BlockKind::Data, 2) => {
            let label = labels.remove(1);
            (Some(labels.remove(0)), label)
        }
        _ => return Err(malformed()),
    };

    Ok(Some(ParsedBlock {
        kind,
        terraform_type,
        label,
        attributes: IndexMap::new(),
        line: number,
    }))
}

fn parse_attribute(line: &str) -> Option<(String, Value)> {
    let captures = ATTRIBUTE.captures(line)?;
    let raw = captures.get(2)?.as_str();
    let value = literal(raw)?;
    Some((captures[1].to_string(), value))
}

fn literal(raw: &str) -> Option<Value> {
    match raw {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        _ => {}
    }
    if let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
        return closes_at_end(raw).then(|| Value::String(unescape(inner)));
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Some(Value::Number(n.into()));
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Value::Number(n.into()));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

/// Whether the opening quote of `raw` is closed by its final character
fn closes_at_end(raw: &str) -> bool {
    let mut escaped = false;
    for (i, c) in raw.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return i == raw.len() - 1,
            _ => {}
        }
    }
    false
}

/// `{` and `}` outside string literals and trailing comments
fn count_braces(line: &str) -> (usize, usize) {
    let (mut opened, mut closed) = (0, 0);
    let mut in_string = false;
    let mut escaped = false;
    for c in line.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '#' => break,
            '{' => opened += 1,
            '}' => closed += 1,
            _ => {}
        }
    }
    (opened, closed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const DOC: &str = r#"
terraform {
  required_providers {
    azurerm = {
      source  = "hashicorp/azurerm"
      version = "~> 3.0"
    }
  }
}

resource "azurerm_storage_account" "st" {
  name                     = "stprojdev01"
  resource_group_name      = azurerm_resource_group.rg.name
  account_tier             = "Standard"
  https_traffic_only_enabled = true
  tags = {
    note = "has { brace"
  }
}

module "kv" {
  source   = "git::https://example.com/modules.git//key_vault?ref=v1"
  retention = 90
}
"#;

    #[test]
    fn reads_resource_and_module_blocks() {
        let blocks = parse_document(DOC).unwrap();
        assert_eq!(blocks.len(), 2);

        let st = &blocks[0];
        assert_eq!(st.kind, BlockKind::Resource);
        assert_eq!(st.terraform_type.as_deref(), Some("azurerm_storage_account"));
        assert_eq!(st.label, "st");
        assert_eq!(st.str_attr("name"), Some("stprojdev01"));
        assert_eq!(st.attributes.get("https_traffic_only_enabled"), Some(&json!(true)));
        assert!(!st.attributes.contains_key("resource_group_name"));
        assert!(!st.attributes.contains_key("note"));

        let kv = &blocks[1];
        assert_eq!(kv.kind, BlockKind::Module);
        assert_eq!(kv.terraform_type, None);
        assert_eq!(kv.attributes.get("retention"), Some(&json!(90)));
    }

    #[test]
    fn unescapes_string_literals() {
        let doc = "resource \"x\" \"y\" {\n  a = \"say \\\"hi\\\" $${v}\"\n}\n";
        let blocks = parse_document(doc).unwrap();
        assert_eq!(blocks[0].str_attr("a"), Some("say \"hi\" ${v}"));
    }

    #[test]
    fn unbalanced_document_is_an_error() {
        let err = parse_document("resource \"a\" \"b\" {\n  x = 1\n").unwrap_err();
        assert!(matches!(err, CodegenError::Parse { .. }));

        let err = parse_document("}\n").unwrap_err();
        assert!(matches!(err, CodegenError::Parse { line: 1, .. }));
    }

    #[test]
    fn resource_header_needs_two_labels() {
        assert!(parse_document("resource \"only_one\" {\n}\n").is_err());
    }

    #[test]
    fn non_literal_values_are_skipped() {
        assert_eq!(literal("azurerm_resource_group.rg.name"), None);
        assert_eq!(literal(r#"["a", "b"]"#), None);
        assert_eq!(literal(r#""a" "b""#), None);
        assert_eq!(literal("-3"), Some(json!(-3)));
        assert_eq!(literal("1.5"), Some(json!(1.5)));
    }
}
