//! The typed XML form of a record:
//! `<memory type="T" domain="D"> <what/> [<when/>] [<do/>] [<warn/>] </memory>`.
//!
//! The wire format escapes exactly `&`, `<`, `>` — nothing else — so the
//! codec is hand-rolled rather than delegated to a general XML writer.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::types::{MemoryType, StructureField};

/// Parsed structured memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredMemory {
    pub memory_type: MemoryType,
    pub domain: String,
    pub what: Option<String>,
    pub when: Option<String>,
    pub do_: Option<String>,
    pub warn: Option<String>,
}

impl StructuredMemory {
    pub fn new(memory_type: MemoryType, domain: impl Into<String>) -> Self {
        Self {
            memory_type,
            domain: domain.into(),
            what: None,
            when: None,
            do_: None,
            warn: None,
        }
    }

    fn field(&self, f: StructureField) -> Option<&str> {
        match f {
            StructureField::What => self.what.as_deref(),
            StructureField::When => self.when.as_deref(),
            StructureField::Do => self.do_.as_deref(),
            StructureField::Warn => self.warn.as_deref(),
        }
    }

    /// Render to the wire form. Only fields in the type's subset are
    /// emitted, and only when present.
    pub fn render(&self) -> String {
        let mut out = format!(
            "<memory type=\"{}\" domain=\"{}\">",
            self.memory_type.as_str(),
            escape(&self.domain)
        );
        for f in self.memory_type.structure_fields() {
            if let Some(text) = self.field(*f) {
                let tag = field_tag(*f);
                out.push_str(&format!("<{tag}>{}</{tag}>", escape(text)));
            }
        }
        out.push_str("</memory>");
        out
    }

    /// Parse the wire form. Tolerates whitespace between elements and
    /// fields outside the type subset (they are kept; the subset only
    /// constrains what the structurer produces).
    pub fn parse(xml: &str) -> Result<Self, String> {
        let trimmed = xml.trim();
        let open_end = trimmed
            .find('>')
            .ok_or_else(|| "missing <memory> element".to_string())?;
        let open_tag = &trimmed[..open_end];
        if !open_tag.starts_with("<memory") {
            return Err("missing <memory> element".to_string());
        }
        if !trimmed.ends_with("</memory>") {
            return Err("missing </memory> close".to_string());
        }

        let memory_type = attr(open_tag, "type")
            .ok_or_else(|| "missing type attribute".to_string())
            .and_then(|v| MemoryType::from_str(&v))?;
        let domain = attr(open_tag, "domain").ok_or_else(|| "missing domain attribute".to_string())?;

        let body = &trimmed[open_end + 1..trimmed.len() - "</memory>".len()];
        let mut parsed = Self::new(memory_type, unescape(&domain));
        parsed.what = element(body, "what").map(|s| unescape(&s));
        parsed.when = element(body, "when").map(|s| unescape(&s));
        parsed.do_ = element(body, "do").map(|s| unescape(&s));
        parsed.warn = element(body, "warn").map(|s| unescape(&s));

        if parsed.what.is_none() {
            return Err("structured memory has no <what> element".to_string());
        }
        Ok(parsed)
    }
}

fn field_tag(f: StructureField) -> &'static str {
    match f {
        StructureField::What => "what",
        StructureField::When => "when",
        StructureField::Do => "do",
        StructureField::Warn => "warn",
    }
}

/// Escape `&`, `<`, `>` — the only entities in this wire format.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Inverse of [`escape`]. `&amp;` last so it does not re-introduce entities.
pub fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Extract an attribute value from an open tag like `<memory type="fact" …`.
fn attr(open_tag: &str, name: &str) -> Option<String> {
    let needle = format!("{name}=\"");
    let start = open_tag.find(&needle)? + needle.len();
    let rest = &open_tag[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

/// Extract the inner text of `<tag>…</tag>` in `body`, if present.
fn element(body: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(body[start..end].to_string())
}
