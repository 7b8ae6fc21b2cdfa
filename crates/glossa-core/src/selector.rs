//! A small CSS selector subset for exclusion rules.
//!
//! Supported: type (`pre`), universal (`*`), class (`.a`), id (`#a`),
//! attribute presence and equality (`[data-x]`, `[lang="en"]`), compounds
//! of those, the descendant combinator and comma lists. Anything else is a
//! [`SelectorError`].

use glossa_types::NodeId;

use crate::dom::Document;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Unsupported selector syntax '{found}' in '{selector}'")]
    Unsupported { selector: String, found: char },

    #[error("Malformed selector: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return false;
        };

        if let Some(expected) = &self.tag
            && expected != tag
        {
            return false;
        }

        if let Some(expected) = &self.id
            && doc.attr(node, "id") != Some(expected.as_str())
        {
            return false;
        }

        if !self.classes.iter().all(|c| doc.has_class(node, c)) {
            return false;
        }

        self.attrs.iter().all(|(name, value)| match value {
            Some(value) => doc.attr(node, name) == Some(value.as_str()),
            None => doc.has_attr(node, name),
        })
    }
}

/// One comma-separated alternative: compounds joined by descendant combinators
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<Compound>,
}

impl Complex {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some((last, rest)) = self.parts.split_last() else {
            return false;
        };
        if !last.matches(doc, node) {
            return false;
        }

        // greedy walk up for the remaining compounds, right to left
        let mut remaining = rest.iter().rev().peekable();
        let mut current = doc.parent(node);
        while let Some(wanted) = remaining.peek() {
            let Some(ancestor) = current else {
                return false;
            };
            if wanted.matches(doc, ancestor) {
                remaining.next();
            }
            current = doc.parent(ancestor);
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let mut alternatives = Vec::new();

        for alternative in source.split(',') {
            let alternative = alternative.trim();
            if alternative.is_empty() {
                return Err(SelectorError::Empty);
            }
            let parts = alternative
                .split_whitespace()
                .map(|part| parse_compound(part, source))
                .collect::<Result<Vec<_>, _>>()?;
            alternatives.push(Complex { parts });
        }

        Ok(Self { alternatives })
    }

    /// Whether `node` itself matches
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(doc, node))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn parse_compound(part: &str, source: &str) -> Result<Compound, SelectorError> {
    let chars: Vec<char> = part.chars().collect();
    let mut pos = 0;
    let mut compound = Compound::default();

    if chars.first() == Some(&'*') {
        pos = 1;
    } else if chars.first().is_some_and(|c| is_ident_char(*c)) {
        compound.tag = Some(take_ident(&chars, &mut pos).to_ascii_lowercase());
    }

    while pos < chars.len() {
        match chars[pos] {
            '.' | '#' => {
                let sigil = chars[pos];
                pos += 1;
                let ident = take_ident(&chars, &mut pos);
                if ident.is_empty() {
                    return Err(SelectorError::Malformed(format!(
                        "expected a name after '{sigil}' in '{source}'"
                    )));
                }
                if sigil == '.' {
                    compound.classes.push(ident);
                } else {
                    compound.id = Some(ident);
                }
            }
            '[' => {
                let close = chars[pos..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|offset| pos + offset)
                    .ok_or_else(|| SelectorError::Malformed(format!("unclosed '[' in '{source}'")))?;
                let body: String = chars[pos + 1..close].iter().collect();
                compound.attrs.push(parse_attr(&body, source)?);
                pos = close + 1;
            }
            other => {
                return Err(SelectorError::Unsupported {
                    selector: source.to_string(),
                    found: other,
                });
            }
        }
    }

    Ok(compound)
}

fn parse_attr(body: &str, source: &str) -> Result<(String, Option<String>), SelectorError> {
    let (name, value) = match body.split_once('=') {
        Some((name, value)) => {
            let value = value.trim();
            let unquoted = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (name.trim(), Some(unquoted.to_string()))
        }
        None => (body.trim(), None),
    };

    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(SelectorError::Malformed(format!(
            "bad attribute name '{name}' in '{source}'"
        )));
    }

    Ok((name.to_string(), value))
}
