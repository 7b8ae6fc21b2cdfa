use std::collections::HashSet;

use glossa_types::Term;
use serde::Deserialize;
use unicode_normalization::UnicodeNormalization;

use crate::error::LoadError;

#[derive(Debug, Deserialize)]
struct GlossaryJson {
    terms: Vec<serde_json::Value>,
}

/// Lenient view of one entry; everything is optional here
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawTerm {
    id: Option<serde_json::Value>,
    word: Option<String>,
    definition: Option<String>,
    image: Option<String>,
    link: Option<String>,
    enabled: Option<bool>,
    case_sensitive: Option<bool>,
}

/// Display text; normalized so equivalent definitions render alike
fn clean(text: &str) -> String {
    text.nfc().collect::<String>().trim().to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Decode a glossary document.
///
/// The document itself must be well formed; individual entries that are
/// not are skipped, and entries with missing fields degrade rather than fail.
pub fn parse_glossary(json: &str) -> Result<Vec<Term>, LoadError> {
    let data: GlossaryJson = serde_json::from_str(json)?;

    let mut seen = HashSet::new();
    let mut terms = Vec::with_capacity(data.terms.len());

    for (position, value) in data.terms.into_iter().enumerate() {
        let raw: RawTerm = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Skipping glossary entry {}: {}", position, e);
                continue;
            }
        };

        let id = match raw.id {
            Some(serde_json::Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => format!("term-{position}"),
        };

        if !seen.insert(id.clone()) {
            tracing::warn!("Duplicate glossary id '{}' at entry {}, keeping the first", id, position);
            continue;
        }

        // not normalized: matched literally against page text
        let word = raw.word.as_deref().unwrap_or_default().trim().to_string();
        if word.is_empty() {
            tracing::warn!("Glossary entry '{}' has no word", id);
        }

        terms.push(Term {
            id,
            word,
            definition: clean(raw.definition.as_deref().unwrap_or_default()),
            image: non_empty(raw.image),
            link: non_empty(raw.link),
            enabled: raw.enabled.unwrap_or(true),
            case_sensitive: raw.case_sensitive,
        });
    }

    tracing::debug!("Parsed {} glossary terms", terms.len());
    Ok(terms)
}
