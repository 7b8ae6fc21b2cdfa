mod error;
mod parse;
mod source;

pub use error::LoadError;
pub use parse::parse_glossary;
pub use source::{FileSource, GlossarySource, HttpSource, StaticSource, source_for};

use glossa_types::Term;

/// Fetch and decode the glossary behind `source`
pub async fn load(source: &dyn GlossarySource) -> Result<Vec<Term>, LoadError> {
    tracing::info!("Loading glossary from {}", source.describe());
    let json = source.fetch().await?;
    let terms = parse_glossary(&json)?;
    tracing::info!("Loaded {} glossary terms", terms.len());
    Ok(terms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_static() {
        let source = StaticSource::new(r#"{"terms": [{"id": "1", "word": "API", "definition": "d"}]}"#);
        let terms = load(&source).await.unwrap();
        assert_eq!(terms.len(), 1);
    }

    #[tokio::test]
    async fn test_load_file() {
        let path = std::env::temp_dir().join(format!("glossa-load-{}.json", std::process::id()));
        tokio::fs::write(&path, r#"{"terms": []}"#).await.unwrap();
        let terms = load(&FileSource::new(&path)).await.unwrap();
        assert!(terms.is_empty());
        tokio::fs::remove_file(&path).await.unwrap();
    }
}
