use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::LoadError;

/// Somewhere the glossary JSON can be read from
#[async_trait]
pub trait GlossarySource: Send + Sync {
    /// Raw JSON body
    async fn fetch(&self) -> Result<String, LoadError>;

    /// Human readable location, for logs
    fn describe(&self) -> String;
}

#[derive(Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl GlossarySource for HttpSource {
    async fn fetch(&self) -> Result<String, LoadError> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LoadError::Status {
                url: self.url.clone(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl GlossarySource for FileSource {
    async fn fetch(&self) -> Result<String, LoadError> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// JSON held in memory, for embedding and tests
#[derive(Debug, Clone)]
pub struct StaticSource {
    json: String,
}

impl StaticSource {
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }
}

#[async_trait]
impl GlossarySource for StaticSource {
    async fn fetch(&self) -> Result<String, LoadError> {
        Ok(self.json.clone())
    }

    fn describe(&self) -> String {
        "<inline>".to_string()
    }
}

/// HTTP for `http(s)://` URLs, a file path for anything else
pub fn source_for(data_url: &str) -> Box<dyn GlossarySource> {
    let trimmed = data_url.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Box::new(HttpSource::new(trimmed.to_string()))
    } else {
        let path = trimmed.strip_prefix("file://").unwrap_or(trimmed);
        Box::new(FileSource::new(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_for_picks_by_scheme() {
        assert_eq!(source_for("https://x.test/g.json").describe(), "https://x.test/g.json");
        assert_eq!(source_for("file:///tmp/g.json").describe(), "/tmp/g.json");
        assert_eq!(source_for("data/g.json").describe(), "data/g.json");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let source = FileSource::new("/definitely/not/here/glossary.json");
        assert!(matches!(source.fetch().await, Err(LoadError::Io(_))));
    }
}
