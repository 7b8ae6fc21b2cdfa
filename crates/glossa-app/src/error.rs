use glossa_config::ConfigError;
use glossa_loader::LoadError;

#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Glossary unavailable: {0}")]
    Load(#[from] LoadError),

    #[error("Widget event loop is gone")]
    Closed,
}
