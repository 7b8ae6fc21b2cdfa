use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use glossa_app::page::document_from_text;
use glossa_app::{initialize, telemetry};
use glossa_config::Config;
use glossa_core::StaticLayout;
use glossa_types::Size;
use tokio::sync::RwLock;

/// Annotate a text page with glossary markers
#[derive(Debug, Parser)]
#[command(name = "glossa", version)]
struct Cli {
    /// Widget configuration as JSON; defaults plus environment when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Plain text page, paragraphs separated by blank lines
    #[arg(long)]
    page: PathBuf,

    /// Glossary URL or path, overrides dataUrl
    #[arg(long)]
    data: Option<String>,

    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    #[arg(long, default_value_t = 800.0)]
    height: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading config {}", path.display()))?;
            Config::from_json(&json)?
        }
        None => Config::default(),
    }
    .with_env();

    if let Some(data) = cli.data {
        config.data_url = data;
    }

    telemetry::init(config.debug_mode);

    let text = tokio::fs::read_to_string(&cli.page)
        .await
        .with_context(|| format!("reading page {}", cli.page.display()))?;

    let document = Arc::new(RwLock::new(document_from_text(&text, cli.width)));
    let original = {
        let doc = document.read().await;
        doc.text_content(doc.body())
    };

    let layout = StaticLayout::new(
        Size::new(cli.width, cli.height),
        StaticLayout::default().fallback,
    );
    let widget = initialize(config, Arc::clone(&document), Box::new(layout)).await?;

    {
        let doc = document.read().await;
        println!("{}", doc.to_html(doc.body()));
    }

    let removed = widget.destroy().await?;
    tracing::info!("Removed {} markers", removed);

    let restored = {
        let doc = document.read().await;
        doc.text_content(doc.body())
    };
    anyhow::ensure!(restored == original, "page text changed after destroy");

    Ok(())
}
