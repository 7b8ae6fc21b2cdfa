use std::sync::Arc;

use glossa_config::Config;
use glossa_core::{Document, StaticLayout};
use glossa_loader::StaticSource;
use glossa_types::{NodeId, Size};
use tokio::sync::RwLock;

use crate::{Widget, initialize_with_source};

mod widget_tests;

pub const API_GLOSSARY: &str = r#"{"terms": [
    {"id": "1", "word": "API", "definition": "Application Programming Interface", "enabled": true}
]}"#;

pub fn page(paragraphs: &[&str]) -> Arc<RwLock<Document>> {
    let mut doc = Document::new();
    let body = doc.body();
    for text in paragraphs {
        let p = doc.create_element("p");
        let t = doc.create_text(text);
        doc.append_child(p, t);
        doc.append_child(body, p);
    }
    Arc::new(RwLock::new(doc))
}

pub fn layout() -> Box<StaticLayout> {
    Box::new(StaticLayout::new(
        Size::new(1000.0, 800.0),
        Size::new(300.0, 160.0),
    ))
}

pub async fn start(config: Config, document: &Arc<RwLock<Document>>, glossary: &str) -> Widget {
    initialize_with_source(
        config,
        Arc::clone(document),
        layout(),
        &StaticSource::new(glossary),
    )
    .await
    .expect("widget failed to start")
}

pub async fn markers(widget: &Widget) -> Vec<NodeId> {
    let doc = widget.document().read().await;
    doc.elements_with_class(doc.body(), &widget.namespace().term_class())
}

pub async fn popups(widget: &Widget) -> Vec<NodeId> {
    let doc = widget.document().read().await;
    doc.elements_with_class(doc.body(), &widget.namespace().popup_class())
}

pub async fn add_paragraph(document: &Arc<RwLock<Document>>, text: &str) -> NodeId {
    let mut doc = document.write().await;
    let body = doc.body();
    let p = doc.create_element("p");
    let t = doc.create_text(text);
    doc.append_child(p, t);
    doc.append_child(body, p);
    p
}
