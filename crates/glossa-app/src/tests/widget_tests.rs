//! Lifecycle of a widget over a shared document

use std::sync::Arc;
use std::time::Duration;

use glossa_config::Config;
use glossa_core::PopupState;
use glossa_loader::StaticSource;
use glossa_types::{InputEvent, Key, Term};

use super::*;
use crate::WidgetError;

#[tokio::test(start_paused = true)]
async fn test_api_scenario() {
    let document = page(&["Use the API to connect."]);
    let widget = start(Config::default(), &document, API_GLOSSARY).await;

    let found = markers(&widget).await;
    assert_eq!(found.len(), 1);
    let marker = found[0];
    {
        let doc = document.read().await;
        assert_eq!(doc.text_content(marker), "API");
        assert_eq!(
            doc.attr(marker, "aria-label"),
            Some("API: Application Programming Interface")
        );
        assert_eq!(doc.attr(marker, "aria-expanded"), Some("false"));
    }

    widget.dispatch(InputEvent::Click(marker)).await.unwrap();
    let shown = popups(&widget).await;
    assert_eq!(shown.len(), 1);
    {
        let doc = document.read().await;
        let ns = widget.namespace();
        let title = doc.elements_with_class(shown[0], &ns.popup_part_class("title"))[0];
        let body = doc.elements_with_class(shown[0], &ns.popup_part_class("definition"))[0];
        assert_eq!(doc.text_content(title), "API");
        assert_eq!(doc.text_content(body), "Application Programming Interface");
        assert_eq!(doc.attr(marker, "aria-expanded"), Some("true"));
    }

    // next frame
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(widget.stats().await.unwrap().popup, PopupState::Visible);

    widget
        .dispatch(InputEvent::KeyDown {
            target: marker,
            key: Key::Escape,
        })
        .await
        .unwrap();
    assert_eq!(widget.stats().await.unwrap().popup, PopupState::Hiding);
    assert_eq!(document.read().await.focused(), Some(marker));

    tokio::time::sleep(Duration::from_millis(350)).await;
    assert!(popups(&widget).await.is_empty());
    assert_eq!(widget.stats().await.unwrap().popup, PopupState::Hidden);
}

#[tokio::test]
async fn test_destroy_restores_text() {
    let text = "An API, an SDK and another API call.";
    let glossary = r#"{"terms": [
        {"id": "1", "word": "API", "definition": "a"},
        {"id": "2", "word": "SDK", "definition": "b"}
    ]}"#;
    let document = page(&[text, "Plain paragraph."]);
    let original = {
        let doc = document.read().await;
        doc.text_content(doc.body())
    };

    let widget = start(Config::default(), &document, glossary).await;
    assert_eq!(markers(&widget).await.len(), 3);
    let marker = markers(&widget).await[0];
    widget.dispatch(InputEvent::Click(marker)).await.unwrap();

    let removed = widget.destroy().await.unwrap();
    assert_eq!(removed, 3);

    let doc = document.read().await;
    let body = doc.body();
    assert_eq!(doc.text_content(body), original);
    // text runs merged back into one node per paragraph
    let first = doc.children(body)[0];
    assert_eq!(doc.children(first).len(), 1);
    assert_eq!(doc.text(doc.children(first)[0]), Some(text));
    assert!(doc.element_by_id(&widget.namespace().style_id()).is_none());
    assert!(
        doc.elements_with_class(body, &widget.namespace().popup_class())
            .is_empty()
    );
    drop(doc);

    assert!(!widget.is_running());
    assert!(matches!(widget.refresh().await, Err(WidgetError::Closed)));
}

#[tokio::test]
async fn test_update_terms_keeps_existing_markers() {
    let document = page(&["Use the API to connect."]);
    let widget = start(Config::default(), &document, API_GLOSSARY).await;
    assert_eq!(markers(&widget).await.len(), 1);

    let report = widget.update_terms(vec![]).await.unwrap();
    assert_eq!(report.markers, 0);
    assert_eq!(markers(&widget).await.len(), 1);
    assert_eq!(widget.stats().await.unwrap().terms, 0);

    add_paragraph(&document, "The API again.").await;
    let report = widget.refresh().await.unwrap();
    assert_eq!(report.markers, 0);
    assert_eq!(markers(&widget).await.len(), 1);
}

#[tokio::test]
async fn test_update_terms_matches_new_words() {
    let document = page(&["Use the API or the SDK."]);
    let widget = start(Config::default(), &document, API_GLOSSARY).await;
    assert_eq!(markers(&widget).await.len(), 1);

    let report = widget
        .update_terms(vec![
            Term::new("1", "API", "Application Programming Interface"),
            Term::new("2", "SDK", "Software Development Kit"),
        ])
        .await
        .unwrap();

    // the old API marker is not wrapped twice
    assert_eq!(report.markers, 1);
    assert_eq!(markers(&widget).await.len(), 2);
}

#[tokio::test]
async fn test_refresh_is_idempotent() {
    let document = page(&["Use the API to connect."]);
    let widget = start(Config::default(), &document, API_GLOSSARY).await;

    let report = widget.refresh().await.unwrap();
    assert_eq!(report.markers, 0);
    assert_eq!(report.scanned, 0);
    assert_eq!(markers(&widget).await.len(), 1);
}

#[tokio::test]
async fn test_show_and_hide_popup_directly() {
    let document = page(&["Use the API to connect."]);
    let widget = start(Config::default(), &document, API_GLOSSARY).await;
    let marker = markers(&widget).await[0];
    let term = Term::new("1", "API", "Application Programming Interface");

    widget.show_popup(marker, term.clone()).await.unwrap();
    widget.show_popup(marker, term).await.unwrap();
    assert_eq!(popups(&widget).await.len(), 1);

    widget.hide_popup().await.unwrap();
    assert_eq!(widget.stats().await.unwrap().popup, PopupState::Hiding);

    // idempotent
    widget.hide_popup().await.unwrap();
    assert_eq!(widget.stats().await.unwrap().popup, PopupState::Hiding);
}

#[tokio::test]
async fn test_load_failure_leaves_page_untouched() {
    let document = page(&["Use the API to connect."]);
    let before = {
        let doc = document.read().await;
        doc.to_html(doc.html())
    };

    let result = initialize_with_source(
        Config::default(),
        Arc::clone(&document),
        layout(),
        &StaticSource::new("<html>not a glossary</html>"),
    )
    .await;
    assert!(matches!(result, Err(WidgetError::Load(_))));

    let result = crate::initialize(
        Config {
            data_url: "/definitely/not/here/glossary.json".to_string(),
            ..Config::default()
        },
        Arc::clone(&document),
        layout(),
    )
    .await;
    assert!(matches!(result, Err(WidgetError::Load(_))));

    let doc = document.read().await;
    assert_eq!(doc.to_html(doc.html()), before);
}

#[tokio::test]
async fn test_invalid_config_rejected_before_load() {
    let document = page(&["text"]);
    let config = Config {
        mobile_breakpoint: 0,
        ..Config::default()
    };

    let result = initialize_with_source(config, document, layout(), &StaticSource::new("")).await;
    assert!(matches!(result, Err(WidgetError::Config(_))));
}

#[tokio::test]
async fn test_two_instances_share_a_document() {
    let document = page(&["The API and the SDK."]);
    let sdk = r#"{"terms": [{"id": "2", "word": "SDK", "definition": "Software Development Kit"}]}"#;

    let first = start(Config::default(), &document, API_GLOSSARY).await;
    let second = start(Config::default(), &document, sdk).await;
    assert_ne!(first.namespace(), second.namespace());

    assert_eq!(markers(&first).await.len(), 1);
    assert_eq!(markers(&second).await.len(), 1);
    {
        let doc = document.read().await;
        assert!(doc.element_by_id(&first.namespace().style_id()).is_some());
        assert!(doc.element_by_id(&second.namespace().style_id()).is_some());
    }

    first.destroy().await.unwrap();
    assert_eq!(markers(&second).await.len(), 1);
    let doc = document.read().await;
    assert!(doc.element_by_id(&first.namespace().style_id()).is_none());
    assert!(doc.element_by_id(&second.namespace().style_id()).is_some());
    assert_eq!(doc.text_content(doc.body()), "The API and the SDK.");
}

#[tokio::test]
async fn test_excluded_content_is_left_alone() {
    let document = page(&["The API is documented here."]);
    {
        let mut doc = document.write().await;
        let body = doc.body();
        let code = doc.create_element("code");
        let t = doc.create_text("call_api(API)");
        doc.append_child(code, t);
        doc.append_child(body, code);

        let aside = doc.create_element("aside");
        doc.add_class(aside, "sidebar");
        let t = doc.create_text("Sidebar API");
        doc.append_child(aside, t);
        doc.append_child(body, aside);
    }

    let config = Config {
        exclude_selectors: vec![".sidebar".to_string(), "[broken".to_string()],
        ..Config::default()
    };
    let widget = start(config, &document, API_GLOSSARY).await;
    assert_eq!(markers(&widget).await.len(), 1);
}

#[tokio::test]
async fn test_decomposed_glossary_matches_decomposed_page() {
    let text = "Meet at the cafe\u{0301} at noon.";
    let glossary = "{\"terms\": [{\"id\": \"1\", \"word\": \"cafe\u{0301}\", \"definition\": \"coffee\"}]}";
    let document = page(&[text]);

    let widget = start(Config::default(), &document, glossary).await;
    let found = markers(&widget).await;
    assert_eq!(found.len(), 1);
    assert_eq!(document.read().await.text_content(found[0]), "cafe\u{0301}");

    widget.destroy().await.unwrap();
    let doc = document.read().await;
    assert_eq!(doc.text_content(doc.body()), text);
}

#[tokio::test]
async fn test_debug_mode_enables_debug_logging() {
    let config = Config {
        debug_mode: true,
        ..Config::default()
    };
    let document = page(&["Use the API to connect."]);
    let widget = start(config, &document, API_GLOSSARY).await;

    assert!(tracing::enabled!(tracing::Level::DEBUG));
    widget.destroy().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_dropping_every_handle_stops_the_loop() {
    let document = page(&["Use the API to connect."]);
    let widget = start(Config::default(), &document, API_GLOSSARY).await;
    let marker = markers(&widget).await[0];
    widget.dispatch(InputEvent::PointerEnter(marker)).await.unwrap();

    let other = widget.clone();
    drop(widget);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(other.is_running());
    assert_eq!(other.stats().await.unwrap().terms, 1);

    drop(other);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(Arc::strong_count(&document), 1);
    // markers stay without an explicit destroy
    let doc = document.read().await;
    assert_eq!(doc.text_content(doc.body()), "Use the API to connect.");
}
