use glossa_core::Document;
use glossa_types::Rect;

/// Height given to each paragraph when laying out a text page
const LINE_HEIGHT: f64 = 24.0;

/// Build a document with one `p` per blank-line separated paragraph.
///
/// Paragraphs are stacked vertically with recorded rects so popups placed
/// next to their markers get plausible geometry.
pub fn document_from_text(text: &str, width: f64) -> Document {
    let mut doc = Document::new();
    let body = doc.body();

    let paragraphs = text
        .split("\n\n")
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty());

    for (row, paragraph) in paragraphs.enumerate() {
        let p = doc.create_element("p");
        let t = doc.create_text(&paragraph);
        doc.append_child(p, t);
        doc.append_child(body, p);
        doc.set_rect(p, Rect::new(0.0, row as f64 * LINE_HEIGHT * 2.0, width, LINE_HEIGHT));
    }

    doc
}
