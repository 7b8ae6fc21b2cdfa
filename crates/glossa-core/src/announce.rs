use glossa_types::NodeId;

use crate::dom::Document;
use crate::namespace::Namespace;
use crate::scanner::WIDGET_ATTR;

/// Creates a visually hidden polite live region holding `message`.
///
/// Screen readers pick the text up on insertion; the caller removes the
/// region again once it has been read.
pub fn announce(doc: &mut Document, ns: &Namespace, message: &str) -> NodeId {
    let region = doc.create_element("div");
    doc.add_class(region, &ns.live_region_class());
    doc.add_class(region, &ns.sr_only_class());
    doc.set_attr(region, WIDGET_ATTR, ns.as_str());
    doc.set_attr(region, "role", "status");
    doc.set_attr(region, "aria-live", "polite");
    doc.set_attr(region, "aria-atomic", "true");

    let text = doc.create_text(message);
    doc.append_child(region, text);
    let body = doc.body();
    doc.append_child(body, region);

    tracing::debug!("Announced: {}", message);
    region
}

/// Drops every live region of this instance
pub fn clear(doc: &mut Document, ns: &Namespace) -> usize {
    let regions = doc.elements_with_class(doc.html(), &ns.live_region_class());
    regions.into_iter().filter(|r| doc.remove(*r)).count()
}
