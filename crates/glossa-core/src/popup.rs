//! Single-popup lifecycle.
//!
//! `Hidden -> Showing -> Visible -> Hiding -> Hidden`. The controller never
//! sleeps: operations that need a later step return [`Deferred`] work for the
//! caller's timers, and every deferred step tolerates its node having
//! disappeared in the meantime.

use std::time::Duration;

use glossa_config::Config;
use glossa_types::{NodeId, Placement, PopupPosition, Rect, Term};

use crate::announce;
use crate::dom::Document;
use crate::geometry::Layout;
use crate::namespace::Namespace;
use crate::placement::{Position, compute_position};
use crate::scanner::WIDGET_ATTR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupState {
    Hidden,
    /// Attached and positioned, active class pending
    Showing,
    Visible,
    /// Active class removed, node removal pending
    Hiding,
}

/// Work the controller wants done later
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// Call [`PopupController::activate`] on the next frame
    Activate(NodeId),
    /// Call [`PopupController::dispose`] after `after`
    Remove { node: NodeId, after: Duration },
}

#[derive(Debug, Clone)]
pub struct ActivePopup {
    pub popup: NodeId,
    pub trigger: NodeId,
    pub term: Term,
    pub placement: Placement,
    state: PopupState,
}

impl ActivePopup {
    pub fn state(&self) -> PopupState {
        self.state
    }
}

pub struct PopupController {
    ns: Namespace,
    position: PopupPosition,
    animation: Duration,
    announcement: Duration,
    active: Option<ActivePopup>,
    /// Popups told to hide whose removal has not fired yet
    hiding: Vec<NodeId>,
}

impl PopupController {
    pub fn new(ns: Namespace, config: &Config) -> Self {
        Self {
            ns,
            position: config.popup_position,
            animation: config.animation(),
            announcement: config.announcement(),
            active: None,
            hiding: Vec::new(),
        }
    }

    pub fn state(&self) -> PopupState {
        match &self.active {
            Some(active) => active.state,
            None if !self.hiding.is_empty() => PopupState::Hiding,
            None => PopupState::Hidden,
        }
    }

    pub fn active(&self) -> Option<&ActivePopup> {
        self.active.as_ref()
    }

    /// Whether `node` sits inside a popup of this instance
    pub fn contains(&self, doc: &Document, node: NodeId) -> bool {
        let class = self.ns.popup_class();
        doc.closest(node, |el| doc.has_class(el, &class)).is_some()
    }

    pub fn is_close_button(&self, doc: &Document, node: NodeId) -> bool {
        let class = self.ns.popup_part_class("close");
        doc.closest(node, |el| doc.has_class(el, &class)).is_some()
    }

    /// Replace whatever is showing with a popup for `term` next to `trigger`
    pub fn show(
        &mut self,
        doc: &mut Document,
        layout: &dyn Layout,
        trigger: NodeId,
        term: &Term,
    ) -> Vec<Deferred> {
        // never two popups in the tree, not even one that is fading out
        self.force_clear(doc);

        let popup = self.build(doc, term);
        let body = doc.body();
        doc.append_child(body, popup);

        let position = self.place(doc, layout, trigger, popup);
        doc.set_attr(trigger, "aria-expanded", "true");

        let region = announce::announce(doc, &self.ns, &format!("{}: {}", term.word, term.definition));

        tracing::debug!(
            "Showing popup for '{}' ({})",
            term.id,
            position.placement.as_str()
        );

        self.active = Some(ActivePopup {
            popup,
            trigger,
            term: term.clone(),
            placement: position.placement,
            state: PopupState::Showing,
        });

        vec![
            Deferred::Activate(popup),
            Deferred::Remove {
                node: region,
                after: self.announcement,
            },
        ]
    }

    /// Next-frame step of `show`. Ignored unless `popup` is still the active one.
    pub fn activate(&mut self, doc: &mut Document, popup: NodeId) -> bool {
        match &mut self.active {
            Some(active) if active.popup == popup && active.state == PopupState::Showing => {
                doc.add_class(popup, &self.ns.popup_active_class());
                active.state = PopupState::Visible;
                true
            }
            _ => false,
        }
    }

    /// Start hiding the active popup. No-op without one.
    pub fn hide(&mut self, doc: &mut Document) -> Vec<Deferred> {
        let Some(active) = self.active.take() else {
            return vec![];
        };

        doc.remove_class(active.popup, &self.ns.popup_active_class());
        doc.set_attr(active.trigger, "aria-expanded", "false");
        self.hiding.push(active.popup);

        tracing::debug!("Hiding popup for '{}'", active.term.id);

        vec![Deferred::Remove {
            node: active.popup,
            after: self.animation,
        }]
    }

    /// Remove `node` if it is still around
    pub fn dispose(&mut self, doc: &mut Document, node: NodeId) -> bool {
        self.hiding.retain(|n| *n != node);
        if self.active.as_ref().is_some_and(|a| a.popup == node) {
            // the active popup is only removed through hide()
            return false;
        }
        doc.remove(node)
    }

    /// Recompute geometry of the active popup, e.g. after a resize
    pub fn reposition(&mut self, doc: &mut Document, layout: &dyn Layout) -> Option<Position> {
        let (trigger, popup) = {
            let active = self.active.as_ref()?;
            (active.trigger, active.popup)
        };

        if !doc.contains(trigger) || !doc.contains(popup) {
            return None;
        }

        let position = self.place(doc, layout, trigger, popup);
        if let Some(active) = &mut self.active {
            active.placement = position.placement;
        }
        Some(position)
    }

    /// Remove every popup and live region immediately
    pub fn teardown(&mut self, doc: &mut Document) {
        self.force_clear(doc);
        announce::clear(doc, &self.ns);
    }

    fn force_clear(&mut self, doc: &mut Document) {
        if let Some(active) = self.active.take() {
            doc.set_attr(active.trigger, "aria-expanded", "false");
            doc.remove(active.popup);
        }
        for node in self.hiding.drain(..) {
            doc.remove(node);
        }
    }

    fn place(&self, doc: &mut Document, layout: &dyn Layout, trigger: NodeId, popup: NodeId) -> Position {
        let trigger_rect = layout.rect(doc, trigger);
        let popup_size = layout.measure(doc, popup);
        let position = compute_position(self.position, trigger_rect, popup_size, layout.viewport());

        for placement in Placement::ALL {
            doc.remove_class(popup, &self.ns.popup_placement_class(placement.as_str()));
        }
        doc.add_class(popup, &self.ns.popup_placement_class(position.placement.as_str()));
        doc.set_attr(
            popup,
            "style",
            &format!("left: {}px; top: {}px;", position.left, position.top),
        );
        doc.set_rect(
            popup,
            Rect::new(position.left, position.top, popup_size.width, popup_size.height),
        );
        position
    }

    fn build(&self, doc: &mut Document, term: &Term) -> NodeId {
        let popup_id = self.ns.popup_id(&term.id);
        let title_id = format!("{popup_id}-title");

        let popup = doc.create_element("div");
        doc.set_attr(popup, "id", &popup_id);
        doc.add_class(popup, &self.ns.popup_class());
        doc.set_attr(popup, WIDGET_ATTR, self.ns.as_str());
        doc.set_attr(popup, "role", "dialog");
        doc.set_attr(popup, "aria-modal", "false");
        doc.set_attr(popup, "aria-labelledby", &title_id);

        let title = self.part(doc, popup, "h3", "title", Some(&term.word));
        doc.set_attr(title, "id", &title_id);
        self.part(doc, popup, "p", "definition", Some(&term.definition));

        if let Some(src) = &term.image {
            let image = self.part(doc, popup, "img", "image", None);
            doc.set_attr(image, "src", src);
            doc.set_attr(image, "alt", &term.word);
            doc.set_attr(image, "loading", "lazy");
        }

        if let Some(href) = &term.link {
            let link = self.part(doc, popup, "a", "link", Some("Learn more"));
            doc.set_attr(link, "href", href);
            doc.set_attr(link, "target", "_blank");
            doc.set_attr(link, "rel", "noopener noreferrer");
        }

        let close = self.part(doc, popup, "button", "close", Some("\u{00d7}"));
        doc.set_attr(close, "type", "button");
        doc.set_attr(close, "aria-label", "Close");

        popup
    }

    fn part(&self, doc: &mut Document, popup: NodeId, tag: &str, name: &str, text: Option<&str>) -> NodeId {
        let el = doc.create_element(tag);
        doc.add_class(el, &self.ns.popup_part_class(name));
        if let Some(text) = text {
            let t = doc.create_text(text);
            doc.append_child(el, t);
        }
        doc.append_child(popup, el);
        el
    }
}

#[cfg(test)]
mod tests {
    use glossa_types::Size;

    use super::*;
    use crate::geometry::StaticLayout;

    struct Fixture {
        doc: Document,
        layout: StaticLayout,
        controller: PopupController,
        trigger: NodeId,
        other: NodeId,
    }

    fn fixture() -> Fixture {
        let mut doc = Document::new();
        let body = doc.body();
        let trigger = doc.create_element("span");
        let other = doc.create_element("span");
        doc.append_child(body, trigger);
        doc.append_child(body, other);
        doc.set_rect(trigger, Rect::new(100.0, 100.0, 40.0, 20.0));
        doc.set_rect(other, Rect::new(300.0, 100.0, 40.0, 20.0));

        Fixture {
            doc,
            layout: StaticLayout::new(Size::new(1000.0, 800.0), Size::new(200.0, 100.0)),
            controller: PopupController::new(Namespace::fixed("g"), &Config::default()),
            trigger,
            other,
        }
    }

    fn popups(doc: &Document) -> usize {
        doc.elements_with_class(doc.html(), "g-popup").len()
    }

    fn api() -> Term {
        Term::new("1", "API", "Application Programming Interface")
            .with_link("https://example.com/api")
            .with_image("https://example.com/api.png")
    }

    #[test]
    fn test_show_builds_popup() {
        let mut f = fixture();
        let deferred = f.controller.show(&mut f.doc, &f.layout, f.trigger, &api());
        assert_eq!(f.controller.state(), PopupState::Showing);

        let active = f.controller.active().unwrap();
        let popup = active.popup;
        assert_eq!(active.placement, Placement::Bottom);
        assert_eq!(deferred[0], Deferred::Activate(popup));

        assert_eq!(f.doc.attr(popup, "id"), Some("g-popup-1"));
        assert_eq!(f.doc.attr(popup, "role"), Some("dialog"));
        assert!(f.doc.has_class(popup, "g-popup-bottom"));
        assert_eq!(f.doc.attr(popup, "style"), Some("left: 20px; top: 130px;"));

        let title = f.doc.elements_with_class(popup, "g-popup-title")[0];
        assert_eq!(f.doc.text_content(title), "API");
        let body = f.doc.elements_with_class(popup, "g-popup-definition")[0];
        assert_eq!(f.doc.text_content(body), "Application Programming Interface");
        let link = f.doc.elements_with_class(popup, "g-popup-link")[0];
        assert_eq!(f.doc.attr(link, "rel"), Some("noopener noreferrer"));
        let image = f.doc.elements_with_class(popup, "g-popup-image")[0];
        assert_eq!(f.doc.attr(image, "alt"), Some("API"));

        assert_eq!(f.doc.attr(f.trigger, "aria-expanded"), Some("true"));
        let regions = f.doc.elements_with_class(f.doc.body(), "g-live");
        assert_eq!(regions.len(), 1);
        assert_eq!(
            f.doc.text_content(regions[0]),
            "API: Application Programming Interface"
        );

        assert!(f.controller.activate(&mut f.doc, popup));
        assert_eq!(f.controller.state(), PopupState::Visible);
        assert!(f.doc.has_class(popup, "g-popup-active"));
        // only once
        assert!(!f.controller.activate(&mut f.doc, popup));
    }

    #[test]
    fn test_only_one_popup_ever() {
        let mut f = fixture();
        f.controller.show(&mut f.doc, &f.layout, f.trigger, &api());
        assert_eq!(popups(&f.doc), 1);
        f.controller.show(&mut f.doc, &f.layout, f.other, &Term::new("2", "SDK", "kit"));
        assert_eq!(popups(&f.doc), 1);
        assert_eq!(f.doc.attr(f.trigger, "aria-expanded"), Some("false"));

        // a popup still fading out is dropped when the next one shows
        f.controller.hide(&mut f.doc);
        assert_eq!(popups(&f.doc), 1);
        f.controller.show(&mut f.doc, &f.layout, f.trigger, &api());
        assert_eq!(popups(&f.doc), 1);
    }

    #[test]
    fn test_hide_defers_removal() {
        let mut f = fixture();
        f.controller.show(&mut f.doc, &f.layout, f.trigger, &api());
        let popup = f.controller.active().unwrap().popup;
        f.controller.activate(&mut f.doc, popup);

        let deferred = f.controller.hide(&mut f.doc);
        assert_eq!(
            deferred,
            vec![Deferred::Remove {
                node: popup,
                after: Duration::from_millis(300)
            }]
        );
        assert!(f.controller.active().is_none());
        assert_eq!(f.controller.state(), PopupState::Hiding);
        assert!(!f.doc.has_class(popup, "g-popup-active"));
        assert!(f.doc.contains(popup));

        assert!(f.controller.dispose(&mut f.doc, popup));
        assert_eq!(f.controller.state(), PopupState::Hidden);
        assert!(!f.doc.contains(popup));
    }

    #[test]
    fn test_hide_without_popup_is_noop() {
        let mut f = fixture();
        let before = f.doc.to_html(f.doc.html());
        assert!(f.controller.hide(&mut f.doc).is_empty());
        assert_eq!(f.doc.to_html(f.doc.html()), before);
        assert_eq!(f.controller.state(), PopupState::Hidden);
    }

    #[test]
    fn test_late_removal_is_harmless() {
        let mut f = fixture();
        f.controller.show(&mut f.doc, &f.layout, f.trigger, &api());
        let old = f.controller.active().unwrap().popup;
        f.controller.hide(&mut f.doc);

        // re-show before the removal timer fires
        f.controller.show(&mut f.doc, &f.layout, f.trigger, &api());
        let new = f.controller.active().unwrap().popup;
        assert_ne!(old, new);
        assert!(!f.doc.contains(old));

        assert!(!f.controller.dispose(&mut f.doc, old));
        assert!(f.doc.contains(new));
        assert!(!f.controller.activate(&mut f.doc, old));
        assert!(f.controller.activate(&mut f.doc, new));
    }

    #[test]
    fn test_reposition_after_resize() {
        let mut f = fixture();
        f.doc.set_rect(f.trigger, Rect::new(100.0, 700.0, 40.0, 20.0));
        f.controller.show(&mut f.doc, &f.layout, f.trigger, &api());
        assert_eq!(f.controller.active().unwrap().placement, Placement::Top);

        f.layout.set_viewport(Size::new(1000.0, 1200.0));
        let position = f.controller.reposition(&mut f.doc, &f.layout).unwrap();
        assert_eq!(position.placement, Placement::Bottom);
        assert_eq!(f.controller.active().unwrap().placement, Placement::Bottom);
    }

    #[test]
    fn test_teardown_removes_everything() {
        let mut f = fixture();
        f.controller.show(&mut f.doc, &f.layout, f.trigger, &api());
        f.controller.teardown(&mut f.doc);
        assert_eq!(popups(&f.doc), 0);
        assert!(f.doc.elements_with_class(f.doc.html(), "g-live").is_empty());
        assert_eq!(f.controller.state(), PopupState::Hidden);
    }
}
